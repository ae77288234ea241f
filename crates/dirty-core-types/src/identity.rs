//! Record identity
//!
//! Records are keyed by reference identity, not structural equality: two
//! logically equal but distinct instances are tracked independently.
//!
//! An address alone is not an identity: once a record is dropped, another
//! record of the same type can be placed at the same address. Every record
//! therefore carries a [`RecordToken`], and the registry keeps a
//! [`TokenWatch`] on it. A watch only matches the token it was taken from,
//! and only while that token is alive.

use std::any::{self, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

/// Identity of a tracked record: the address of the referent plus its
/// concrete type.
///
/// The type component keeps a record distinct from its own first field,
/// which lives at the same address. The address is only meaningful while the
/// record is alive; pair it with the record's [`RecordToken`] to tell a
/// record apart from a later one reusing its storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    addr: usize,
    type_id: TypeId,
    type_name: &'static str,
}

impl RecordId {
    /// Identity of the value behind `record`
    pub fn of<T: 'static>(record: &T) -> Self {
        Self {
            addr: record as *const T as usize,
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
        }
    }

    /// Address of the record at the time the id was taken
    pub fn addr(&self) -> usize {
        self.addr
    }

    /// Concrete type of the record
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name, for diagnostics only
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.type_name, self.addr)
    }
}

/// Per-instance liveness token embedded in every tracked record.
///
/// Each token is unique. Cloning a record clones its token into a fresh one,
/// so the copy is a different record. Tokens never affect the record's
/// equality or hash.
pub struct RecordToken(Arc<()>);

impl RecordToken {
    pub fn new() -> Self {
        Self(Arc::new(()))
    }

    /// Take a watch that matches this token for as long as it lives
    pub fn watch(&self) -> TokenWatch {
        TokenWatch(Arc::downgrade(&self.0))
    }
}

impl Default for RecordToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RecordToken {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl PartialEq for RecordToken {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for RecordToken {}

impl Hash for RecordToken {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

impl fmt::Debug for RecordToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecordToken")
    }
}

/// Weak handle on a [`RecordToken`].
///
/// Holding a watch keeps the token's allocation reserved, so no later token
/// can take its place while the watch exists.
#[derive(Debug, Clone)]
pub struct TokenWatch(Weak<()>);

impl TokenWatch {
    /// Whether the watched token, and so its record, still exists
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Whether this watch was taken from `token` and the token is alive
    pub fn matches(&self, token: &RecordToken) -> bool {
        self.is_alive() && Weak::as_ptr(&self.0) == Arc::as_ptr(&token.0)
    }
}
