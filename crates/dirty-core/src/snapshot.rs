//! Snapshot capture
//!
//! A snapshot holds, for every eligible field of a record, the field's
//! descriptor (enough to re-read it later) and its value at capture time.
//! Container fields are skipped and never appear in a snapshot.

use std::collections::HashSet;
use std::fmt;

use dirty_core_types::{FieldKind, FieldValue};

use crate::errors::{DirtyError, Result};
use crate::record::{FieldDescriptor, Trackable};

/// One eligible field as it was when the snapshot was taken
pub struct CapturedField<T: 'static> {
    descriptor: &'static FieldDescriptor<T>,
    was: FieldValue,
}

impl<T: 'static> CapturedField<T> {
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn kind(&self) -> FieldKind {
        self.descriptor.kind
    }

    /// Value at capture time
    pub fn was(&self) -> &FieldValue {
        &self.was
    }

    /// Current value of the field on `record`
    pub fn is(&self, record: &T) -> FieldValue {
        self.descriptor.read(record)
    }
}

impl<T: 'static> fmt::Debug for CapturedField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedField")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("was", &self.was)
            .finish()
    }
}

/// Field-level snapshot of a record of type `T`
pub struct Snapshot<T: 'static> {
    fields: Vec<CapturedField<T>>,
}

impl<T: Trackable> Snapshot<T> {
    /// Capture the eligible fields of `record`, in declaration order.
    ///
    /// # Errors
    ///
    /// - `DuplicateField` if the descriptor table names a field twice
    /// - `InvalidRecord` if a reader returns a value that does not match the
    ///   field's declared kind
    pub fn capture(record: &T) -> Result<Self> {
        let descriptors = T::fields();
        validate_names(descriptors)?;

        let mut fields = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if !descriptor.kind.is_eligible() {
                continue;
            }
            let was = descriptor.read(record);
            check_kind::<T>(descriptor, &was)?;
            fields.push(CapturedField { descriptor, was });
        }

        Ok(Self { fields })
    }
}

impl<T: 'static> Snapshot<T> {
    pub fn fields(&self) -> &[CapturedField<T>] {
        &self.fields
    }

    /// Captured field by name
    pub fn get(&self, name: &str) -> Option<&CapturedField<T>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Names of the captured fields, in declaration order
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(CapturedField::name).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T: 'static> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("fields", &self.fields)
            .finish()
    }
}

fn validate_names<T>(descriptors: &[FieldDescriptor<T>]) -> Result<()> {
    let mut seen = HashSet::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if !seen.insert(descriptor.name) {
            return Err(DirtyError::DuplicateField {
                record_type: std::any::type_name::<T>(),
                field: descriptor.name,
            });
        }
    }
    Ok(())
}

/// The value read must belong to the declared scalar kind; only nullable
/// fields may be absent.
fn check_kind<T>(descriptor: &FieldDescriptor<T>, value: &FieldValue) -> Result<()> {
    let matches = match value.kind() {
        None => matches!(descriptor.kind, FieldKind::Nullable(_)),
        Some(actual) => descriptor.kind.scalar() == Some(actual),
    };
    if matches {
        return Ok(());
    }
    Err(DirtyError::InvalidRecord {
        record_type: std::any::type_name::<T>(),
        reason: format!(
            "field `{}` declared as {:?} but read {}",
            descriptor.name, descriptor.kind, value
        ),
    })
}
