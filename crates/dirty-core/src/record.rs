//! Record description
//!
//! A record is any struct that can enumerate its fields through a static
//! [`FieldDescriptor`] table. The table is normally generated by
//! [`trackable!`](crate::trackable); hand-written tables are accepted too and
//! are validated when the record is tracked.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use dirty_core_types::{FieldKind, FieldValue, RecordToken, ScalarKind};

/// Describes one field of a record `T`: its name, declared kind, and a reader
/// returning the field's current value.
pub struct FieldDescriptor<T> {
    pub name: &'static str,
    pub kind: FieldKind,
    pub reader: fn(&T) -> FieldValue,
}

impl<T> FieldDescriptor<T> {
    pub const fn new(name: &'static str, kind: FieldKind, reader: fn(&T) -> FieldValue) -> Self {
        Self { name, kind, reader }
    }

    /// Read the field's current value from `record`
    pub fn read(&self, record: &T) -> FieldValue {
        (self.reader)(record)
    }
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldDescriptor<T> {}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A struct whose fields can be snapshotted and diffed.
///
/// `fields()` lists every field in declaration order, containers included.
/// Names must be unique within the table.
///
/// `token()` returns the record's own [`RecordToken`]. The tracker uses it to
/// tell a live record from a dropped one whose address has been reused.
pub trait Trackable: Sized + 'static {
    fn fields() -> &'static [FieldDescriptor<Self>];

    fn token(&self) -> &RecordToken;
}

/// A type usable as a record field.
///
/// Scalars and `Option<scalar>` are eligible for tracking. Container types
/// declare a non-eligible kind; their `capture` is never called by the
/// tracker and yields [`FieldValue::Absent`].
pub trait TrackedField {
    const KIND: FieldKind;

    fn capture(&self) -> FieldValue;
}

/// A scalar type: boolean, integer, float, or string.
pub trait ScalarField {
    const SCALAR: ScalarKind;

    fn to_value(&self) -> FieldValue;
}

macro_rules! impl_scalar {
    ($kind:ident => $($t:ty),*) => {
        $(
            impl ScalarField for $t {
                const SCALAR: ScalarKind = ScalarKind::$kind;

                fn to_value(&self) -> FieldValue {
                    FieldValue::from(*self)
                }
            }

            impl TrackedField for $t {
                const KIND: FieldKind = FieldKind::Scalar(ScalarKind::$kind);

                fn capture(&self) -> FieldValue {
                    self.to_value()
                }
            }
        )*
    };
}

impl_scalar!(Bool => bool);
impl_scalar!(Int => i8, i16, i32, i64, isize);
impl_scalar!(UInt => u8, u16, u32, u64, usize);
impl_scalar!(Float => f32, f64);
impl_scalar!(Str => &'static str);

impl ScalarField for String {
    const SCALAR: ScalarKind = ScalarKind::Str;

    fn to_value(&self) -> FieldValue {
        FieldValue::Str(self.clone())
    }
}

impl TrackedField for String {
    const KIND: FieldKind = FieldKind::Scalar(ScalarKind::Str);

    fn capture(&self) -> FieldValue {
        self.to_value()
    }
}

impl<S: ScalarField> TrackedField for Option<S> {
    const KIND: FieldKind = FieldKind::Nullable(S::SCALAR);

    fn capture(&self) -> FieldValue {
        self.as_ref().map_or(FieldValue::Absent, ScalarField::to_value)
    }
}

macro_rules! impl_container {
    ($kind:ident => $([$($g:tt)*] $t:ty),* $(,)?) => {
        $(
            impl<$($g)*> TrackedField for $t {
                const KIND: FieldKind = FieldKind::$kind;

                fn capture(&self) -> FieldValue {
                    FieldValue::Absent
                }
            }
        )*
    };
}

impl_container!(Sequence =>
    [T] Vec<T>,
    [T] VecDeque<T>,
    [T] Box<[T]>,
    [T, const N: usize] [T; N],
);
impl_container!(Set =>
    [T, H] HashSet<T, H>,
    [T] BTreeSet<T>,
);
impl_container!(Map =>
    [K, V, H] HashMap<K, V, H>,
    [K, V] BTreeMap<K, V>,
);

/// Declare a struct and derive its [`Trackable`] field table.
///
/// Supports named-field structs without generics. Field attributes and
/// visibility are passed through unchanged. The macro adds one hidden field
/// holding the record's [`RecordToken`], so struct literals need
/// `..Default::default()` (or an explicit token) to fill it.
///
/// ```
/// use dirty_core::{record::Trackable, trackable, FieldKind, ScalarKind};
///
/// trackable! {
///     #[derive(Debug, Default)]
///     pub struct Account {
///         pub id: u64,
///         pub email: Option<String>,
///         pub tags: Vec<String>,
///     }
/// }
///
/// let account = Account { id: 7, ..Default::default() };
/// assert_eq!(account.id, 7);
///
/// let names: Vec<_> = Account::fields().iter().map(|f| f.name).collect();
/// assert_eq!(names, ["id", "email", "tags"]);
/// assert_eq!(Account::fields()[1].kind, FieldKind::Nullable(ScalarKind::Str));
/// ```
#[macro_export]
macro_rules! trackable {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
            #[doc(hidden)]
            pub __dirty_token: $crate::RecordToken,
        }

        impl $crate::record::Trackable for $name {
            fn fields() -> &'static [$crate::record::FieldDescriptor<Self>] {
                const FIELDS: &[$crate::record::FieldDescriptor<$name>] = &[
                    $(
                        $crate::record::FieldDescriptor {
                            name: stringify!($field),
                            kind: <$ty as $crate::record::TrackedField>::KIND,
                            reader: |record: &$name| {
                                <$ty as $crate::record::TrackedField>::capture(&record.$field)
                            },
                        },
                    )*
                ];
                FIELDS
            }

            fn token(&self) -> &$crate::RecordToken {
                &self.__dirty_token
            }
        }
    };
}
