//! Captured field values and field kinds
//!
//! Every eligible field is read into a [`FieldValue`]. Integers are widened
//! to 64 bits, floats to `f64`, and an empty optional becomes
//! [`FieldValue::Absent`].

use serde::Serialize;
use std::fmt;

/// Underlying scalar kind of an eligible field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Bool,
    Int,
    UInt,
    Float,
    Str,
}

/// Declared kind of a record field
///
/// Only `Scalar` and `Nullable` fields are eligible for tracking. Container
/// fields are declared so a record can describe itself completely, but the
/// tracker never reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A bare scalar (`bool`, integer, float, string)
    Scalar(ScalarKind),
    /// An optional scalar (`Option<S>`)
    Nullable(ScalarKind),
    /// Vectors, deques, slices and fixed-size arrays
    Sequence,
    /// Hash and ordered sets
    Set,
    /// Hash and ordered maps
    Map,
}

impl FieldKind {
    /// Whether fields of this kind are captured in snapshots
    pub fn is_eligible(&self) -> bool {
        matches!(self, FieldKind::Scalar(_) | FieldKind::Nullable(_))
    }

    /// Underlying scalar kind, if the field is eligible
    pub fn scalar(&self) -> Option<ScalarKind> {
        match self {
            FieldKind::Scalar(kind) | FieldKind::Nullable(kind) => Some(*kind),
            FieldKind::Sequence | FieldKind::Set | FieldKind::Map => None,
        }
    }
}

/// A scalar field value captured from a record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// An optional field holding no value
    Absent,
}

impl FieldValue {
    /// Whether this is a zero-like value: `false`, numeric zero, the empty
    /// string, or absent.
    ///
    /// Zero-like values are interchangeable for change detection; a field
    /// moving between two of them is never reported as changed.
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Bool(b) => !*b,
            FieldValue::Int(i) => *i == 0,
            FieldValue::UInt(u) => *u == 0,
            FieldValue::Float(f) => *f == 0.0,
            FieldValue::Str(s) => s.is_empty(),
            FieldValue::Absent => true,
        }
    }

    /// Scalar kind of the value; `None` for [`FieldValue::Absent`]
    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            FieldValue::Bool(_) => Some(ScalarKind::Bool),
            FieldValue::Int(_) => Some(ScalarKind::Int),
            FieldValue::UInt(_) => Some(ScalarKind::UInt),
            FieldValue::Float(_) => Some(ScalarKind::Float),
            FieldValue::Str(_) => Some(ScalarKind::Str),
            FieldValue::Absent => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::UInt(u) => write!(f, "{}", u),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Str(s) => write!(f, "{:?}", s),
            FieldValue::Absent => write!(f, "<absent>"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

macro_rules! from_widened {
    ($variant:ident, $wide:ty, $($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    FieldValue::$variant(value as $wide)
                }
            }
        )*
    };
}

from_widened!(Int, i64, i8, i16, i32, i64, isize);
from_widened!(UInt, u64, u8, u16, u32, u64, usize);
from_widened!(Float, f64, f32, f64);

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Absent, Into::into)
    }
}
