//! Core types shared by the dirty tracking engine
//!
//! This crate provides the foundational types used by the tracker and its
//! logging facility:
//!
//! - **Field values**: FieldValue, ScalarKind, FieldKind
//! - **Record identity**: RecordId, RecordToken, TokenWatch
//! - **Schema constants**: Canonical field keys and event names

pub mod identity;
pub mod schema;
pub mod value;

pub use identity::{RecordId, RecordToken, TokenWatch};
pub use value::{FieldKind, FieldValue, ScalarKind};
