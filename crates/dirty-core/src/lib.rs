//! Dirty - field-level change tracking for in-memory records
//!
//! This crate snapshots the scalar fields of a record and later reports which
//! of them differ from the snapshot:
//! - `Trackable` records described by a static field-descriptor table
//! - The `trackable!` macro generating that table from a struct declaration
//! - Snapshot capture of scalar and optional-scalar fields
//! - Change detection with zero-like equivalence
//! - An explicit, identity-keyed `Tracker` registry
//!
//! Container fields (sequences, sets, maps) are declared but never tracked.
//!
//! # Example
//!
//! ```
//! use dirty_core::{trackable, FieldValue, Tracker};
//!
//! trackable! {
//!     #[derive(Debug, Default)]
//!     pub struct User {
//!         pub id: i64,
//!         pub name: String,
//!     }
//! }
//!
//! let mut tracker = Tracker::new();
//! let mut user = User::default();
//! tracker.track(&user);
//!
//! user.name = "John Doe".to_string();
//! assert!(tracker.changed(&user));
//!
//! let changes = tracker.changes(&user);
//! assert_eq!(changes["name"].old, FieldValue::from(""));
//! assert_eq!(changes["name"].new, FieldValue::from("John Doe"));
//! ```

pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod record;
pub mod snapshot;
pub mod tracker;

pub use dirty_core_types::schema;
pub use dirty_core_types::{FieldKind, FieldValue, RecordId, RecordToken, ScalarKind};

// Re-export commonly used types
pub use diff::{ChangeSet, FieldChange};
pub use errors::{DirtyError, ExError, ExErrorKind, Result};
pub use record::{FieldDescriptor, ScalarField, Trackable, TrackedField};
pub use snapshot::Snapshot;
pub use tracker::Tracker;
