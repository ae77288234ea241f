//! Identity-keyed tracking registry
//!
//! [`Tracker`] maps record identities to their snapshots. It is an ordinary
//! value: construct one per logical scope (request, session, application) and
//! pass it where needed. It has no internal locking; share it across threads
//! behind a `Mutex` if required.
//!
//! Lifecycle: `track` → (caller mutates the record) → `changes` / `changed`
//! any number of times → `track` again to re-baseline, or `forget`.
//!
//! The registry holds no borrow of its records. Each entry keeps a
//! [`TokenWatch`] on the record's token instead, so a record dropped without
//! `forget` stops counting as tracked, and a new record placed at the same
//! address is not mistaken for it. Dead entries are pruned as the registry
//! grows, or on demand with [`Tracker::prune`]. Assigning a whole new value
//! over a tracked record (`*user = User::default()`) likewise replaces its
//! token and ends tracking.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use dirty_core_types::schema::{OP_CHANGES, OP_FORGET, OP_TRACK};
use dirty_core_types::{RecordId, TokenWatch};

use crate::diff::{compute_changes, ChangeSet};
use crate::errors::{DirtyError, Result};
use crate::record::Trackable;
use crate::snapshot::Snapshot;
use crate::{log_op_end, log_op_error, log_op_start};

/// Registry size below which dead entries are left for the next insert
const PRUNE_FLOOR: usize = 64;

struct Entry {
    watch: TokenWatch,
    /// A `Snapshot<T>` for the `T` named in the entry's key
    snapshot: Box<dyn Any + Send + Sync>,
}

impl Entry {
    fn is_for<T: Trackable>(&self, record: &T) -> bool {
        self.watch.matches(record.token())
    }
}

/// Registry of tracked records and their snapshots
pub struct Tracker {
    tracked: HashMap<RecordId, Entry>,
    prune_at: usize,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl Tracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tracker with room for `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tracked: HashMap::with_capacity(capacity),
            prune_at: capacity.max(PRUNE_FLOOR),
        }
    }

    /// Start tracking `record`, replacing any earlier snapshot of it.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateField` or `InvalidRecord` if `T`'s field table is
    /// malformed. The registry is left unchanged on error.
    pub fn try_track<T: Trackable>(&mut self, record: &T) -> Result<()> {
        let start = Instant::now();
        let id = RecordId::of(record);
        log_op_start!(OP_TRACK, record_type = id.type_name());

        match Snapshot::capture(record) {
            Ok(snapshot) => {
                let field_count = snapshot.len();
                self.tracked.insert(
                    id,
                    Entry {
                        watch: record.token().watch(),
                        snapshot: Box::new(snapshot),
                    },
                );
                if self.tracked.len() >= self.prune_at {
                    self.prune();
                    self.prune_at = (self.tracked.len() * 2).max(PRUNE_FLOOR);
                }
                log_op_end!(
                    OP_TRACK,
                    duration_ms = elapsed_ms(start),
                    record_type = id.type_name(),
                    field_count = field_count,
                    tracked_len = self.tracked.len()
                );
                Ok(())
            }
            Err(err) => {
                log_op_error!(
                    OP_TRACK,
                    err.clone(),
                    duration_ms = elapsed_ms(start),
                    record_type = id.type_name()
                );
                Err(err)
            }
        }
    }

    /// Start tracking `record`, replacing any earlier snapshot of it.
    ///
    /// # Panics
    ///
    /// Panics if `T`'s field table is malformed (a field declared twice, or
    /// a reader disagreeing with its declared kind).
    pub fn track<T: Trackable>(&mut self, record: &T) {
        if let Err(err) = self.try_track(record) {
            panic!("{}", err);
        }
    }

    /// Stop tracking `record`. Forgetting an untracked record is a no-op.
    pub fn forget<T: Trackable>(&mut self, record: &T) {
        let start = Instant::now();
        let id = RecordId::of(record);
        log_op_start!(OP_FORGET, record_type = id.type_name());

        let removed = self
            .tracked
            .remove(&id)
            .is_some_and(|entry| entry.is_for(record));

        log_op_end!(
            OP_FORGET,
            duration_ms = elapsed_ms(start),
            record_type = id.type_name(),
            removed = removed,
            tracked_len = self.tracked.len()
        );
    }

    /// Fields of `record` whose values differ from its snapshot.
    ///
    /// # Errors
    ///
    /// Returns `NotTracked` if `record` is not currently tracked.
    pub fn try_changes<T: Trackable>(&self, record: &T) -> Result<ChangeSet> {
        let start = Instant::now();
        let id = RecordId::of(record);
        log_op_start!(OP_CHANGES, record_type = id.type_name());

        let snapshot = match self.snapshot(record) {
            Some(snapshot) => snapshot,
            None => {
                let err = DirtyError::NotTracked {
                    record_type: id.type_name(),
                    address: id.addr(),
                };
                log_op_error!(
                    OP_CHANGES,
                    err.clone(),
                    duration_ms = elapsed_ms(start),
                    record_type = id.type_name()
                );
                return Err(err);
            }
        };

        let changes = compute_changes(snapshot, record);
        log_op_end!(
            OP_CHANGES,
            duration_ms = elapsed_ms(start),
            record_type = id.type_name(),
            field_count = snapshot.len(),
            change_count = changes.len()
        );
        Ok(changes)
    }

    /// Fields of `record` whose values differ from its snapshot.
    ///
    /// # Panics
    ///
    /// Panics if `record` is not currently tracked.
    pub fn changes<T: Trackable>(&self, record: &T) -> ChangeSet {
        match self.try_changes(record) {
            Ok(changes) => changes,
            Err(err) => panic!("{}", err),
        }
    }

    /// Whether any tracked field of `record` changed.
    ///
    /// # Errors
    ///
    /// Returns `NotTracked` if `record` is not currently tracked.
    pub fn try_changed<T: Trackable>(&self, record: &T) -> Result<bool> {
        self.try_changes(record).map(|changes| !changes.is_empty())
    }

    /// Whether any tracked field of `record` changed.
    ///
    /// # Panics
    ///
    /// Panics if `record` is not currently tracked.
    pub fn changed<T: Trackable>(&self, record: &T) -> bool {
        !self.changes(record).is_empty()
    }

    pub fn is_tracked<T: Trackable>(&self, record: &T) -> bool {
        self.snapshot(record).is_some()
    }

    /// Names of the fields captured for `record`, in declaration order
    pub fn tracked_fields<T: Trackable>(&self, record: &T) -> Option<Vec<&'static str>> {
        self.snapshot(record).map(Snapshot::field_names)
    }

    /// Number of tracked records that are still alive
    pub fn len(&self) -> usize {
        self.live().count()
    }

    pub fn is_empty(&self) -> bool {
        self.live().next().is_none()
    }

    /// Drop entries whose records no longer exist. Returns how many were
    /// removed.
    pub fn prune(&mut self) -> usize {
        let before = self.tracked.len();
        self.tracked.retain(|_, entry| entry.watch.is_alive());
        before - self.tracked.len()
    }

    /// Forget every tracked record
    pub fn clear(&mut self) {
        self.tracked.clear();
    }

    fn live(&self) -> impl Iterator<Item = &RecordId> {
        self.tracked
            .iter()
            .filter(|(_, entry)| entry.watch.is_alive())
            .map(|(id, _)| id)
    }

    fn snapshot<T: Trackable>(&self, record: &T) -> Option<&Snapshot<T>> {
        self.tracked
            .get(&RecordId::of(record))
            .filter(|entry| entry.is_for(record))
            .and_then(|entry| entry.snapshot.downcast_ref::<Snapshot<T>>())
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("tracked", &self.live().collect::<Vec<_>>())
            .finish()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::FieldChange;
    use crate::trackable;

    trackable! {
        #[derive(Debug, Default)]
        struct User {
            id: i64,
            name: String,
        }
    }

    #[test]
    fn test_fresh_track_is_unchanged() {
        let mut tracker = Tracker::new();
        let user = User::default();
        tracker.track(&user);
        assert!(!tracker.changed(&user));
        assert!(tracker.changes(&user).is_empty());
    }

    #[test]
    fn test_mutation_reported() {
        let mut tracker = Tracker::new();
        let mut user = User::default();
        tracker.track(&user);

        user.name = "John Doe".to_string();
        assert!(tracker.changed(&user));
        assert_eq!(
            tracker.changes(&user)["name"],
            FieldChange::new("", "John Doe")
        );
    }

    #[test]
    fn test_forget_untracked_is_noop() {
        let mut tracker = Tracker::new();
        let user = User::default();
        tracker.forget(&user);
        tracker.forget(&user);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_try_changes_untracked() {
        let tracker = Tracker::new();
        let user = User::default();
        let err = tracker.try_changes(&user).unwrap_err();
        assert!(matches!(err, DirtyError::NotTracked { .. }));
        assert!(tracker.try_changed(&user).is_err());
    }

    #[test]
    #[should_panic(expected = "Record not tracked")]
    fn test_changed_untracked_panics() {
        let tracker = Tracker::new();
        tracker.changed(&User::default());
    }

    #[test]
    fn test_introspection() {
        let mut tracker = Tracker::with_capacity(4);
        let a = User::default();
        let b = User::default();
        tracker.track(&a);
        tracker.track(&b);

        assert_eq!(tracker.len(), 2);
        assert!(tracker.is_tracked(&a));
        assert_eq!(tracker.tracked_fields(&a), Some(vec!["id", "name"]));

        tracker.clear();
        assert!(!tracker.is_tracked(&b));
        assert_eq!(tracker.tracked_fields(&b), None);
    }

    #[test]
    fn test_overwritten_record_is_not_tracked() {
        let mut tracker = Tracker::new();
        let mut user = User {
            id: 7,
            ..Default::default()
        };
        tracker.track(&user);

        user = User::default();
        assert!(!tracker.is_tracked(&user));
        assert!(matches!(
            tracker.try_changes(&user),
            Err(DirtyError::NotTracked { .. })
        ));
        assert_eq!(tracker.len(), 0);
        assert_eq!(tracker.prune(), 1);
    }

    #[test]
    fn test_forget_after_overwrite_reports_nothing_removed() {
        let mut tracker = Tracker::new();
        let mut user = User::default();
        tracker.track(&user);
        user = User::default();
        tracker.forget(&user);
        assert!(tracker.is_empty());
        assert_eq!(tracker.prune(), 0);
    }

    #[test]
    fn test_dead_entries_pruned_as_registry_grows() {
        let mut tracker = Tracker::new();
        for _ in 0..PRUNE_FLOOR * 4 {
            let user = Box::new(User::default());
            tracker.track(&*user);
        }
        assert!(tracker.tracked.len() < PRUNE_FLOOR);
        assert_eq!(tracker.len(), 0);
    }

    #[test]
    fn test_debug_lists_identities() {
        let mut tracker = Tracker::new();
        let user = User::default();
        tracker.track(&user);
        let text = format!("{:?}", tracker);
        assert!(text.starts_with("Tracker { tracked: ["));
        assert!(text.contains("User"));
    }
}
