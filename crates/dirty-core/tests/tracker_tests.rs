#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{populated_user, User};
use dirty_core::{DirtyError, FieldChange, FieldValue, Tracker};

#[test]
fn test_john_doe_scenario() {
    let mut tracker = Tracker::new();
    let mut u = User::default();

    tracker.track(&u);
    assert!(!tracker.changed(&u));

    u.name = "John Doe".to_string();
    assert!(tracker.changed(&u));
    let changes = tracker.changes(&u);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes["name"], FieldChange::new("", "John Doe"));

    tracker.track(&u);
    u.name = "John Doe".to_string();
    assert!(!tracker.changed(&u));
}

#[test]
fn test_fresh_track_unchanged_for_populated_record() {
    let mut tracker = Tracker::new();
    let u = populated_user();
    tracker.track(&u);
    assert!(!tracker.changed(&u));
}

#[test]
fn test_every_scalar_kind_reports_old_and_new() {
    let mut tracker = Tracker::new();
    let mut u = populated_user();
    tracker.track(&u);

    u.id = 10;
    u.id_ptr = Some(20);
    u.name = "Grace".to_string();
    u.name_ptr = Some("grace@example.com".to_string());
    u.balance = 99.0;
    u.visits = 4;

    let changes = tracker.changes(&u);
    assert_eq!(changes.len(), 6);
    assert_eq!(changes["id"], FieldChange::new(1, 10));
    assert_eq!(changes["id_ptr"], FieldChange::new(2, 20));
    assert_eq!(changes["name"], FieldChange::new("Ada", "Grace"));
    assert_eq!(
        changes["name_ptr"],
        FieldChange::new("ada@example.com", "grace@example.com")
    );
    assert_eq!(changes["balance"], FieldChange::new(12.5, 99.0));
    assert_eq!(changes["visits"], FieldChange::new(3u32, 4u32));
    assert!(!changes.contains_key("active"));
}

#[test]
fn test_revert_to_snapshot_value_is_unchanged() {
    let mut tracker = Tracker::new();
    let mut u = populated_user();
    tracker.track(&u);

    u.name = "Someone".to_string();
    assert!(tracker.changed(&u));
    u.name = "Ada".to_string();
    assert!(!tracker.changed(&u));
}

#[test]
fn test_changes_is_repeatable() {
    let mut tracker = Tracker::new();
    let mut u = User::default();
    tracker.track(&u);
    u.id = 5;

    let first = tracker.changes(&u);
    let second = tracker.changes(&u);
    assert_eq!(first, second);
}

#[test]
fn test_retrack_resets_baseline() {
    let mut tracker = Tracker::new();
    let mut u = User::default();
    tracker.track(&u);

    u.id = 1;
    u.name = "x".to_string();
    assert!(tracker.changed(&u));

    tracker.track(&u);
    assert!(!tracker.changed(&u));
    assert_eq!(tracker.len(), 1);

    u.id = 0;
    assert_eq!(tracker.changes(&u)["id"], FieldChange::new(1, 0));
}

#[test]
fn test_containers_never_reported() {
    let mut tracker = Tracker::new();
    let mut u = User::default();
    tracker.track(&u);

    u.slice.push(true);
    u.set.insert("admin".to_string());
    u.map.insert(1, true);

    assert!(!tracker.changed(&u));
    let fields = tracker.tracked_fields(&u).unwrap();
    assert!(!fields.contains(&"slice"));
    assert!(!fields.contains(&"set"));
    assert!(!fields.contains(&"map"));
}

#[test]
fn test_distinct_instances_tracked_independently() {
    let mut tracker = Tracker::new();
    let mut a = User::default();
    let b = User::default();
    tracker.track(&a);

    assert!(tracker.is_tracked(&a));
    assert!(!tracker.is_tracked(&b));

    a.id = 3;
    tracker.track(&b);
    assert!(tracker.changed(&a));
    assert!(!tracker.changed(&b));
}

#[test]
fn test_clone_is_a_different_record() {
    let mut tracker = Tracker::new();
    let u = populated_user();
    tracker.track(&u);

    let copy = u.clone();
    assert!(tracker.try_changes(&copy).is_err());
}

#[test]
fn test_boxed_record_keeps_identity_across_mutation() {
    let mut tracker = Tracker::new();
    let mut boxed = Box::new(User::default());
    tracker.track(&*boxed);

    boxed.visits = 8;
    assert_eq!(
        tracker.changes(&*boxed)["visits"],
        FieldChange::new(0u32, 8u32)
    );
}

#[test]
fn test_dropped_record_not_confused_with_successor() {
    let mut tracker = Tracker::new();
    let first = Box::new(populated_user());
    tracker.track(&*first);
    drop(first);

    // Whether or not the allocator hands back the same address, the new
    // record must not inherit the dropped one's snapshot.
    let second = Box::new(User::default());
    assert!(!tracker.is_tracked(&*second));
    assert!(matches!(
        tracker.try_changes(&*second),
        Err(DirtyError::NotTracked { .. })
    ));
    assert_eq!(tracker.len(), 0);
    assert!(tracker.is_empty());
}

#[test]
fn test_overwritten_record_needs_new_track() {
    let mut tracker = Tracker::new();
    let mut u = populated_user();
    tracker.track(&u);

    u = User::default();
    assert!(tracker.try_changed(&u).is_err());

    tracker.track(&u);
    u.visits = 2;
    assert_eq!(tracker.changes(&u)["visits"], FieldChange::new(0u32, 2u32));
    assert_eq!(tracker.len(), 1);
}

#[test]
fn test_prune_removes_dropped_records() {
    let mut tracker = Tracker::new();
    let kept = User::default();
    tracker.track(&kept);
    for _ in 0..3 {
        let gone = Box::new(User::default());
        tracker.track(&*gone);
    }

    assert_eq!(tracker.len(), 1);
    assert!(tracker.prune() >= 1);
    assert_eq!(tracker.prune(), 0);
    assert!(tracker.is_tracked(&kept));
    assert_eq!(tracker.len(), 1);
}

#[test]
fn test_forget_then_try_changes_not_tracked() {
    let mut tracker = Tracker::new();
    let u = User::default();
    tracker.track(&u);
    tracker.forget(&u);

    assert!(!tracker.is_tracked(&u));
    match tracker.try_changes(&u) {
        Err(DirtyError::NotTracked { record_type, .. }) => {
            assert!(record_type.ends_with("User"));
        }
        other => panic!("expected NotTracked, got {:?}", other),
    }
}

#[test]
#[should_panic(expected = "Record not tracked")]
fn test_forget_then_changed_panics() {
    let mut tracker = Tracker::new();
    let u = User::default();
    tracker.track(&u);
    tracker.forget(&u);
    tracker.changed(&u);
}

#[test]
#[should_panic(expected = "Record not tracked")]
fn test_changes_never_tracked_panics() {
    let tracker = Tracker::new();
    let u = User::default();
    let _ = tracker.changes(&u);
}

#[test]
fn test_double_forget_is_benign() {
    let mut tracker = Tracker::new();
    let u = User::default();
    tracker.track(&u);
    tracker.forget(&u);
    tracker.forget(&u);
    assert!(tracker.is_empty());
}

#[test]
fn test_into_pairs_shape() {
    let mut tracker = Tracker::new();
    let mut u = User::default();
    tracker.track(&u);
    u.name_ptr = Some("n".to_string());

    let pairs = tracker.changes(&u).into_pairs();
    assert_eq!(
        pairs.get("name_ptr"),
        Some(&(FieldValue::Absent, FieldValue::Str("n".to_string())))
    );
}

#[test]
fn test_tracker_behind_mutex() {
    use std::sync::{Arc, Mutex};
    use std::thread;

    let tracker = Arc::new(Mutex::new(Tracker::new()));
    let record = Arc::new(populated_user());

    tracker.lock().unwrap().track(&*record);

    let handle = {
        let tracker = Arc::clone(&tracker);
        let record = Arc::clone(&record);
        thread::spawn(move || tracker.lock().unwrap().changed(&*record))
    };
    assert!(!handle.join().unwrap());
}
