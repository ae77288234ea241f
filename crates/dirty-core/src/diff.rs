//! Change detection
//!
//! Compares each field captured in a [`Snapshot`] with its live value.
//!
//! ## Policy
//!
//! - zero-like before and after: **unchanged**, whatever the representation
//!   (`None`, `0`, `""`, `false` are interchangeable)
//! - non-zero before and after: changed iff the values differ
//! - zero-like on exactly one side: **changed**
//!
//! Moving an optional field between `None` and `Some(0)` is therefore never
//! reported.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use dirty_core_types::FieldValue;
use serde::Serialize;

use crate::snapshot::Snapshot;

/// A field's value at snapshot time and its current value
///
/// Serialized untagged, for handing a report to the caller's own persistence
/// layer. The shape does not carry the integer signedness, so reports are
/// write-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub old: FieldValue,
    pub new: FieldValue,
}

impl FieldChange {
    pub fn new(old: impl Into<FieldValue>, new: impl Into<FieldValue>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

impl From<FieldChange> for (FieldValue, FieldValue) {
    fn from(change: FieldChange) -> Self {
        (change.old, change.new)
    }
}

/// Changed fields of one record, keyed by field name.
///
/// Iteration order is not part of the contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: BTreeMap<&'static str, FieldChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldChange> {
        self.changes.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.changes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, &'static str, FieldChange> {
        self.changes.iter()
    }

    /// Names of the changed fields
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.changes.keys().copied()
    }

    /// Flatten into `name -> (old, new)`
    pub fn into_pairs(self) -> BTreeMap<&'static str, (FieldValue, FieldValue)> {
        self.changes
            .into_iter()
            .map(|(name, change)| (name, change.into()))
            .collect()
    }

    fn insert(&mut self, name: &'static str, change: FieldChange) {
        self.changes.insert(name, change);
    }
}

impl Index<&str> for ChangeSet {
    type Output = FieldChange;

    /// # Panics
    ///
    /// Panics if `name` did not change.
    fn index(&self, name: &str) -> &FieldChange {
        &self.changes[name]
    }
}

impl IntoIterator for ChangeSet {
    type Item = (&'static str, FieldChange);
    type IntoIter = btree_map::IntoIter<&'static str, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = (&'a &'static str, &'a FieldChange);
    type IntoIter = btree_map::Iter<'a, &'static str, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, change) in &self.changes {
            writeln!(f, "{}: {} -> {}", name, change.old, change.new)?;
        }
        Ok(())
    }
}

/// Whether a field moved from `was` to `is` under the zero-equivalence policy
pub fn field_changed(was: &FieldValue, is: &FieldValue) -> bool {
    match (was.is_zero(), is.is_zero()) {
        (true, true) => false,
        (false, false) => was != is,
        _ => true,
    }
}

/// Compare every captured field of `snapshot` against `record`.
pub fn compute_changes<T: 'static>(snapshot: &Snapshot<T>, record: &T) -> ChangeSet {
    let mut changes = ChangeSet::new();
    for field in snapshot.fields() {
        let is = field.is(record);
        if field_changed(field.was(), &is) {
            changes.insert(field.name(), FieldChange::new(field.was().clone(), is));
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trackable;

    trackable! {
        #[derive(Default)]
        struct Row {
            id: i64,
            name: String,
            score: Option<f64>,
            tags: Vec<String>,
        }
    }

    #[test]
    fn test_zero_to_zero_is_unchanged() {
        assert!(!field_changed(&FieldValue::Absent, &FieldValue::Int(0)));
        assert!(!field_changed(&FieldValue::Int(0), &FieldValue::Absent));
        assert!(!field_changed(&FieldValue::Str(String::new()), &FieldValue::Absent));
        assert!(!field_changed(&FieldValue::Bool(false), &FieldValue::Bool(false)));
    }

    #[test]
    fn test_non_zero_compared_by_value() {
        assert!(!field_changed(&FieldValue::Int(5), &FieldValue::Int(5)));
        assert!(field_changed(&FieldValue::Int(5), &FieldValue::Int(6)));
        assert!(field_changed(
            &FieldValue::Str("a".into()),
            &FieldValue::Str("b".into())
        ));
    }

    #[test]
    fn test_zero_on_one_side_is_changed() {
        assert!(field_changed(&FieldValue::Absent, &FieldValue::Int(1)));
        assert!(field_changed(&FieldValue::Bool(true), &FieldValue::Bool(false)));
        assert!(field_changed(&FieldValue::Str("x".into()), &FieldValue::Absent));
    }

    #[test]
    fn test_nan_never_equals_itself() {
        assert!(field_changed(
            &FieldValue::Float(f64::NAN),
            &FieldValue::Float(f64::NAN)
        ));
    }

    #[test]
    fn test_compute_changes_reports_old_and_new() {
        let mut row = Row::default();
        let snapshot = Snapshot::capture(&row).unwrap();

        row.name = "John Doe".to_string();
        row.score = Some(0.0);
        row.tags.push("ignored".to_string());

        let changes = compute_changes(&snapshot, &row);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["name"], FieldChange::new("", "John Doe"));
        assert!(!changes.contains_key("score"));
        assert!(!changes.contains_key("tags"));
    }

    #[test]
    fn test_change_set_views() {
        let mut row = Row::default();
        let snapshot = Snapshot::capture(&row).unwrap();
        row.id = 9;
        row.score = Some(1.5);

        let changes = compute_changes(&snapshot, &row);
        let mut names: Vec<_> = changes.names().collect();
        names.sort_unstable();
        assert_eq!(names, ["id", "score"]);

        let pairs = changes.clone().into_pairs();
        assert_eq!(pairs["id"], (FieldValue::Int(0), FieldValue::Int(9)));
        assert_eq!(pairs["score"], (FieldValue::Absent, FieldValue::Float(1.5)));

        let text = changes.to_string();
        assert!(text.contains("id: 0 -> 9\n"));
        assert!(text.contains("score: <absent> -> 1.5\n"));
    }

    #[test]
    fn test_change_set_serializes_as_map() {
        let mut row = Row::default();
        let snapshot = Snapshot::capture(&row).unwrap();
        row.name = "a".to_string();

        let json = serde_json::to_value(compute_changes(&snapshot, &row)).unwrap();
        assert_eq!(json, serde_json::json!({ "name": { "old": "", "new": "a" } }));
    }

    #[test]
    fn test_unsigned_change_serializes_as_plain_numbers() {
        let change = FieldChange::new(5u32, 7u32);
        assert_eq!(change.old, FieldValue::UInt(5));

        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json, serde_json::json!({ "old": 5, "new": 7 }));
    }
}
