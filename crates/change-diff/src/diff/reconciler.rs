//! Set reconciliation and field-level change detection.
//!
//! Handles the set algebra between two snapshot indices and the per-field
//! comparison of records present in both.

use log::debug;
use serde_json::{Number, Value};
use std::collections::HashSet;

use super::index::{IndexedRecord, SnapshotIndex};
use super::schema::{normalized_number, FieldChange, IdentityKey, Record};

/// A matched record with at least one changed field
#[derive(Debug, Clone)]
pub struct ModifiedEntry<'a> {
    pub id: &'a Value,
    pub before: &'a Record,
    pub after: &'a Record,
    pub changes: Vec<FieldChange>,
}

/// Outcome of reconciling two indices, every list sorted by identity
#[derive(Debug, Clone, Default)]
pub struct Reconciliation<'a> {
    /// Records only in the after snapshot
    pub added: Vec<&'a Record>,

    /// Records only in the before snapshot
    pub removed: Vec<&'a Record>,

    /// Matched records whose tracked fields differ
    pub modified: Vec<ModifiedEntry<'a>>,

    /// Matched records whose tracked fields are all equal
    pub unchanged: usize,
}

/// Reconcile two snapshot indices
///
/// # Arguments
/// * `before` - Index of the earlier snapshot
/// * `after` - Index of the later snapshot
/// * `fields` - Fields to compare on records present in both
///
/// # Returns
/// Added, removed and modified records, each ordered by the textual form of
/// the identity value (ascending, byte-wise)
pub fn reconcile<'a>(
    before: &SnapshotIndex<'a>,
    after: &SnapshotIndex<'a>,
    fields: &[String],
) -> Reconciliation<'a> {
    let added = sorted_difference(after, before)
        .into_iter()
        .map(|entry| entry.record)
        .collect();

    let removed = sorted_difference(before, after)
        .into_iter()
        .map(|entry| entry.record)
        .collect();

    let mut candidates: Vec<(&IdentityKey, &IndexedRecord<'a>)> =
        before.iter().filter(|(key, _)| after.contains(key)).collect();
    candidates.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut modified = Vec::new();
    let mut unchanged = 0;

    for (key, before_entry) in candidates {
        let Some(after_entry) = after.get(key) else {
            continue;
        };

        let changes = compare_records(before_entry.record, after_entry.record, fields);
        if changes.is_empty() {
            unchanged += 1;
            continue;
        }

        modified.push(ModifiedEntry {
            id: before_entry.id,
            before: before_entry.record,
            after: after_entry.record,
            changes,
        });
    }

    let result = Reconciliation {
        added,
        removed,
        modified,
        unchanged,
    };

    debug!(
        "Reconciled: {} added, {} removed, {} modified, {} unchanged",
        result.added.len(),
        result.removed.len(),
        result.modified.len(),
        result.unchanged
    );

    result
}

/// Entries of `left` whose identity is absent from `right`, sorted by identity
fn sorted_difference<'i, 'a>(
    left: &'i SnapshotIndex<'a>,
    right: &SnapshotIndex<'a>,
) -> Vec<&'i IndexedRecord<'a>> {
    let mut entries: Vec<(&IdentityKey, &IndexedRecord<'a>)> =
        left.iter().filter(|(key, _)| !right.contains(key)).collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
    entries.into_iter().map(|(_, entry)| entry).collect()
}

/// Compare the tracked fields of two records
///
/// Fields are visited in the given order; a field listed twice is compared once.
pub fn compare_records(before: &Record, after: &Record, fields: &[String]) -> Vec<FieldChange> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(fields.len());
    let mut changes = Vec::new();

    for field in fields {
        if !seen.insert(field.as_str()) {
            continue;
        }
        if let Some(change) = compare_field(before, after, field) {
            changes.push(change);
        }
    }

    changes
}

/// Compare one field between two records
///
/// A missing field is treated as `null`.
///
/// # Returns
/// The before/after pair when the values differ, `None` otherwise
pub fn compare_field(before: &Record, after: &Record, field: &str) -> Option<FieldChange> {
    let before_value = before.get(field).unwrap_or(&Value::Null);
    let after_value = after.get(field).unwrap_or(&Value::Null);

    if values_equal(before_value, after_value) {
        return None;
    }

    Some(FieldChange {
        field: field.to_string(),
        before: before_value.clone(),
        after: after_value.clone(),
    })
}

/// Structural equality between JSON values
///
/// Numbers compare by value, so `1` equals `1.0`, using the same normalization
/// as identity keys. Everything else must match
/// in type and content; object key order never matters.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, x)| ym.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    x == y || normalized_number(x) == normalized_number(y)
}
