//! Snapshot indexing by identity field.

use log::{debug, warn};
use serde_json::Value;
use std::collections::HashMap;

use super::schema::{value_type_name, IdentityKey, Record};
use super::DiffError;

/// A record together with the identity value it was indexed under
#[derive(Debug, Clone, Copy)]
pub struct IndexedRecord<'a> {
    pub id: &'a Value,
    pub record: &'a Record,
}

/// Lookup from identity value to record for one snapshot
///
/// Built fresh for every diff and borrowing the snapshot it indexes.
#[derive(Debug, Default)]
pub struct SnapshotIndex<'a> {
    entries: HashMap<IdentityKey, IndexedRecord<'a>>,
    skipped: usize,
    overwritten: usize,
}

impl<'a> SnapshotIndex<'a> {
    pub fn get(&self, key: &IdentityKey) -> Option<&IndexedRecord<'a>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IdentityKey, &IndexedRecord<'a>)> {
        self.entries.iter()
    }

    /// Number of distinct identities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records left out because they lack the identity field
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Records that replaced an earlier record with the same identity
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }
}

/// Index a snapshot by `id_field`
///
/// Records without `id_field` are skipped, so they can never show up as added,
/// removed or modified.
///
/// Identity values are assumed unique within a snapshot. When they are not,
/// the record appearing later in the snapshot replaces the earlier one and
/// the earlier one disappears from the diff. Callers that cannot guarantee
/// uniqueness must deduplicate beforehand.
///
/// # Errors
/// * `DiffError::UnhashableIdentity` - If an identity value is an array or object
pub fn build_index<'a>(snapshot: &'a [Record], id_field: &str) -> Result<SnapshotIndex<'a>, DiffError> {
    let mut index = SnapshotIndex {
        entries: HashMap::with_capacity(snapshot.len()),
        ..Default::default()
    };

    for record in snapshot {
        let Some(id) = record.get(id_field) else {
            index.skipped += 1;
            continue;
        };

        let key = IdentityKey::from_value(id).ok_or_else(|| DiffError::UnhashableIdentity {
            field: id_field.to_string(),
            value_type: value_type_name(id),
        })?;

        if index.entries.insert(key, IndexedRecord { id, record }).is_some() {
            index.overwritten += 1;
        }
    }

    if index.overwritten > 0 {
        warn!(
            "{} record(s) share an identity value in '{}'; later records replaced earlier ones",
            index.overwritten, id_field
        );
    }

    debug!(
        "Indexed {} record(s) by '{}' ({} without identity)",
        index.len(),
        id_field,
        index.skipped
    );

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_skips_records_without_identity() {
        let snapshot = records(json!([{"id": 1}, {"name": "no id"}, {"id": 2}]));
        let index = build_index(&snapshot, "id").unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.skipped(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let snapshot = records(json!([
            {"id": 1, "name": "first"},
            {"id": 1, "name": "second"}
        ]));
        let index = build_index(&snapshot, "id").unwrap();

        let key = IdentityKey::from_value(&json!(1)).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.overwritten(), 1);
        assert_eq!(index.get(&key).unwrap().record["name"], json!("second"));
    }

    #[test]
    fn test_null_identity_is_indexed() {
        let snapshot = records(json!([{"id": null, "x": 1}]));
        let index = build_index(&snapshot, "id").unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_array_identity_rejected() {
        let snapshot = records(json!([{"id": [1, 2]}]));
        let err = build_index(&snapshot, "id").unwrap_err();
        assert!(err.to_string().contains("array"));
    }
}
