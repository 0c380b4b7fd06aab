//! Integration tests for the diff module.
//!
//! Tests the complete index → reconcile → assemble workflow.

use super::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::BTreeSet;

fn snapshot(value: Value) -> Vec<Record> {
    serde_json::from_value(value).unwrap()
}

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn ids(records: &[Record]) -> Vec<Value> {
    records.iter().map(|r| r["id"].clone()).collect()
}

/// Catalog snapshot before a price update
fn create_before_catalog() -> Vec<Record> {
    snapshot(json!([
        {"id": "sku-1", "name": "Lamp", "price": 20, "stock": 4},
        {"id": "sku-2", "name": "Desk", "price": 150, "stock": 1},
        {"id": "sku-3", "name": "Chair", "price": 45, "stock": 10},
        {"name": "orphan without id", "price": 1},
        {"id": "sku-5", "name": "Shelf", "price": 80, "stock": 2}
    ]))
}

/// Catalog snapshot after a price update
fn create_after_catalog() -> Vec<Record> {
    snapshot(json!([
        {"id": "sku-5", "name": "Shelf", "price": 80, "stock": 0},
        {"id": "sku-3", "name": "Chair", "price": 49, "stock": 10},
        {"id": "sku-4", "name": "Rug", "price": 60, "stock": 3},
        {"id": "sku-1", "name": "Lamp", "price": 22, "stock": 4},
        {"name": "orphan without id", "price": 2}
    ]))
}

#[test]
fn test_catalog_price_update() {
    let report = compute_diff(
        &create_before_catalog(),
        &create_after_catalog(),
        "id",
        &fields(&["price"]),
    )
    .unwrap();

    assert_eq!(ids(&report.added_items), vec![json!("sku-4")]);
    assert_eq!(ids(&report.removed_items), vec![json!("sku-2")]);

    // sku-5 only changed stock, which is not tracked
    let modified: Vec<_> = report.modified_items.iter().map(|m| m.id.clone()).collect();
    assert_eq!(modified, vec![json!("sku-1"), json!("sku-3")]);

    let lamp = &report.modified_items[0];
    assert_eq!(
        lamp.change_for("price").unwrap(),
        &FieldChange {
            field: "price".to_string(),
            before: json!(20),
            after: json!(22),
        }
    );
    assert_eq!(lamp.before["price"], json!(20));
    assert_eq!(lamp.after["price"], json!(22));
}

#[test]
fn test_partition_property() {
    let before = create_before_catalog();
    let after = create_after_catalog();
    let report = compute_diff(&before, &after, "id", &fields(&["price", "stock"])).unwrap();

    let added: BTreeSet<String> = ids(&report.added_items).iter().map(|v| v.to_string()).collect();
    let removed: BTreeSet<String> =
        ids(&report.removed_items).iter().map(|v| v.to_string()).collect();
    let modified: BTreeSet<String> =
        report.modified_items.iter().map(|m| m.id.to_string()).collect();

    assert!(added.is_disjoint(&removed));
    assert!(added.is_disjoint(&modified));
    assert!(removed.is_disjoint(&modified));

    let all: BTreeSet<String> = before
        .iter()
        .chain(after.iter())
        .filter_map(|r| r.get("id"))
        .map(|v| v.to_string())
        .collect();

    let classified: BTreeSet<String> = added
        .union(&removed)
        .cloned()
        .collect::<BTreeSet<_>>()
        .union(&modified)
        .cloned()
        .collect();

    // every identity is classified; with stock tracked, nothing is unchanged
    assert_eq!(classified, all);
}

#[test]
fn test_reordered_inputs_yield_identical_report() {
    let before = create_before_catalog();
    let after = create_after_catalog();
    let mut before_rev = before.clone();
    let mut after_rev = after.clone();
    before_rev.reverse();
    after_rev.reverse();

    let tracked = fields(&["price", "stock", "name"]);
    let a = compute_diff(&before, &after, "id", &tracked).unwrap();
    let b = compute_diff(&before_rev, &after_rev, "id", &tracked).unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_numeric_ids_sort_textually() {
    let before = snapshot(json!([]));
    let after = snapshot(json!([{"id": 2}, {"id": 10}, {"id": 1}, {"id": 100}]));

    let report = compute_diff(&before, &after, "id", &fields(&["x"])).unwrap();

    assert_eq!(
        ids(&report.added_items),
        vec![json!(1), json!(10), json!(100), json!(2)]
    );
}

#[test]
fn test_unchanged_records_omitted() {
    let before = snapshot(json!([{"id": 1, "name": "A", "tag": "x"}]));
    let after = snapshot(json!([{"id": 1, "name": "A", "tag": "y"}]));

    let report = compute_diff(&before, &after, "id", &fields(&["name"])).unwrap();

    assert!(report.is_empty());
}

#[test]
fn test_records_without_identity_invisible() {
    let before = snapshot(json!([{"name": "ghost"}]));
    let after = snapshot(json!([{"name": "ghost"}, {"key": 7}]));

    let report = compute_diff(&before, &after, "id", &fields(&["name"])).unwrap();

    assert!(report.is_empty());
}

#[test]
fn test_custom_identity_field() {
    let before = snapshot(json!([{"sku": "a", "qty": 1}]));
    let after = snapshot(json!([{"sku": "a", "qty": 2}]));

    let report = compute_diff(&before, &after, "sku", &fields(&["qty"])).unwrap();

    assert_eq!(report.id_field, "sku");
    assert_eq!(report.modified_items.len(), 1);
    assert_eq!(report.modified_items[0].id, json!("a"));
}

#[test]
fn test_duplicate_identity_last_record_wins() {
    let before = snapshot(json!([
        {"id": 1, "name": "old"},
        {"id": 1, "name": "new"}
    ]));
    let after = snapshot(json!([{"id": 1, "name": "new"}]));

    let report = compute_diff(&before, &after, "id", &fields(&["name"])).unwrap();

    assert!(report.is_empty());
}

#[test]
fn test_object_identity_is_error() {
    let before = snapshot(json!([{"id": {"k": 1}}]));
    let after = snapshot(json!([]));

    let err = compute_diff(&before, &after, "id", &fields(&["name"])).unwrap_err();

    assert_eq!(
        err,
        DiffError::UnhashableIdentity {
            field: "id".to_string(),
            value_type: "object",
        }
    );
}

#[test]
fn test_inputs_not_mutated() {
    let before = create_before_catalog();
    let after = create_after_catalog();
    let before_copy = before.clone();
    let after_copy = after.clone();

    let _ = compute_diff(&before, &after, "id", &fields(&["price"])).unwrap();

    assert_eq!(before, before_copy);
    assert_eq!(after, after_copy);
}

#[test]
fn test_summary_counts() {
    let report = compute_diff(
        &create_before_catalog(),
        &create_after_catalog(),
        "id",
        &fields(&["price", "stock"]),
    )
    .unwrap();

    let summary = report.summary();
    assert_eq!(summary.added, 1);
    assert_eq!(summary.removed, 1);
    assert_eq!(summary.modified, 3);
    assert_eq!(summary.changes_by_field.get("price"), Some(&2));
    assert_eq!(summary.changes_by_field.get("stock"), Some(&1));
}

#[test]
fn test_render_terminal_diff_lists_changes() {
    let report = compute_diff(
        &create_before_catalog(),
        &create_after_catalog(),
        "id",
        &fields(&["price"]),
    )
    .unwrap();

    let out = render_terminal_diff(&report);
    assert!(out.contains("Added: 1  Removed: 1  Modified: 2"));
    assert!(out.contains("price: 20 -> 22"));
    assert!(out.contains("sku-4"));
}

#[test]
fn test_integer_and_integral_float_ids_match() {
    let before = snapshot(json!([{"id": 1, "name": "a"}, {"id": 2.5, "name": "x"}]));
    let after = snapshot(json!([{"id": 1.0, "name": "b"}, {"id": 2.50, "name": "x"}]));

    let report = compute_diff(&before, &after, "id", &fields(&["name"])).unwrap();

    assert!(report.added_items.is_empty());
    assert!(report.removed_items.is_empty());
    assert_eq!(report.modified_items.len(), 1);

    let item = &report.modified_items[0];
    assert_eq!(item.id, json!(1));
    assert_eq!(
        item.changed_fields,
        vec![FieldChange {
            field: "name".to_string(),
            before: json!("a"),
            after: json!("b"),
        }]
    );
}

#[test]
fn test_large_integer_ids_stay_distinct() {
    let before: Vec<Record> =
        serde_json::from_str(r#"[{"id": 123456789012345678901234567890, "v": 1}]"#).unwrap();
    let after: Vec<Record> =
        serde_json::from_str(r#"[{"id": 123456789012345678901234567891, "v": 1}]"#).unwrap();

    let report = compute_diff(&before, &after, "id", &fields(&["v"])).unwrap();

    assert_eq!(report.added_items.len(), 1);
    assert_eq!(report.removed_items.len(), 1);
    assert_eq!(
        report.added_items[0]["id"].to_string(),
        "123456789012345678901234567891"
    );
}
