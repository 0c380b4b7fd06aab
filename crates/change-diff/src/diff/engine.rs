//! Core diff engine implementation.
//! Runs index → reconcile → assemble over two snapshots.

use log::info;

use super::index::build_index;
use super::reconciler::{reconcile, ModifiedEntry};
use super::schema::{DiffReport, ModifiedItem, Record};
use super::DiffError;

/// Generate a complete diff report comparing two snapshots
///
/// # Arguments
/// * `before` - The earlier snapshot
/// * `after` - The later snapshot
/// * `id_field` - Field identifying the same logical record in both snapshots
/// * `fields_to_compare` - Fields whose changes are tracked
///
/// # Returns
/// DiffReport with added, removed and modified records in identity order
///
/// # Errors
/// * `DiffError::UnhashableIdentity` - If an identity value is an array or object
///
/// # Example
/// ```ignore
/// use change_diff::diff::compute_diff;
///
/// let report = compute_diff(&before, &after, "id", &["name".to_string()])?;
/// println!("{} modified", report.modified_items.len());
/// ```
pub fn compute_diff(
    before: &[Record],
    after: &[Record],
    id_field: &str,
    fields_to_compare: &[String],
) -> Result<DiffReport, DiffError> {
    let before_index = build_index(before, id_field)?;
    let after_index = build_index(after, id_field)?;

    let reconciliation = reconcile(&before_index, &after_index, fields_to_compare);

    let report = assemble(
        id_field,
        fields_to_compare,
        reconciliation.added,
        reconciliation.removed,
        reconciliation.modified,
    );

    info!(
        "Diff on '{}': {} added, {} removed, {} modified",
        id_field,
        report.added_items.len(),
        report.removed_items.len(),
        report.modified_items.len()
    );

    Ok(report)
}

/// Package reconciled records into an owned report
///
/// The identity field and comparison list are echoed back so the report can be
/// read without the request that produced it.
pub fn assemble(
    id_field: &str,
    fields_to_compare: &[String],
    added: Vec<&Record>,
    removed: Vec<&Record>,
    modified: Vec<ModifiedEntry<'_>>,
) -> DiffReport {
    DiffReport {
        id_field: id_field.to_string(),
        fields_to_compare: fields_to_compare.to_vec(),
        added_items: added.into_iter().cloned().collect(),
        removed_items: removed.into_iter().cloned().collect(),
        modified_items: modified
            .into_iter()
            .map(|entry| ModifiedItem {
                id: entry.id.clone(),
                before: entry.before.clone(),
                after: entry.after.clone(),
                changed_fields: entry.changes,
            })
            .collect(),
    }
}
