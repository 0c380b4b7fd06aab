//! Snapshot reconciliation.
//!
//! This module compares two snapshots of a record collection (before vs after)
//! and classifies records as added, removed or modified, with per-field
//! before/after values for modified records.
//!
//! # Example
//! ```ignore
//! use change_diff::diff::compute_diff;
//! use change_diff::output::json::read_snapshot;
//!
//! let before = read_snapshot("before.json")?;
//! let after = read_snapshot("after.json")?;
//! let report = compute_diff(&before, &after, "id", &["name".to_string()])?;
//! ```

mod engine;
mod index;
mod output;
mod reconciler;
mod schema;

// Public API exports
pub use engine::{assemble, compute_diff};
pub use index::{build_index, IndexedRecord, SnapshotIndex};
pub use output::render_terminal_diff;
pub use reconciler::{
    compare_field, compare_records, reconcile, values_equal, ModifiedEntry, Reconciliation,
};
pub use schema::{
    identity_sort_key, normalized_number, value_type_name, DiffReport, DiffSummary, FieldChange,
    IdentityKey, ModifiedItem, Record,
};

// Error type
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("unhashable identity value of type '{value_type}' in field '{field}'")]
    UnhashableIdentity {
        field: String,
        value_type: &'static str,
    },
}

#[cfg(test)]
mod tests;
