//! Terminal output rendering for diff reports.
//!
//! Provides human-readable summaries of snapshot comparisons
//! with colored markers for added, removed and modified records.

use super::schema::{DiffReport, ModifiedItem, Record};
use colored::*;
use serde_json::Value;

// Longest value rendered inline before truncation
const MAX_VALUE_WIDTH: usize = 40;

/// Render a human-readable summary of a diff report for the terminal
pub fn render_terminal_diff(report: &DiffReport) -> String {
    let mut out = String::new();

    out.push_str(&render_header(report));
    out.push_str(&render_counts(report));
    out.push_str(&render_records("Added", "+", &report.added_items, &report.id_field));
    out.push_str(&render_records("Removed", "-", &report.removed_items, &report.id_field));
    out.push_str(&render_modified(report));
    out.push_str(&render_status(report));

    out
}

fn render_header(report: &DiffReport) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&"Snapshot Comparison Summary".bold().to_string());
    out.push_str("\n---------------------------------------------------\n");
    out.push_str(&format!("Identity field: {}\n", report.id_field));
    out.push_str(&format!("Compared fields: {}\n", report.fields_to_compare.join(", ")));
    out.push_str("---------------------------------------------------\n\n");
    out
}

fn render_counts(report: &DiffReport) -> String {
    let summary = report.summary();
    let mut out = format!(
        "Added: {}  Removed: {}  Modified: {}\n",
        summary.added, summary.removed, summary.modified
    );

    if !summary.changes_by_field.is_empty() {
        out.push_str("Changes by field:\n");
        for (field, count) in &summary.changes_by_field {
            out.push_str(&format!("  {}: {}\n", field, count));
        }
    }
    out
}

fn render_records(title: &str, marker: &str, records: &[Record], id_field: &str) -> String {
    let mut out = String::new();
    if records.is_empty() {
        return out;
    }

    out.push_str(&format!("\n{}:\n", title));
    for record in records {
        let id = record.get(id_field).map(render_value).unwrap_or_default();
        let line = format!("  {} {}", marker, id);
        let line = if marker == "+" { line.green() } else { line.red() };
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}

fn render_modified(report: &DiffReport) -> String {
    let mut out = String::new();
    if report.modified_items.is_empty() {
        return out;
    }

    out.push_str("\nModified:\n");
    for item in &report.modified_items {
        out.push_str(&render_modified_item(item));
    }
    out
}

fn render_modified_item(item: &ModifiedItem) -> String {
    let mut out = format!("  {} {}\n", "~".yellow(), render_value(&item.id));
    for change in &item.changed_fields {
        out.push_str(&format!(
            "      {}: {} -> {}\n",
            change.field,
            render_value(&change.before),
            render_value(&change.after)
        ));
    }
    out
}

fn render_status(report: &DiffReport) -> String {
    let mut out = String::new();
    out.push_str("\n---------------------------------------------------\n");
    let status_msg = if report.is_empty() {
        "STATUS: NO CHANGES".green().bold()
    } else {
        "STATUS: CHANGES DETECTED".yellow().bold()
    };
    out.push_str(&status_msg.to_string());
    out.push('\n');
    out
}

fn render_value(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    shorten(&text)
}

fn shorten(text: &str) -> String {
    if text.chars().count() <= MAX_VALUE_WIDTH {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_VALUE_WIDTH - 3).collect();
        format!("{}...", head)
    }
}
