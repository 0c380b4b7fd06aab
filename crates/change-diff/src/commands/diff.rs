//! Diff command implementation.
//! Compares two snapshot files offline and reports the result.

use super::models::DiffArgs;
use crate::diff::{compute_diff, render_terminal_diff, DiffReport};
use crate::output::{read_snapshot, write_report};
use crate::protocol::{serialize_response, success_value};
use anyhow::{bail, Context, Result};
use colored::*;
use std::io::Write;

/// Check diff arguments with the same rules the service applies to requests
pub fn validate_diff_args(args: &DiffArgs) -> Result<()> {
    if args.id_field.trim().is_empty() {
        bail!("Identity field cannot be empty");
    }

    if args.fields.is_empty() {
        bail!("At least one field to compare is required");
    }

    if args.fields.iter().any(|f| f.trim().is_empty()) {
        bail!("Field names to compare cannot be empty");
    }

    Ok(())
}

/// Execute the diff command
///
/// The encoded report is byte-identical to what the service returns for the
/// same snapshots.
pub fn execute_diff(args: DiffArgs) -> Result<DiffReport> {
    validate_diff_args(&args)?;

    // Step 1: Load snapshots
    let before = read_snapshot(&args.before).context("Failed to read before snapshot")?;
    let after = read_snapshot(&args.after).context("Failed to read after snapshot")?;

    // Step 2: Reconcile
    let report =
        compute_diff(&before, &after, &args.id_field, &args.fields).context("Failed to compute diff")?;

    // Step 3: Terminal summary
    if args.summary {
        println!("{}", render_terminal_diff(&report));
    }

    // Step 4: Encoded report
    let bytes = serialize_response(&success_value(report.clone()))
        .context("Failed to encode diff report")?;

    match &args.output {
        Some(path) => {
            write_report(&bytes, path).context("Failed to write diff report JSON")?;
            println!("Diff report written to {}", path.display().to_string().cyan());
        }
        None if !args.summary => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.write_all(b"\n")?;
        }
        None => {}
    }

    Ok(report)
}
