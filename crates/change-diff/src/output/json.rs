//! JSON file input and output.
//!
//! Reads snapshot files and raw request bodies, and writes encoded responses.

use crate::diff::Record;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;

/// Write encoded response bytes to a file
///
/// **Public** - main entry point for report output
///
/// # Errors
/// * `OutputError::Io` - I/O error during write
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let bytes = serialize_response(&success_value(report))?;
/// write_report(&bytes, "diff.json")?;
/// ```
pub fn write_report(bytes: &[u8], output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing diff report to: {}", output_path.display());

    super::validate_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(bytes)?;
    file.flush()?;

    info!("Report written successfully ({} bytes)", bytes.len());

    Ok(())
}

/// Read a snapshot file: a JSON array of objects
///
/// **Public** - used by the offline diff command and tests
///
/// # Errors
/// * `OutputError::Io` - File read error
/// * `OutputError::SerializationFailed` - JSON parse error
/// * `OutputError::InvalidSnapshot` - JSON is not an array of objects
pub fn read_snapshot(input_path: impl AsRef<Path>) -> Result<Vec<Record>, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading snapshot from: {}", input_path.display());

    let file = File::open(input_path)?;
    let value: Value = serde_json::from_reader(BufReader::new(file))?;

    let invalid = |reason: &str| OutputError::InvalidSnapshot {
        path: input_path.display().to_string(),
        reason: reason.to_string(),
    };

    let Value::Array(items) = value else {
        return Err(invalid("top-level value must be an array"));
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(invalid(&format!("element {} is not an object", i))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Snapshot loaded: {} record(s)", records.len());

    Ok(records)
}

/// Read a request body verbatim
///
/// The bytes are not parsed here; validation belongs to the protocol layer.
pub fn read_request_file(input_path: impl AsRef<Path>) -> Result<Vec<u8>, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading request body from: {}", input_path.display());
    Ok(fs::read(input_path)?)
}
