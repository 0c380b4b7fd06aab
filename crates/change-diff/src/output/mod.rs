//! File input and output for the CLI commands.
//!
//! - Snapshot files (JSON arrays of objects)
//! - Raw request bodies
//! - Encoded diff reports

pub mod json;

// Re-export main functions
pub use json::{read_request_file, read_snapshot, write_report};

use crate::utils::error::OutputError;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}
