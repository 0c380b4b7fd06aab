//! Error types for the diff service.
//!
//! Library layers return the `thiserror` enums below; the command layer and
//! main.rs wrap them in `anyhow` with context.
//!
//! The `Display` text of [`RequestError`] is the exact message placed in the
//! `error` field of an error response.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Classification of every failure a diff request can end in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Request body is not valid structured data
    MalformedInput,
    /// `request_type` missing or not recognized
    UnsupportedOperation,
    /// `id_field` present but not a non-empty string
    InvalidIdentityField,
    /// `fields_to_compare` missing, empty, or holding bad entries
    InvalidComparisonFields,
    /// `before` / `after` missing or not lists of objects
    InvalidSnapshotShape,
    /// Anything not anticipated by validation
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedInput => "MalformedInput",
            ErrorKind::UnsupportedOperation => "UnsupportedOperation",
            ErrorKind::InvalidIdentityField => "InvalidIdentityField",
            ErrorKind::InvalidComparisonFields => "InvalidComparisonFields",
            ErrorKind::InvalidSnapshotShape => "InvalidSnapshotShape",
            ErrorKind::InternalError => "InternalError",
        };
        f.write_str(name)
    }
}

/// Errors that end a diff request before a result is produced
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Invalid JSON in request body.")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Request body must be a JSON object.")]
    NotAnObject,

    #[error("Unsupported request_type. Expected 'change_diff'.")]
    UnsupportedRequestType,

    #[error("'id_field' must be a non-empty string.")]
    InvalidIdField,

    #[error("'fields_to_compare' must be a non-empty list of field names.")]
    MissingComparisonFields,

    #[error("All entries in 'fields_to_compare' must be non-empty strings.")]
    InvalidComparisonField,

    #[error("'before' and 'after' must both be lists.")]
    SnapshotsNotLists,

    #[error("'before' and 'after' must contain only objects.")]
    SnapshotElementNotObject,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RequestError {
    /// Taxonomy bucket for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::InvalidJson(_) | RequestError::NotAnObject => ErrorKind::MalformedInput,
            RequestError::UnsupportedRequestType => ErrorKind::UnsupportedOperation,
            RequestError::InvalidIdField => ErrorKind::InvalidIdentityField,
            RequestError::MissingComparisonFields | RequestError::InvalidComparisonField => {
                ErrorKind::InvalidComparisonFields
            }
            RequestError::SnapshotsNotLists | RequestError::SnapshotElementNotObject => {
                ErrorKind::InvalidSnapshotShape
            }
            RequestError::Internal(_) => ErrorKind::InternalError,
        }
    }
}

impl From<crate::diff::DiffError> for RequestError {
    fn from(err: crate::diff::DiffError) -> Self {
        RequestError::Internal(err.to_string())
    }
}

/// Errors that can occur on the framed socket transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Socket I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Connection closed before a complete frame was received")]
    UnexpectedEof,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid server configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while loading server configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur during file input and output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid snapshot file {path}: {reason}")]
    InvalidSnapshot { path: String, reason: String },
}
