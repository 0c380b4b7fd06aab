use crate::utils::config::DEFAULT_ID_FIELD;
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the serve command
///
/// **Public** - used by main.rs to construct from CLI args.
/// Every `Some` value overrides the config file, which overrides defaults.
#[derive(Debug, Clone, Default)]
pub struct ServeArgs {
    /// Optional TOML configuration file
    pub config_file: Option<PathBuf>,

    /// Interface to bind
    pub host: Option<String>,

    /// Port to listen on
    pub port: Option<u16>,

    /// Receive timeout in milliseconds
    pub recv_timeout_ms: Option<u64>,

    /// Largest accepted request frame in bytes
    pub max_frame_bytes: Option<usize>,
}

/// Arguments for the offline diff command
#[derive(Debug, Clone)]
pub struct DiffArgs {
    /// Path to the before snapshot JSON
    pub before: PathBuf,

    /// Path to the after snapshot JSON
    pub after: PathBuf,

    /// Identity field
    pub id_field: String,

    /// Fields to compare
    pub fields: Vec<String>,

    /// Path to write the encoded response JSON (stdout when absent)
    pub output: Option<PathBuf>,

    /// Print a human-readable summary to the terminal
    pub summary: bool,
}

impl Default for DiffArgs {
    fn default() -> Self {
        Self {
            before: PathBuf::new(),
            after: PathBuf::new(),
            id_field: DEFAULT_ID_FIELD.to_string(),
            fields: Vec::new(),
            output: None,
            summary: false,
        }
    }
}

/// Arguments for the request command
#[derive(Debug, Clone)]
pub struct RequestArgs {
    /// Server address, `host:port`
    pub addr: String,

    /// File holding the raw request body
    pub file: PathBuf,

    /// Reply timeout
    pub timeout: Duration,
}
