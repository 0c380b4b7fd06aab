//! Configuration and constants for the diff service.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use super::error::ConfigError;

/// Value `request_type` must carry
pub const REQUEST_TYPE: &str = "change_diff";

/// Identity field used when a request omits `id_field`
pub const DEFAULT_ID_FIELD: &str = "id";

/// Current response schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Environment variable consulted for the listening port
pub const PORT_ENV_VAR: &str = "CHANGE_DIFF_PORT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5563;

/// How long a connection waits for a frame before re-checking for shutdown
pub const DEFAULT_RECV_TIMEOUT_MS: u64 = 500;

/// Sleep between accept attempts on the non-blocking listener
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

// 16 MiB covers collections in the low thousands with generous records
pub const DEFAULT_MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Server settings, loadable from TOML
///
/// Every key is optional in the file; missing keys keep their defaults.
///
/// ```toml
/// host = "127.0.0.1"
/// port = 5563
/// recv_timeout_ms = 500
/// max_frame_bytes = 16777216
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// TCP port (0 asks the OS for a free one)
    pub port: u16,

    /// Receive timeout in milliseconds
    pub recv_timeout_ms: u64,

    /// Largest accepted request frame
    pub max_frame_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            recv_timeout_ms: DEFAULT_RECV_TIMEOUT_MS,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host cannot be empty".to_string()));
        }

        if self.recv_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "recv_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if self.max_frame_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_frame_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load server configuration from a TOML file
///
/// # Errors
/// * `ConfigError::ReadFailed` - If file cannot be read
/// * `ConfigError::ParseFailed` - If TOML is invalid or has unknown keys
/// * `ConfigError::Invalid` - If values are out of range
pub fn load_config(path: impl AsRef<Path>) -> Result<ServerConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
