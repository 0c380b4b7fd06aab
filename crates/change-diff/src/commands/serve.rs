//! Serve command implementation.

use crate::commands::models::ServeArgs;
use crate::server::{CancellationToken, DiffServer, ServeStats};
use crate::utils::config::{load_config, ServerConfig};
use anyhow::{Context, Result};
use log::{debug, info};

/// Merge config file and CLI overrides into the effective server config
///
/// Precedence: explicit argument, then config file, then built-in default.
pub fn resolve_config(args: &ServeArgs) -> Result<ServerConfig> {
    let mut config = match &args.config_file {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => ServerConfig::default(),
    };

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(timeout) = args.recv_timeout_ms {
        config.recv_timeout_ms = timeout;
    }
    if let Some(max) = args.max_frame_bytes {
        config.max_frame_bytes = max;
    }

    config.validate().context("Invalid server configuration")?;
    debug!("Effective server config: {:?}", config);

    Ok(config)
}

/// Execute the serve command
///
/// **Public** - main entry point called from main.rs
///
/// Blocks until `token` is cancelled.
pub fn execute_serve(args: ServeArgs, token: &CancellationToken) -> Result<ServeStats> {
    let config = resolve_config(&args)?;

    info!("Starting change-diff service on {}", config.bind_addr());

    let server = DiffServer::bind(config).context("Failed to start server")?;
    let stats = server.serve(token).context("Server loop failed")?;

    Ok(stats)
}
