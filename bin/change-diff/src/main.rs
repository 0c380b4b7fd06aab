//! Change Diff CLI
//!
//! Serves the snapshot reconciliation protocol and runs diffs offline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use change_diff::commands::{
    display_schema, display_version, execute_diff, execute_request, execute_serve, DiffArgs,
    RequestArgs, ServeArgs,
};
use change_diff::server::CancellationToken;
use change_diff::utils::config::{DEFAULT_ID_FIELD, PORT_ENV_VAR};

/// Change Diff - deterministic snapshot reconciliation
#[derive(Parser, Debug)]
#[command(name = "change-diff")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the request/reply diff service
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = PORT_ENV_VAR)]
        port: Option<u16>,

        /// Receive timeout in milliseconds (shutdown latency)
        #[arg(long)]
        recv_timeout_ms: Option<u64>,

        /// Largest accepted request frame in bytes
        #[arg(long)]
        max_frame_bytes: Option<usize>,
    },

    /// Diff two snapshot files without a server
    Diff {
        /// Before snapshot (JSON array of objects)
        #[arg(short, long)]
        before: PathBuf,

        /// After snapshot (JSON array of objects)
        #[arg(short, long)]
        after: PathBuf,

        /// Fields to compare, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        fields: Vec<String>,

        /// Identity field
        #[arg(long, default_value = DEFAULT_ID_FIELD)]
        id_field: String,

        /// Write the encoded report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a human-readable summary
        #[arg(long)]
        summary: bool,
    },

    /// Send a raw request body to a running service
    Request {
        /// File holding the request JSON
        #[arg(short, long)]
        file: PathBuf,

        /// Service address
        #[arg(long, default_value = "127.0.0.1:5563")]
        addr: String,

        /// Reply timeout in seconds
        #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
        timeout: u64,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            recv_timeout_ms,
            max_frame_bytes,
        } => {
            let token = CancellationToken::new();
            let handler_token = token.clone();
            ctrlc::set_handler(move || {
                info!("[change-diff] Interrupted via keyboard.");
                handler_token.cancel();
            })
            .context("Failed to install Ctrl-C handler")?;

            let args = ServeArgs {
                config_file: config,
                host,
                port,
                recv_timeout_ms,
                max_frame_bytes,
            };

            execute_serve(args, &token)?;
        }

        Commands::Diff {
            before,
            after,
            fields,
            id_field,
            output,
            summary,
        } => {
            let args = DiffArgs {
                before,
                after,
                id_field,
                fields,
                output,
                summary,
            };

            execute_diff(args)?;
        }

        Commands::Request {
            file,
            addr,
            timeout,
        } => {
            let args = RequestArgs {
                addr,
                file,
                timeout: Duration::from_secs(timeout),
            };

            execute_request(args)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
