//! Request command implementation.
//! Sends a request body from a file to a running service.

use super::models::RequestArgs;
use crate::client::DiffClient;
use crate::output::read_request_file;
use anyhow::{bail, Context, Result};
use log::info;
use std::io::Write;

/// Execute the request command and print the raw reply
pub fn execute_request(args: RequestArgs) -> Result<Vec<u8>> {
    if args.timeout.is_zero() {
        bail!("Reply timeout must be greater than zero");
    }

    let body = read_request_file(&args.file).context("Failed to read request file")?;

    info!("Sending {} byte request to {}", body.len(), args.addr);

    let mut client = DiffClient::connect(args.addr.as_str(), args.timeout)
        .with_context(|| format!("Failed to connect to {}", args.addr))?;
    let reply = client.send_raw(&body).context("Request failed")?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&reply)?;
    stdout.write_all(b"\n")?;

    Ok(reply)
}
