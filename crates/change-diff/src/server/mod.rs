//! Framed request/reply server for the diff protocol.
//!
//! One worker thread per connection; each connection handles one request at a
//! time. Shutdown is driven by a [`CancellationToken`] checked between accept
//! polls and between receive timeouts.
//!
//! # Example
//! ```ignore
//! use change_diff::server::{CancellationToken, DiffServer};
//! use change_diff::utils::config::ServerConfig;
//!
//! let server = DiffServer::bind(ServerConfig::default())?;
//! let token = CancellationToken::new();
//! server.serve(&token)?;
//! ```

pub mod frame;
pub mod shutdown;

pub use frame::{read_frame, write_frame};
pub use shutdown::CancellationToken;

use log::{debug, error, info, warn};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::protocol::{error_value, handle_message_safely, serialize_response};
use crate::utils::config::{ServerConfig, ACCEPT_POLL_INTERVAL};
use crate::utils::error::TransportError;

/// Totals reported when the serve loop exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    pub connections: u64,
    pub requests: u64,
}

/// A bound, not yet serving, diff server
#[derive(Debug)]
pub struct DiffServer {
    listener: TcpListener,
    config: ServerConfig,
}

impl DiffServer {
    /// Validate `config` and bind the listening socket
    ///
    /// # Errors
    /// * `TransportError::Config` - If the configuration is invalid
    /// * `TransportError::Io` - If the address cannot be bound
    pub fn bind(config: ServerConfig) -> Result<Self, TransportError> {
        config.validate()?;

        let listener = TcpListener::bind(config.bind_addr())?;
        listener.set_nonblocking(true)?;

        info!("[change-diff] Listening on {}", listener.local_addr()?);

        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `token` is cancelled
    ///
    /// Returns once every connection worker has finished.
    pub fn serve(self, token: &CancellationToken) -> Result<ServeStats, TransportError> {
        let requests = Arc::new(AtomicU64::new(0));
        let mut connections = 0u64;
        let mut workers: Vec<JoinHandle<()>> = Vec::new();

        while !token.is_cancelled() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    connections += 1;
                    match self.spawn_worker(stream, peer, token, Arc::clone(&requests)) {
                        Ok(handle) => workers.push(handle),
                        Err(e) => warn!("Dropping connection from {}: {}", peer, e),
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }

            workers.retain(|worker| !worker.is_finished());
        }

        info!(
            "[change-diff] Shutdown requested; waiting for {} open connection(s)",
            workers.len()
        );

        for worker in workers {
            if worker.join().is_err() {
                error!("Connection worker terminated abnormally");
            }
        }

        let stats = ServeStats {
            connections,
            requests: requests.load(Ordering::SeqCst),
        };

        info!(
            "[change-diff] Stopped after {} connection(s), {} request(s)",
            stats.connections, stats.requests
        );

        Ok(stats)
    }

    fn spawn_worker(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        token: &CancellationToken,
        requests: Arc<AtomicU64>,
    ) -> io::Result<JoinHandle<()>> {
        // accepted sockets may inherit non-blocking mode from the listener
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(self.config.recv_timeout()))?;
        // a peer that stops reading must not pin the worker past shutdown
        stream.set_write_timeout(Some(self.config.recv_timeout()))?;

        let token = token.clone();
        let max_frame_bytes = self.config.max_frame_bytes;

        debug!("Accepted connection from {}", peer);

        thread::Builder::new()
            .name(format!("change-diff-conn-{}", peer))
            .spawn(move || serve_connection(stream, peer, max_frame_bytes, &token, &requests))
    }
}

/// Request/reply loop for one connection
fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    max_frame_bytes: usize,
    token: &CancellationToken,
    requests: &AtomicU64,
) {
    loop {
        let payload = match read_frame(&mut stream, max_frame_bytes, Some(token)) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("Connection from {} closed", peer);
                return;
            }
            Err(TransportError::Cancelled) => {
                debug!("Closing connection from {} for shutdown", peer);
                return;
            }
            Err(TransportError::FrameTooLarge { size, max }) => {
                warn!("Refusing {} byte frame from {} (limit {})", size, peer, max);
                reject_oversized(&mut stream, size, max);
                return;
            }
            Err(e) => {
                warn!("Receive from {} failed: {}", peer, e);
                return;
            }
        };

        info!("Received request ({} bytes) from {}", payload.len(), peer);
        let response = handle_message_safely(&payload);

        if let Err(e) = write_frame(&mut stream, &response) {
            warn!("Send to {} failed: {}", peer, e);
            return;
        }

        requests.fetch_add(1, Ordering::SeqCst);
        debug!("Sent response ({} bytes) to {}", response.len(), peer);
    }
}

/// Answer an oversized frame with an error response before closing
///
/// The unread payload stays on the socket, so the connection cannot be reused.
fn reject_oversized(stream: &mut TcpStream, size: usize, max: usize) {
    let message = format!(
        "Request frame of {} bytes exceeds the {} byte limit.",
        size, max
    );

    let sent = serialize_response(&error_value(&message))
        .map_err(TransportError::from)
        .and_then(|bytes| write_frame(stream, &bytes));

    if let Err(e) = sent {
        debug!("Could not send frame-size rejection: {}", e);
    }
}
