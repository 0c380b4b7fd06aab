//! Blocking client for the framed diff service.

use log::debug;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::protocol::{parse_response, DiffRequest, DiffResponse};
use crate::server::{read_frame, write_frame};
use crate::utils::config::DEFAULT_MAX_FRAME_BYTES;
use crate::utils::error::TransportError;

/// Default time to wait for a connection, a write, or a reply
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// One connection to a diff server
///
/// Requests on a connection are strictly sequential: each call waits for its
/// reply before returning.
#[derive(Debug)]
pub struct DiffClient {
    stream: TcpStream,
    max_frame_bytes: usize,
}

impl DiffClient {
    /// Connect with the given timeout applied to reads and writes
    pub fn connect(addr: impl ToSocketAddrs, timeout: Duration) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        debug!("Connected to {}", stream.peer_addr()?);

        Ok(Self {
            stream,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        })
    }

    /// Send raw bytes as one request and return the raw reply
    ///
    /// # Errors
    /// * `TransportError::Io` - On socket failure or reply timeout
    /// * `TransportError::UnexpectedEof` - If the server closed without replying
    pub fn send_raw(&mut self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        write_frame(&mut self.stream, payload)?;
        read_frame(&mut self.stream, self.max_frame_bytes, None)?
            .ok_or(TransportError::UnexpectedEof)
    }

    /// Send a typed request and decode the reply
    pub fn diff(&mut self, request: &DiffRequest) -> Result<DiffResponse, TransportError> {
        let payload = serde_json::to_vec(&request.to_json())?;
        let reply = self.send_raw(&payload)?;
        Ok(parse_response(&reply)?)
    }
}
