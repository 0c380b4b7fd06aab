//! Length-prefixed message framing.
//!
//! Every message is a 4-byte big-endian payload length followed by the
//! payload. Request and response use the same framing.

use std::io::{self, Read, Write};

use super::shutdown::CancellationToken;
use crate::utils::error::TransportError;

pub const HEADER_LEN: usize = 4;

/// Write one frame and flush
pub fn write_frame<W: Write + ?Sized>(writer: &mut W, payload: &[u8]) -> Result<(), TransportError> {
    let len = u32::try_from(payload.len()).map_err(|_| TransportError::FrameTooLarge {
        size: payload.len(),
        max: u32::MAX as usize,
    })?;

    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Read one frame
///
/// With a `token`, read timeouts are waits: the read resumes unless the token
/// was cancelled. Without one, a timeout is an error.
///
/// # Returns
/// `None` when the peer closed the connection between frames
///
/// # Errors
/// * `TransportError::FrameTooLarge` - Declared length above `max_frame_bytes`
/// * `TransportError::UnexpectedEof` - Peer closed mid-frame
/// * `TransportError::Cancelled` - Token cancelled while waiting
/// * `TransportError::Io` - Any other socket failure
pub fn read_frame<R: Read + ?Sized>(
    reader: &mut R,
    max_frame_bytes: usize,
    token: Option<&CancellationToken>,
) -> Result<Option<Vec<u8>>, TransportError> {
    let mut header = [0u8; HEADER_LEN];
    if !read_full(reader, &mut header, token, true)? {
        return Ok(None);
    }

    let size = u32::from_be_bytes(header) as usize;
    if size > max_frame_bytes {
        return Err(TransportError::FrameTooLarge {
            size,
            max: max_frame_bytes,
        });
    }

    let mut payload = vec![0u8; size];
    read_full(reader, &mut payload, token, false)?;
    Ok(Some(payload))
}

/// Fill `buf` completely
///
/// Returns `false` only for a clean close before the first byte when
/// `at_boundary` is set.
fn read_full<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    token: Option<&CancellationToken>,
    at_boundary: bool,
) -> Result<bool, TransportError> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 && at_boundary => return Ok(false),
            Ok(0) => return Err(TransportError::UnexpectedEof),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if is_timeout(&e) => match token {
                Some(token) if token.is_cancelled() => return Err(TransportError::Cancelled),
                Some(_) => {}
                None => return Err(e.into()),
            },
            Err(e) => return Err(e.into()),
        }
    }

    Ok(true)
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_frame_layout() {
        let mut out = Vec::new();
        write_frame(&mut out, b"abc").unwrap();
        assert_eq!(out, vec![0, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn test_read_consecutive_frames() {
        let mut wire = Vec::new();
        write_frame(&mut wire, b"first").unwrap();
        write_frame(&mut wire, b"").unwrap();

        let mut cursor = Cursor::new(wire);
        assert_eq!(read_frame(&mut cursor, 64, None).unwrap().unwrap(), b"first");
        assert_eq!(read_frame(&mut cursor, 64, None).unwrap().unwrap(), b"");
        assert!(read_frame(&mut cursor, 64, None).unwrap().is_none());
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut cursor = Cursor::new(vec![0, 0, 1, 0]);
        let err = read_frame(&mut cursor, 255, None).unwrap_err();
        assert!(matches!(err, TransportError::FrameTooLarge { size: 256, max: 255 }));
    }

    #[test]
    fn test_truncated_payload() {
        let mut cursor = Cursor::new(vec![0, 0, 0, 5, b'a']);
        let err = read_frame(&mut cursor, 64, None).unwrap_err();
        assert!(matches!(err, TransportError::UnexpectedEof));
    }

    #[test]
    fn test_truncated_header() {
        let mut cursor = Cursor::new(vec![0, 0]);
        let err = read_frame(&mut cursor, 64, None).unwrap_err();
        assert!(matches!(err, TransportError::UnexpectedEof));
    }
}
