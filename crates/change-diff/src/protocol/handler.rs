//! Message handling: request bytes in, response bytes out.
//!
//! Nothing here touches a socket, which keeps the whole request path
//! testable without a server.

use log::{debug, error, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::request::{parse_request_bytes, validate_request};
use super::response::{error_value, serialize_response, success_value};
use crate::diff::{compute_diff, DiffReport};
use crate::utils::error::RequestError;

// Used only if encoding the error envelope itself fails
const FALLBACK_RESPONSE: &[u8] =
    br#"{"error":"Internal error: failed to encode response","status":"error"}"#;

/// Decode, validate and reconcile one request
///
/// Validation runs to completion before any reconciliation work starts.
///
/// # Errors
/// Any [`RequestError`]; engine failures arrive as `RequestError::Internal`
pub fn process_request(raw: &[u8]) -> Result<DiffReport, RequestError> {
    let request = parse_request_bytes(raw)?;
    let request = validate_request(request)?;

    let report = compute_diff(
        &request.before,
        &request.after,
        &request.id_field,
        &request.fields_to_compare,
    )?;

    Ok(report)
}

/// Handle one raw message and produce the encoded response
pub fn handle_message(raw: &[u8]) -> Vec<u8> {
    let response = match process_request(raw) {
        Ok(report) => success_value(report),
        Err(err) => {
            warn!("Request rejected ({}): {}", err.kind(), err);
            error_value(&err.to_string())
        }
    };

    encode(&response)
}

/// [`handle_message`], with panics converted into an internal error response
///
/// Used at the transport boundary so one bad request cannot take the
/// service down.
pub fn handle_message_safely(raw: &[u8]) -> Vec<u8> {
    panic::catch_unwind(AssertUnwindSafe(|| handle_message(raw))).unwrap_or_else(|payload| {
        let detail = panic_detail(payload.as_ref());
        error!("Request handler panicked: {}", detail);
        encode(&error_value(&RequestError::Internal(detail).to_string()))
    })
}

fn encode(response: &serde_json::Value) -> Vec<u8> {
    match serialize_response(response) {
        Ok(bytes) => {
            debug!("Encoded response ({} bytes)", bytes.len());
            bytes
        }
        Err(err) => {
            error!("Failed to encode response: {}", err);
            FALLBACK_RESPONSE.to_vec()
        }
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_body() {
        let out = handle_message(b"definitely not json");
        assert_eq!(
            out,
            br#"{"error":"Invalid JSON in request body.","status":"error"}"#.to_vec()
        );
    }

    #[test]
    fn test_panic_detail_variants() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_detail(boxed.as_ref()), "static message");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_detail(boxed.as_ref()), "owned");

        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_detail(boxed.as_ref()), "unknown panic");
    }

    #[test]
    fn test_safe_handler_passes_through() {
        assert_eq!(handle_message_safely(b"{}"), handle_message(b"{}"));
    }
}
