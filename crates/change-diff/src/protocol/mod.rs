//! The `change_diff` request/response protocol.
//!
//! Requests and responses are single JSON objects. See [`request`] for the
//! validation rules and [`response`] for the encoding contract.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{handle_message, handle_message_safely, process_request};
pub use request::{parse_request_bytes, validate_request, DiffRequest};
pub use response::{
    error_value, parse_response, serialize_response, success_value, DiffResponse, SuccessBody,
};
