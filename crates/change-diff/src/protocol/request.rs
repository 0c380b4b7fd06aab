//! Request decoding and validation.
//!
//! Checks run in a fixed order and the first failure ends validation:
//! request type, identity field, comparison fields, snapshot shape.

use log::debug;
use serde_json::{Map, Value};

use crate::diff::Record;
use crate::utils::config::{DEFAULT_ID_FIELD, REQUEST_TYPE};
use crate::utils::error::RequestError;

/// A validated diff request
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRequest {
    pub id_field: String,
    pub fields_to_compare: Vec<String>,
    pub before: Vec<Record>,
    pub after: Vec<Record>,
}

impl DiffRequest {
    /// Request using the default identity field
    pub fn new(fields_to_compare: Vec<String>, before: Vec<Record>, after: Vec<Record>) -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            fields_to_compare,
            before,
            after,
        }
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Wire form of this request, including `request_type`
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("request_type".to_string(), Value::from(REQUEST_TYPE));
        body.insert("id_field".to_string(), Value::from(self.id_field.as_str()));
        body.insert(
            "fields_to_compare".to_string(),
            Value::from(self.fields_to_compare.clone()),
        );
        body.insert("before".to_string(), records_to_value(&self.before));
        body.insert("after".to_string(), records_to_value(&self.after));
        Value::Object(body)
    }
}

fn records_to_value(records: &[Record]) -> Value {
    Value::Array(records.iter().cloned().map(Value::Object).collect())
}

/// Decode raw bytes into a JSON object
///
/// # Errors
/// * `RequestError::InvalidJson` - If the bytes are not UTF-8 JSON
/// * `RequestError::NotAnObject` - If the JSON is not an object
pub fn parse_request_bytes(raw: &[u8]) -> Result<Map<String, Value>, RequestError> {
    let value: Value = serde_json::from_slice(raw).map_err(RequestError::InvalidJson)?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(RequestError::NotAnObject),
    }
}

/// Validate a decoded request and take ownership of its parts
///
/// # Errors
/// * `RequestError::UnsupportedRequestType` - `request_type` is not `change_diff`
/// * `RequestError::InvalidIdField` - `id_field` present but blank or not a string
/// * `RequestError::MissingComparisonFields` - `fields_to_compare` missing, empty or not a list
/// * `RequestError::InvalidComparisonField` - an entry is blank or not a string
/// * `RequestError::SnapshotsNotLists` - `before` or `after` missing or not a list
/// * `RequestError::SnapshotElementNotObject` - a snapshot holds a non-object
pub fn validate_request(mut request: Map<String, Value>) -> Result<DiffRequest, RequestError> {
    if request.get("request_type").and_then(Value::as_str) != Some(REQUEST_TYPE) {
        return Err(RequestError::UnsupportedRequestType);
    }

    let id_field = match request.remove("id_field") {
        None => DEFAULT_ID_FIELD.to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(_) => return Err(RequestError::InvalidIdField),
    };

    let fields_to_compare = match request.remove("fields_to_compare") {
        Some(Value::Array(items)) if !items.is_empty() => validate_field_names(items)?,
        _ => return Err(RequestError::MissingComparisonFields),
    };

    let (before, after) = match (request.remove("before"), request.remove("after")) {
        (Some(Value::Array(before)), Some(Value::Array(after))) => (before, after),
        _ => return Err(RequestError::SnapshotsNotLists),
    };

    let before = into_records(before)?;
    let after = into_records(after)?;

    debug!(
        "Validated request: id_field='{}', {} field(s), {} before / {} after record(s)",
        id_field,
        fields_to_compare.len(),
        before.len(),
        after.len()
    );

    Ok(DiffRequest {
        id_field,
        fields_to_compare,
        before,
        after,
    })
}

fn validate_field_names(items: Vec<Value>) -> Result<Vec<String>, RequestError> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(RequestError::InvalidComparisonField),
        })
        .collect()
}

fn into_records(items: Vec<Value>) -> Result<Vec<Record>, RequestError> {
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            _ => Err(RequestError::SnapshotElementNotObject),
        })
        .collect()
}
