//! Response envelopes and their canonical encoding.
//!
//! Encoded responses sort object keys at every depth, carry no insignificant
//! whitespace and escape non-ASCII characters as `\uXXXX`, so the same logical
//! response always produces the same bytes.

use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use std::io;

use crate::diff::{DiffReport, ModifiedItem, Record};

/// Build the success envelope for a report
pub fn success_value(report: DiffReport) -> Value {
    let id_field = report.id_field;

    let modified = report
        .modified_items
        .into_iter()
        .map(|item| modified_item_value(&id_field, item))
        .collect();

    let mut body = Map::new();
    body.insert("status".to_string(), Value::from("ok"));
    body.insert(
        "fields_to_compare".to_string(),
        Value::from(report.fields_to_compare),
    );
    body.insert("added_items".to_string(), records_value(report.added_items));
    body.insert("removed_items".to_string(), records_value(report.removed_items));
    body.insert("modified_items".to_string(), Value::Array(modified));
    body.insert("id_field".to_string(), Value::String(id_field));
    Value::Object(body)
}

/// Build the error envelope
pub fn error_value(message: &str) -> Value {
    let mut body = Map::new();
    body.insert("status".to_string(), Value::from("error"));
    body.insert("error".to_string(), Value::from(message));
    Value::Object(body)
}

fn records_value(records: Vec<Record>) -> Value {
    Value::Array(records.into_iter().map(Value::Object).collect())
}

/// Wire form of a modified item
///
/// The identity goes in first under `id_field`; an `id_field` named `before`,
/// `after` or `changed_fields` is then overwritten by the fixed keys.
fn modified_item_value(id_field: &str, item: ModifiedItem) -> Value {
    let changed_fields: Map<String, Value> = item
        .changed_fields
        .into_iter()
        .map(|change| {
            let mut pair = Map::new();
            pair.insert("before".to_string(), change.before);
            pair.insert("after".to_string(), change.after);
            (change.field, Value::Object(pair))
        })
        .collect();

    let mut entry = Map::new();
    entry.insert(id_field.to_string(), item.id);
    entry.insert("before".to_string(), Value::Object(item.before));
    entry.insert("after".to_string(), Value::Object(item.after));
    entry.insert("changed_fields".to_string(), Value::Object(changed_fields));
    Value::Object(entry)
}

/// Encode a response deterministically
///
/// # Errors
/// Only if the writer fails, which cannot happen for an in-memory buffer
pub fn serialize_response(response: &Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::with_capacity(256);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    Canonical(response).serialize(&mut serializer)?;
    Ok(out)
}

/// Serializes a value with object keys in sorted order regardless of the
/// map implementation backing `serde_json::Map`
struct Canonical<'a>(&'a Value);

impl Serialize for Canonical<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&Canonical(item))?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));

                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    out.serialize_entry(key, &Canonical(value))?;
                }
                out.end()
            }
            scalar => scalar.serialize(serializer),
        }
    }
}

/// Compact formatter that escapes every non-ASCII character and DEL
struct AsciiFormatter;

fn needs_escape(ch: char) -> bool {
    !ch.is_ascii() || ch == '\x7f'
}

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if !fragment.chars().any(needs_escape) {
            return writer.write_all(fragment.as_bytes());
        }

        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if needs_escape(ch) {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            } else {
                writer.write_all(&[ch as u8])?;
            }
        }
        Ok(())
    }
}

/// Decoded response, as seen by a client
#[derive(Debug, Clone, PartialEq)]
pub enum DiffResponse {
    Ok(SuccessBody),
    Error { error: String },
}

/// Body of a success response
///
/// Modified items stay generic objects because their identity key is named
/// by `id_field`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SuccessBody {
    pub id_field: String,
    pub fields_to_compare: Vec<String>,
    pub added_items: Vec<Record>,
    pub removed_items: Vec<Record>,
    pub modified_items: Vec<Record>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Decode response bytes produced by a diff service
///
/// Goes through [`Value`] rather than a tagged derive so numbers keep their
/// exact text.
pub fn parse_response(raw: &[u8]) -> Result<DiffResponse, serde_json::Error> {
    let value: Value = serde_json::from_slice(raw)?;

    match value.get("status").and_then(Value::as_str) {
        Some("ok") => Ok(DiffResponse::Ok(serde_json::from_value(value)?)),
        Some("error") => {
            let body: ErrorBody = serde_json::from_value(value)?;
            Ok(DiffResponse::Error { error: body.error })
        }
        _ => Err(serde::de::Error::custom(
            "response 'status' must be \"ok\" or \"error\"",
        )),
    }
}
