//! Schema definitions for diff results.
//!
//! Records are open-ended JSON objects; the engine never looks inside them
//! beyond the identity field and the compared fields, so every other field
//! passes through to the report untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// One record of a snapshot
pub type Record = Map<String, Value>;

/// Hashable, ordered key derived from a scalar identity value
///
/// Equality and hashing use the canonical form only: numbers are normalized
/// with [`normalized_number`], so `1` and `1.0` name the same record while
/// `1` and `"1"` do not. Ordering is by `sort_key` first (the textual form the
/// diff output is sorted on) and then by the canonical form.
#[derive(Debug, Clone)]
pub struct IdentityKey {
    sort_key: String,
    canonical: String,
}

impl IdentityKey {
    /// Build the key for an identity value
    ///
    /// Returns `None` for arrays and objects, which cannot act as identities.
    pub fn from_value(value: &Value) -> Option<Self> {
        let sort_key = identity_sort_key(value)?;
        let canonical = match value {
            Value::Number(n) => normalized_number(n),
            other => other.to_string(),
        };
        Some(Self {
            sort_key,
            canonical,
        })
    }

    /// Textual form used for ordering
    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }
}

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for IdentityKey {}

impl Hash for IdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for IdentityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IdentityKey {
    // keys with one canonical form are one identity, whatever their spelling
    fn cmp(&self, other: &Self) -> Ordering {
        if self.canonical == other.canonical {
            return Ordering::Equal;
        }
        self.sort_key
            .cmp(&other.sort_key)
            .then_with(|| self.canonical.cmp(&other.canonical))
    }
}

/// Value-level text of a number
///
/// Two numbers are equal exactly when their normalized texts are equal:
/// integers print as integers (exactly, at any size), integral floats print as
/// the integer they hold, and other floats print in shortest round-trip form.
pub fn normalized_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }

    let text = n.to_string();
    if is_integer_literal(&text) {
        return text;
    }

    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && (I64_MIN_F64..I64_MAX_F64).contains(&f) => {
            (f as i64).to_string()
        }
        Some(f) => f.to_string(),
        None => text,
    }
}

const I64_MIN_F64: f64 = i64::MIN as f64;
const I64_MAX_F64: f64 = i64::MAX as f64;

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// String form of a scalar identity value used for ordering
///
/// Strings sort as themselves, numbers by their text as written, booleans as
/// `True`/`False` and null as `None`. Numeric identities therefore sort
/// textually: `10` comes before `2`.
pub fn identity_sort_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("None".to_string()),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Name of a JSON value's type, for error messages
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Complete result of reconciling two snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct DiffReport {
    /// Identity field used to match records
    pub id_field: String,

    /// Compared fields, as supplied by the caller
    pub fields_to_compare: Vec<String>,

    /// Records only present in the after snapshot
    pub added_items: Vec<Record>,

    /// Records only present in the before snapshot
    pub removed_items: Vec<Record>,

    /// Records present in both with at least one changed field
    pub modified_items: Vec<ModifiedItem>,
}

impl DiffReport {
    /// True when nothing was added, removed or modified
    pub fn is_empty(&self) -> bool {
        self.added_items.is_empty()
            && self.removed_items.is_empty()
            && self.modified_items.is_empty()
    }

    /// Aggregate counts for display
    pub fn summary(&self) -> DiffSummary {
        let mut changes_by_field = BTreeMap::new();
        for item in &self.modified_items {
            for change in &item.changed_fields {
                *changes_by_field.entry(change.field.clone()).or_insert(0) += 1;
            }
        }

        DiffSummary {
            added: self.added_items.len(),
            removed: self.removed_items.len(),
            modified: self.modified_items.len(),
            changes_by_field,
        }
    }
}

/// A record matched in both snapshots whose tracked fields differ
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedItem {
    /// Identity value shared by both records
    pub id: Value,

    pub before: Record,
    pub after: Record,

    /// Changed fields in `fields_to_compare` order
    pub changed_fields: Vec<FieldChange>,
}

impl ModifiedItem {
    /// Look up the change recorded for `field`
    pub fn change_for(&self, field: &str) -> Option<&FieldChange> {
        self.changed_fields.iter().find(|c| c.field == field)
    }
}

/// Before/after values of one changed field
///
/// A field missing from a record is reported as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub before: Value,
    pub after: Value,
}

/// Counts derived from a [`DiffReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,

    /// How many modified records changed each field
    pub changes_by_field: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_key_textual_forms() {
        assert_eq!(identity_sort_key(&json!(10)).unwrap(), "10");
        assert_eq!(identity_sort_key(&json!("abc")).unwrap(), "abc");
        assert_eq!(identity_sort_key(&json!(true)).unwrap(), "True");
        assert_eq!(identity_sort_key(&Value::Null).unwrap(), "None");
        assert!(identity_sort_key(&json!([1])).is_none());
        assert!(identity_sort_key(&json!({"a": 1})).is_none());
    }

    #[test]
    fn test_number_and_string_keys_distinct_but_adjacent() {
        let num = IdentityKey::from_value(&json!(1)).unwrap();
        let text = IdentityKey::from_value(&json!("1")).unwrap();
        let two = IdentityKey::from_value(&json!(2)).unwrap();

        assert_ne!(num, text);
        assert_eq!(num.sort_key(), text.sort_key());
        assert!(num < two && text < two);
    }

    #[test]
    fn test_integral_float_is_same_identity() {
        let int = IdentityKey::from_value(&json!(1)).unwrap();
        let float: Value = serde_json::from_str("1.0").unwrap();
        let float = IdentityKey::from_value(&float).unwrap();

        assert_eq!(int, float);
        assert_eq!(float.sort_key(), "1.0");
        assert_eq!(int.cmp(&float), Ordering::Equal);
    }

    #[test]
    fn test_normalized_number_forms() {
        let parse = |text: &str| -> Number { serde_json::from_str(text).unwrap() };

        assert_eq!(normalized_number(&parse("-0")), "0");
        assert_eq!(normalized_number(&parse("2.50")), "2.5");
        assert_eq!(normalized_number(&parse("1e3")), "1000");
        assert_eq!(
            normalized_number(&parse("123456789012345678901234567890")),
            "123456789012345678901234567890"
        );
        assert_ne!(
            normalized_number(&parse("123456789012345678901234567890")),
            normalized_number(&parse("123456789012345678901234567891"))
        );
    }

    #[test]
    fn test_sort_key_keeps_written_text() {
        let big: Value = serde_json::from_str("123456789012345678901234567890").unwrap();
        assert_eq!(
            identity_sort_key(&big).unwrap(),
            "123456789012345678901234567890"
        );

        let float: Value = serde_json::from_str("2.50").unwrap();
        assert_eq!(identity_sort_key(&float).unwrap(), "2.50");
    }

    #[test]
    fn test_numeric_keys_sort_textually() {
        let ten = IdentityKey::from_value(&json!(10)).unwrap();
        let two = IdentityKey::from_value(&json!(2)).unwrap();
        assert!(ten < two);
    }
}
