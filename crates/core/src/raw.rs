//! Raw vendor payload handling.
//!
//! Vendor records arrive as loosely-typed JSON: field names drift across
//! firmware versions, numbers show up as strings, and timestamps come in
//! three shapes. Everything in this module stays untyped; the only way out
//! is [`crate::normalize::normalize`].

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One untyped vendor record.
///
/// Wraps the raw JSON object and answers alias-based field lookups. Lookup
/// is first-match over the alias list; `null` values count as absent.
#[derive(Debug, Clone)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Wrap a JSON value, rejecting anything that is not an object.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map.clone())),
            other => Err(Error::validation(
                "record",
                format!("expected a JSON object, got {}", type_name(other)),
            )),
        }
    }

    /// First non-null value under any of the given aliases.
    pub fn get(&self, aliases: &[&str]) -> Option<&Value> {
        aliases
            .iter()
            .filter_map(|key| self.0.get(*key))
            .find(|v| !v.is_null())
    }

    /// String field; numbers are stringified, blank strings count as absent.
    pub fn str_field(&self, aliases: &[&str]) -> Option<String> {
        match self.get(aliases)? {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Numeric field; numeric strings are parsed.
    pub fn f64_field(&self, aliases: &[&str]) -> Option<f64> {
        match self.get(aliases)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Boolean field; accepts JSON bools, "true"/"false" strings, and 0/1.
    pub fn bool_field(&self, aliases: &[&str]) -> Option<bool> {
        match self.get(aliases)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            Value::Number(n) => n.as_i64().map(|i| i != 0),
            _ => None,
        }
    }

    /// Timestamp field; accepts RFC 3339 strings and Unix seconds or
    /// milliseconds (values past the year ~33658 are assumed to be ms).
    pub fn timestamp_field(&self, aliases: &[&str]) -> Option<DateTime<Utc>> {
        match self.get(aliases)? {
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => {
                let raw = n.as_i64()?;
                if raw > 1_000_000_000_000 {
                    Utc.timestamp_millis_opt(raw).single()
                } else {
                    Utc.timestamp_opt(raw, 0).single()
                }
            }
            _ => None,
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parsed vendor payload.
///
/// Records stay as raw `Value`s so a malformed element fails during
/// normalization of that record alone, never the whole batch.
#[derive(Debug, Clone)]
pub struct VendorPayload {
    pub records: Vec<Value>,
}

impl VendorPayload {
    /// Parse a vendor payload from JSON bytes.
    /// Supports:
    /// 1. Array: `[record, record, ...]`
    /// 2. Wrapper object: `{ "records": [...] }` (vendors also use "tanks"
    ///    and "data" for the array key)
    /// 3. Single record: `{ "tankId": "...", ... }`
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::validation("payload", format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parse an already-decoded JSON value (scheduled-pull path).
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(records) => Ok(Self { records }),
            Value::Object(mut obj) => {
                for key in ["records", "tanks", "data"] {
                    if let Some(inner) = obj.remove(key) {
                        return match inner {
                            Value::Array(records) => Ok(Self { records }),
                            other => Err(Error::validation(
                                key,
                                format!("expected an array, got {}", type_name(&other)),
                            )),
                        };
                    }
                }
                // Single record.
                Ok(Self {
                    records: vec![Value::Object(obj)],
                })
            }
            other => Err(Error::validation(
                "payload",
                format!(
                    "request body must be a record, an array of records, or a wrapper object, got {}",
                    type_name(&other)
                ),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
