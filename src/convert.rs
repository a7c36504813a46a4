// src/convert.rs
//! Shared conversion utilities for TypedValue to JSON

use chrono::SecondsFormat;

use crate::value::{ParsedField, TypedValue};

/// Convert a TypedValue to serde_json::Value.
/// Returns None for values that cannot be represented in JSON (NaN, Infinity).
/// VARINT and DECIMAL become strings so no precision is lost.
/// MAP keys are rendered with their Display form.
pub fn typed_value_to_json(v: &TypedValue) -> Option<serde_json::Value> {
    match v {
        TypedValue::Int(i) => Some(serde_json::Value::Number((*i).into())),
        TypedValue::Long(i) => Some(serde_json::Value::Number((*i).into())),
        TypedValue::Float(f) => {
            serde_json::Number::from_f64(f64::from(f.into_inner())).map(serde_json::Value::Number)
        }
        TypedValue::Double(f) => {
            serde_json::Number::from_f64(f.into_inner()).map(serde_json::Value::Number)
        }
        TypedValue::Varint(i) => Some(serde_json::Value::String(i.to_string())),
        TypedValue::Decimal(d) => Some(serde_json::Value::String(d.to_string())),
        TypedValue::Boolean(b) => Some(serde_json::Value::Bool(*b)),
        TypedValue::Text(s) => Some(serde_json::Value::String(s.clone())),
        TypedValue::Inet(addr) => Some(serde_json::Value::String(addr.to_string())),
        TypedValue::Uuid(uuid) => Some(serde_json::Value::String(uuid.to_string())),
        TypedValue::Timestamp(ts) => Some(serde_json::Value::String(
            ts.to_rfc3339_opts(SecondsFormat::Millis, true),
        )),
        TypedValue::Blob(bytes) => Some(serde_json::Value::String(format!(
            "0x{}",
            const_hex::encode(bytes)
        ))),
        TypedValue::List(items) => {
            let items: Vec<_> = items.iter().filter_map(typed_value_to_json).collect();
            Some(serde_json::Value::Array(items))
        }
        TypedValue::Set(items) => {
            let items: Vec<_> = items.iter().filter_map(typed_value_to_json).collect();
            Some(serde_json::Value::Array(items))
        }
        TypedValue::Map(map) => {
            // Entries whose value has no JSON form are dropped
            let obj: serde_json::Map<String, serde_json::Value> = map
                .iter()
                .filter_map(|(k, v)| typed_value_to_json(v).map(|jv| (k.to_string(), jv)))
                .collect();
            Some(serde_json::Value::Object(obj))
        }
    }
}

/// Convert a TypedValue to serde_json::Value, using null for unconvertible values.
pub fn typed_value_to_json_lossy(v: &TypedValue) -> serde_json::Value {
    typed_value_to_json(v).unwrap_or(serde_json::Value::Null)
}

/// Convert a parsed row to a JSON object keyed by column name.
pub fn row_to_json(row: &[ParsedField]) -> serde_json::Value {
    let obj: serde_json::Map<String, serde_json::Value> = row
        .iter()
        .map(|field| (field.column.clone(), typed_value_to_json_lossy(&field.value)))
        .collect();
    serde_json::Value::Object(obj)
}
