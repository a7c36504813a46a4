//! JSON output serialization (NDJSON format)
//!
//! Serializes parsed rows to newline-delimited JSON (NDJSON).
//! Each row becomes a JSON object keyed by column name.

use crate::convert::row_to_json;
use crate::error::Error;
use crate::value::Row;

/// Serialize rows to NDJSON format (newline-delimited JSON)
///
/// Each row is serialized as a JSON object with column names as keys.
/// Each row ends with a newline character ('\n'). Handy for dead-letter
/// queues and for inspecting what a sink would write.
///
/// # Example
///
/// ```ignore
/// use events2cql::output::to_ndjson;
///
/// let rows = vec![parser.parse(&event)?];
/// let bytes = to_ndjson(&rows)?;
/// // {"id": 7, "ports": [80, 443]}
/// ```
pub fn to_ndjson(rows: &[Row]) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    for row in rows {
        serde_json::to_writer(&mut buffer, &row_to_json(row))?;
        buffer.push(b'\n');
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ParsedField, TypedValue};

    fn create_test_rows() -> Vec<Row> {
        ["alpha", "beta", "gamma"]
            .iter()
            .zip(1..)
            .map(|(name, value)| {
                vec![
                    ParsedField::new("name", TypedValue::Text(name.to_string())),
                    ParsedField::new("value", TypedValue::Long(value)),
                ]
            })
            .collect()
    }

    #[test]
    fn test_to_ndjson_basic() {
        let rows = create_test_rows();
        let result = to_ndjson(&rows).unwrap();
        let json_str = String::from_utf8(result).unwrap();

        // Split into lines and verify each is valid JSON
        let lines: Vec<&str> = json_str.lines().collect();
        assert_eq!(lines.len(), 3);

        let obj1: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(obj1["name"], "alpha");
        assert_eq!(obj1["value"], 1);

        let obj3: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(obj3["name"], "gamma");
        assert_eq!(obj3["value"], 3);
        assert!(json_str.ends_with('\n'));
    }

    #[test]
    fn test_to_ndjson_empty() {
        let result = to_ndjson(&[]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_to_ndjson_collections() {
        let rows = vec![vec![ParsedField::new(
            "ports",
            TypedValue::List(vec![TypedValue::Int(80), TypedValue::Int(443)]),
        )]];
        let result = String::from_utf8(to_ndjson(&rows).unwrap()).unwrap();
        let obj: serde_json::Value = serde_json::from_str(result.trim_end()).unwrap();
        assert_eq!(obj["ports"], serde_json::json!([80, 443]));
    }
}
