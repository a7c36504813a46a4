//! Typed column values produced by the parser.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::IpAddr;

use bigdecimal::BigDecimal;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use num_bigint::BigInt;
use ordered_float::OrderedFloat;
use uuid::Uuid;

/// A parsed column value.
///
/// Floats are wrapped in [`OrderedFloat`] so every value is totally ordered
/// and can live inside a SET or be a MAP key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypedValue {
    /// INT
    Int(i32),
    /// BIGINT and COUNTER
    Long(i64),
    Float(OrderedFloat<f32>),
    Double(OrderedFloat<f64>),
    /// VARINT
    Varint(BigInt),
    Decimal(BigDecimal),
    Boolean(bool),
    /// TEXT, VARCHAR and ASCII
    Text(String),
    Inet(IpAddr),
    /// UUID and TIMEUUID
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Blob(Bytes),
    List(Vec<TypedValue>),
    Set(BTreeSet<TypedValue>),
    Map(BTreeMap<TypedValue, TypedValue>),
}

impl TypedValue {
    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            TypedValue::Int(_) => "int",
            TypedValue::Long(_) => "long",
            TypedValue::Float(_) => "float",
            TypedValue::Double(_) => "double",
            TypedValue::Varint(_) => "varint",
            TypedValue::Decimal(_) => "decimal",
            TypedValue::Boolean(_) => "boolean",
            TypedValue::Text(_) => "text",
            TypedValue::Inet(_) => "inet",
            TypedValue::Uuid(_) => "uuid",
            TypedValue::Timestamp(_) => "timestamp",
            TypedValue::Blob(_) => "blob",
            TypedValue::List(_) => "list",
            TypedValue::Set(_) => "set",
            TypedValue::Map(_) => "map",
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            TypedValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            TypedValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            TypedValue::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<TypedValue>> {
        match self {
            TypedValue::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<TypedValue, TypedValue>> {
        match self {
            TypedValue::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            TypedValue::List(_) | TypedValue::Set(_) | TypedValue::Map(_)
        )
    }
}

/// Renders values the way they would appear in a CQL literal, minus quoting.
impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Int(v) => write!(f, "{}", v),
            TypedValue::Long(v) => write!(f, "{}", v),
            TypedValue::Float(v) => write!(f, "{}", v),
            TypedValue::Double(v) => write!(f, "{}", v),
            TypedValue::Varint(v) => write!(f, "{}", v),
            TypedValue::Decimal(v) => write!(f, "{}", v),
            TypedValue::Boolean(v) => write!(f, "{}", v),
            TypedValue::Text(v) => f.write_str(v),
            TypedValue::Inet(v) => write!(f, "{}", v),
            TypedValue::Uuid(v) => write!(f, "{}", v),
            TypedValue::Timestamp(v) => {
                f.write_str(&v.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            TypedValue::Blob(v) => write!(f, "0x{}", const_hex::encode(v)),
            TypedValue::List(items) => write_items(f, "[", items.iter(), "]"),
            TypedValue::Set(items) => write_items(f, "{", items.iter(), "}"),
            TypedValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_items<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: impl Iterator<Item = &'a TypedValue>,
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str(close)
}

/// One typed column of an output row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedField {
    pub column: String,
    pub value: TypedValue,
}

impl ParsedField {
    pub fn new(column: impl Into<String>, value: TypedValue) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// An output row in column definition order.
pub type Row = Vec<ParsedField>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[test]
    fn test_display_scalars() {
        assert_eq!(TypedValue::Int(-3).to_string(), "-3");
        assert_eq!(TypedValue::Double(OrderedFloat(1.5)).to_string(), "1.5");
        assert_eq!(
            TypedValue::Decimal(BigDecimal::from_str("1.50").unwrap()).to_string(),
            "1.50"
        );
        assert_eq!(
            TypedValue::Timestamp(Utc.with_ymd_and_hms(2014, 2, 1, 12, 0, 0).unwrap())
                .to_string(),
            "2014-02-01T12:00:00.000Z"
        );
        assert_eq!(
            TypedValue::Blob(Bytes::from_static(&[0xca, 0xfe])).to_string(),
            "0xcafe"
        );
    }

    #[test]
    fn test_display_collections() {
        let list = TypedValue::List(vec![TypedValue::Int(1), TypedValue::Int(2)]);
        assert_eq!(list.to_string(), "[1, 2]");

        let map = TypedValue::Map(BTreeMap::from([(
            TypedValue::Int(1),
            TypedValue::Text("a".to_string()),
        )]));
        assert_eq!(map.to_string(), "{1: a}");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(TypedValue::Int(7).as_int(), Some(7));
        assert_eq!(TypedValue::Int(7).as_long(), None);
        assert_eq!(TypedValue::Text("x".into()).as_str(), Some("x"));
        assert!(TypedValue::Set(BTreeSet::new()).is_collection());
        assert!(!TypedValue::Boolean(true).is_collection());
        assert_eq!(TypedValue::Long(1).type_name(), "long");
    }

    #[test]
    fn test_floats_are_ordered_and_deduplicated() {
        let set: BTreeSet<_> = [1.0f32, 1.0, 2.5]
            .into_iter()
            .map(|v| TypedValue::Float(OrderedFloat(v)))
            .collect();
        assert_eq!(set.len(), 2);
    }
}
