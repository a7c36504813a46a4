//! Column definitions: the declarative schema events are parsed against.
//!
//! A [`ColumnDefinition`] is loaded once, usually from JSON, and then shared
//! read-only by every parse call:
//!
//! ```ignore
//! use events2cql::ColumnDefinition;
//!
//! let definition = ColumnDefinition::from_json(r#"{"fields": [
//!     {"columnName": "id", "type": "UUID"},
//!     {"columnName": "ports", "type": "LIST", "listValueType": "INT", "itemSeparator": ";"}
//! ]}"#)?;
//! ```

mod date_format;
mod error;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::debug;

pub use date_format::DateFormat;
pub use error::SchemaError;

/// CQL scalar types a raw field can be coerced into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Ascii,
    Bigint,
    Blob,
    Boolean,
    Counter,
    Decimal,
    Double,
    Float,
    Inet,
    Int,
    Text,
    Timestamp,
    Timeuuid,
    Uuid,
    Varchar,
    Varint,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Ascii => "ASCII",
            ScalarKind::Bigint => "BIGINT",
            ScalarKind::Blob => "BLOB",
            ScalarKind::Boolean => "BOOLEAN",
            ScalarKind::Counter => "COUNTER",
            ScalarKind::Decimal => "DECIMAL",
            ScalarKind::Double => "DOUBLE",
            ScalarKind::Float => "FLOAT",
            ScalarKind::Inet => "INET",
            ScalarKind::Int => "INT",
            ScalarKind::Text => "TEXT",
            ScalarKind::Timestamp => "TIMESTAMP",
            ScalarKind::Timeuuid => "TIMEUUID",
            ScalarKind::Uuid => "UUID",
            ScalarKind::Varchar => "VARCHAR",
            ScalarKind::Varint => "VARINT",
        }
    }

    /// Numeric kinds have all whitespace stripped before parsing.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarKind::Int
                | ScalarKind::Bigint
                | ScalarKind::Counter
                | ScalarKind::Varint
                | ScalarKind::Float
                | ScalarKind::Double
                | ScalarKind::Decimal
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalarKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_uppercase().as_str() {
            "ASCII" => ScalarKind::Ascii,
            "BIGINT" => ScalarKind::Bigint,
            "BLOB" => ScalarKind::Blob,
            "BOOLEAN" => ScalarKind::Boolean,
            "COUNTER" => ScalarKind::Counter,
            "DECIMAL" => ScalarKind::Decimal,
            "DOUBLE" => ScalarKind::Double,
            "FLOAT" => ScalarKind::Float,
            "INET" => ScalarKind::Inet,
            "INT" => ScalarKind::Int,
            "TEXT" => ScalarKind::Text,
            "TIMESTAMP" => ScalarKind::Timestamp,
            "TIMEUUID" => ScalarKind::Timeuuid,
            "UUID" => ScalarKind::Uuid,
            "VARCHAR" => ScalarKind::Varchar,
            "VARINT" => ScalarKind::Varint,
            _ => return Err(SchemaError::UnknownType(s.to_string())),
        };
        Ok(kind)
    }
}

/// Element layout of a LIST or SET column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListType {
    pub item: ScalarKind,
    pub separator: String,
}

/// Entry layout of a MAP column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapType {
    pub key: ScalarKind,
    pub value: ScalarKind,
    pub item_separator: String,
    pub key_value_separator: String,
}

/// Declared type of a column, including collection layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Scalar(ScalarKind),
    List(ListType),
    Set(ListType),
    Map(MapType),
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Scalar(kind) => write!(f, "{}", kind),
            ColumnType::List(list) => write!(f, "LIST<{}>", list.item),
            ColumnType::Set(set) => write!(f, "SET<{}>", set.item),
            ColumnType::Map(map) => write!(f, "MAP<{}, {}>", map.key, map.value),
        }
    }
}

impl From<ScalarKind> for ColumnType {
    fn from(kind: ScalarKind) -> Self {
        ColumnType::Scalar(kind)
    }
}

/// Description of one output column.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawFieldDefinition")]
pub struct FieldDefinition {
    column_name: String,
    column_type: ColumnType,
    is_body: bool,
    date_format: Option<DateFormat>,
}

impl FieldDefinition {
    pub fn new(column_name: impl Into<String>, column_type: impl Into<ColumnType>) -> Self {
        Self {
            column_name: column_name.into(),
            column_type: column_type.into(),
            is_body: false,
            date_format: None,
        }
    }

    pub fn list(column_name: impl Into<String>, item: ScalarKind, separator: &str) -> Self {
        Self::new(
            column_name,
            ColumnType::List(ListType {
                item,
                separator: separator.to_string(),
            }),
        )
    }

    pub fn set(column_name: impl Into<String>, item: ScalarKind, separator: &str) -> Self {
        Self::new(
            column_name,
            ColumnType::Set(ListType {
                item,
                separator: separator.to_string(),
            }),
        )
    }

    pub fn map(
        column_name: impl Into<String>,
        key: ScalarKind,
        value: ScalarKind,
        item_separator: &str,
        key_value_separator: &str,
    ) -> Self {
        Self::new(
            column_name,
            ColumnType::Map(MapType {
                key,
                value,
                item_separator: item_separator.to_string(),
                key_value_separator: key_value_separator.to_string(),
            }),
        )
    }

    /// Take this column's value from the event body instead of a header.
    pub fn from_body(mut self) -> Self {
        self.is_body = true;
        self
    }

    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = Some(date_format);
        self
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    pub fn is_body(&self) -> bool {
        self.is_body
    }

    pub fn date_format(&self) -> Option<&DateFormat> {
        self.date_format.as_ref()
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let empty_separator = match &self.column_type {
            ColumnType::Scalar(_) => false,
            ColumnType::List(list) | ColumnType::Set(list) => list.separator.is_empty(),
            ColumnType::Map(map) => {
                map.item_separator.is_empty() || map.key_value_separator.is_empty()
            }
        };
        if empty_separator {
            return Err(SchemaError::EmptySeparator {
                column: self.column_name.clone(),
            });
        }
        Ok(())
    }
}

/// Ordered list of output columns. Field order is column order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawColumnDefinition")]
pub struct ColumnDefinition {
    fields: Vec<FieldDefinition>,
}

impl ColumnDefinition {
    /// Build a definition, checking separators, column name uniqueness and
    /// that at most one field reads the event body.
    pub fn new(fields: Vec<FieldDefinition>) -> Result<Self, SchemaError> {
        check_fields(&fields)?;
        Ok(Self { fields })
    }

    /// Load a definition from its JSON document.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Self::from_slice(json.as_bytes())
    }

    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        let definition: Self = serde_json::from_slice(bytes)?;
        debug!(
            columns = definition.len(),
            body = definition.body_field().map(FieldDefinition::column_name),
            "loaded column definition"
        );
        Ok(definition)
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, column_name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.column_name == column_name)
    }

    pub fn body_field(&self) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.is_body)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldDefinition::column_name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<RawColumnDefinition> for ColumnDefinition {
    type Error = SchemaError;

    fn try_from(raw: RawColumnDefinition) -> Result<Self, Self::Error> {
        ColumnDefinition::new(raw.fields)
    }
}

#[derive(Deserialize)]
struct RawColumnDefinition {
    fields: Vec<FieldDefinition>,
}

/// Field entry as written in the schema document.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldDefinition {
    column_name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    is_body: bool,
    item_separator: Option<String>,
    list_value_type: Option<String>,
    map_key_type: Option<String>,
    map_value_type: Option<String>,
    map_value_separator: Option<String>,
    date_format: Option<String>,
    timezone: Option<String>,
}

impl RawFieldDefinition {
    fn required(
        &self,
        property: &'static str,
        value: &Option<String>,
        type_name: &'static str,
    ) -> Result<String, SchemaError> {
        value.clone().ok_or_else(|| SchemaError::MissingProperty {
            column: self.column_name.clone(),
            property,
            type_name,
        })
    }

    fn element(
        &self,
        property: &'static str,
        value: &Option<String>,
        type_name: &'static str,
    ) -> Result<ScalarKind, SchemaError> {
        let name = self.required(property, value, type_name)?;
        if is_collection_name(&name) {
            return Err(SchemaError::NestedCollection {
                column: self.column_name.clone(),
                type_name: name,
            });
        }
        name.parse()
    }

    fn reject(&self, properties: &[(&'static str, bool)]) -> Result<(), SchemaError> {
        match properties.iter().find(|(_, present)| *present) {
            Some((property, _)) => Err(SchemaError::UnexpectedProperty {
                column: self.column_name.clone(),
                property: *property,
                type_name: self.type_name.to_ascii_uppercase(),
            }),
            None => Ok(()),
        }
    }

    fn column_type(&self) -> Result<ColumnType, SchemaError> {
        let item_separator = ("itemSeparator", self.item_separator.is_some());
        let list_value_type = ("listValueType", self.list_value_type.is_some());
        let map_key_type = ("mapKeyType", self.map_key_type.is_some());
        let map_value_type = ("mapValueType", self.map_value_type.is_some());
        let map_value_separator = ("mapValueSeparator", self.map_value_separator.is_some());

        match self.type_name.trim().to_ascii_uppercase().as_str() {
            name @ ("LIST" | "SET") => {
                self.reject(&[map_key_type, map_value_type, map_value_separator])?;
                let type_name = if name == "LIST" { "LIST" } else { "SET" };
                let list = ListType {
                    item: self.element("listValueType", &self.list_value_type, type_name)?,
                    separator: self.required("itemSeparator", &self.item_separator, type_name)?,
                };
                Ok(if name == "LIST" {
                    ColumnType::List(list)
                } else {
                    ColumnType::Set(list)
                })
            }
            "MAP" => {
                self.reject(&[list_value_type])?;
                Ok(ColumnType::Map(MapType {
                    key: self.element("mapKeyType", &self.map_key_type, "MAP")?,
                    value: self.element("mapValueType", &self.map_value_type, "MAP")?,
                    item_separator: self.required("itemSeparator", &self.item_separator, "MAP")?,
                    key_value_separator: self.required(
                        "mapValueSeparator",
                        &self.map_value_separator,
                        "MAP",
                    )?,
                }))
            }
            _ => {
                let kind: ScalarKind = self.type_name.parse()?;
                self.reject(&[
                    item_separator,
                    list_value_type,
                    map_key_type,
                    map_value_type,
                    map_value_separator,
                ])?;
                Ok(ColumnType::Scalar(kind))
            }
        }
    }
}

impl TryFrom<RawFieldDefinition> for FieldDefinition {
    type Error = SchemaError;

    fn try_from(raw: RawFieldDefinition) -> Result<Self, Self::Error> {
        let column_type = raw.column_type()?;

        let date_format = match (&raw.date_format, &raw.timezone) {
            (Some(pattern), timezone) if !pattern.is_empty() => {
                let format = DateFormat::new(pattern)?;
                match timezone {
                    Some(name) => {
                        let tz: Tz = name
                            .parse()
                            .map_err(|_| SchemaError::UnknownTimezone(name.clone()))?;
                        Some(format.with_timezone(tz))
                    }
                    None => Some(format),
                }
            }
            (_, Some(_)) => {
                return Err(SchemaError::TimezoneWithoutDateFormat {
                    column: raw.column_name,
                })
            }
            _ => None,
        };

        let field = FieldDefinition {
            column_name: raw.column_name,
            column_type,
            is_body: raw.is_body,
            date_format,
        };
        field.validate()?;
        Ok(field)
    }
}

fn check_fields(fields: &[FieldDefinition]) -> Result<(), SchemaError> {
    let mut names = HashSet::with_capacity(fields.len());
    let mut body: Option<&str> = None;

    for field in fields {
        field.validate()?;
        if !names.insert(field.column_name()) {
            return Err(SchemaError::DuplicateColumn(field.column_name.clone()));
        }
        if field.is_body() {
            if let Some(first) = body {
                return Err(SchemaError::MultipleBodyFields {
                    first: first.to_string(),
                    second: field.column_name.clone(),
                });
            }
            body = Some(field.column_name());
        }
    }

    Ok(())
}

fn is_collection_name(name: &str) -> bool {
    matches!(
        name.trim().to_ascii_uppercase().as_str(),
        "LIST" | "SET" | "MAP"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITION: &str = r#"{
        "fields": [
            {"columnName": "id", "type": "uuid"},
            {"columnName": "ports", "type": "LIST", "listValueType": "INT", "itemSeparator": ";"},
            {"columnName": "hosts", "type": "MAP", "mapKeyType": "INT", "mapValueType": "INET",
             "itemSeparator": ";", "mapValueSeparator": ":"},
            {"columnName": "tags", "type": "SET", "listValueType": "TEXT", "itemSeparator": ","},
            {"columnName": "seen", "type": "TIMESTAMP", "dateFormat": "dd/MM/yyyy HH:mm:ss",
             "timezone": "Europe/Madrid"},
            {"columnName": "payload", "type": "TEXT", "isBody": true}
        ]
    }"#;

    fn load_message(json: &str) -> String {
        ColumnDefinition::from_json(json).unwrap_err().to_string()
    }

    #[test]
    fn test_load_definition_preserves_order() {
        let definition = ColumnDefinition::from_json(DEFINITION).unwrap();
        let names: Vec<_> = definition.column_names().collect();
        assert_eq!(names, vec!["id", "ports", "hosts", "tags", "seen", "payload"]);
        assert_eq!(definition.len(), 6);
        assert!(!definition.is_empty());
    }

    #[test]
    fn test_load_collection_layouts() {
        let definition = ColumnDefinition::from_json(DEFINITION).unwrap();

        assert_eq!(
            definition.fields()[1].column_type(),
            &ColumnType::List(ListType {
                item: ScalarKind::Int,
                separator: ";".to_string(),
            })
        );
        assert_eq!(
            definition.field("hosts").unwrap().column_type(),
            &ColumnType::Map(MapType {
                key: ScalarKind::Int,
                value: ScalarKind::Inet,
                item_separator: ";".to_string(),
                key_value_separator: ":".to_string(),
            })
        );
        assert_eq!(
            definition.field("tags").unwrap().column_type().to_string(),
            "SET<TEXT>"
        );
    }

    #[test]
    fn test_load_body_and_date_format() {
        let definition = ColumnDefinition::from_json(DEFINITION).unwrap();
        assert_eq!(definition.body_field().unwrap().column_name(), "payload");

        let seen = definition.field("seen").unwrap();
        let format = seen.date_format().unwrap();
        assert_eq!(format.strftime(), "%d/%m/%Y %H:%M:%S");
        assert_eq!(format.timezone(), chrono_tz::Europe::Madrid);
        assert!(!seen.is_body());
    }

    #[test]
    fn test_type_names_are_case_insensitive() {
        assert_eq!("int".parse::<ScalarKind>().unwrap(), ScalarKind::Int);
        assert_eq!("Timestamp".parse::<ScalarKind>().unwrap(), ScalarKind::Timestamp);
        assert!(matches!(
            "STRING".parse::<ScalarKind>(),
            Err(SchemaError::UnknownType(_))
        ));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let message = load_message(r#"{"fields": [{"columnName": "a", "type": "TUPLE"}]}"#);
        assert!(message.contains("unknown column type 'TUPLE'"), "{}", message);
    }

    #[test]
    fn test_collection_requires_layout() {
        let message = load_message(
            r#"{"fields": [{"columnName": "a", "type": "LIST", "listValueType": "INT"}]}"#,
        );
        assert!(message.contains("itemSeparator is required"), "{}", message);

        let message = load_message(
            r#"{"fields": [{"columnName": "m", "type": "MAP", "mapKeyType": "INT",
                "mapValueType": "TEXT", "itemSeparator": ";"}]}"#,
        );
        assert!(message.contains("mapValueSeparator is required"), "{}", message);
    }

    #[test]
    fn test_scalar_rejects_collection_properties() {
        let message = load_message(
            r#"{"fields": [{"columnName": "a", "type": "INT", "itemSeparator": ";"}]}"#,
        );
        assert!(message.contains("itemSeparator is not valid"), "{}", message);
    }

    #[test]
    fn test_nested_collections_are_rejected() {
        let message = load_message(
            r#"{"fields": [{"columnName": "a", "type": "LIST", "listValueType": "SET",
                "itemSeparator": ";"}]}"#,
        );
        assert!(message.contains("must be scalar"), "{}", message);
    }

    #[test]
    fn test_timezone_requires_date_format() {
        let message = load_message(
            r#"{"fields": [{"columnName": "t", "type": "TIMESTAMP", "timezone": "UTC"}]}"#,
        );
        assert!(message.contains("timezone requires a dateFormat"), "{}", message);

        let message = load_message(
            r#"{"fields": [{"columnName": "t", "type": "TIMESTAMP",
                "dateFormat": "yyyy", "timezone": "Mars/Olympus"}]}"#,
        );
        assert!(message.contains("unknown timezone"), "{}", message);
    }

    #[test]
    fn test_new_rejects_two_body_fields() {
        let err = ColumnDefinition::new(vec![
            FieldDefinition::new("a", ScalarKind::Text).from_body(),
            FieldDefinition::new("b", ScalarKind::Text).from_body(),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MultipleBodyFields {
                first: "a".to_string(),
                second: "b".to_string(),
            }
        );
    }

    #[test]
    fn test_new_rejects_duplicates_and_empty_separators() {
        let err = ColumnDefinition::new(vec![
            FieldDefinition::new("a", ScalarKind::Int),
            FieldDefinition::new("a", ScalarKind::Text),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn("a".to_string()));

        let err = ColumnDefinition::new(vec![FieldDefinition::list("l", ScalarKind::Int, "")])
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::EmptySeparator {
                column: "l".to_string()
            }
        );
    }

    #[test]
    fn test_schema_errors_surface_through_json() {
        // serde wraps try_from failures into its own error type
        assert!(matches!(
            ColumnDefinition::from_json(r#"{"fields": [{"columnName": "a", "type": "?"}]}"#),
            Err(crate::Error::Json(_))
        ));
    }
}
