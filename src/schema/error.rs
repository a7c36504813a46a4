use thiserror::Error;

/// Structural problems found while building a column definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown column type '{0}'")]
    UnknownType(String),

    #[error("column '{column}': {property} is required for {type_name} columns")]
    MissingProperty {
        column: String,
        property: &'static str,
        type_name: &'static str,
    },

    #[error("column '{column}': {property} is not valid for {type_name} columns")]
    UnexpectedProperty {
        column: String,
        property: &'static str,
        type_name: String,
    },

    #[error("column '{column}': collection elements must be scalar, got {type_name}")]
    NestedCollection { column: String, type_name: String },

    #[error("column '{column}': separators must not be empty")]
    EmptySeparator { column: String },

    #[error("invalid date format '{pattern}': {reason}")]
    InvalidDateFormat { pattern: String, reason: String },

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("column '{column}': timezone requires a dateFormat")]
    TimezoneWithoutDateFormat { column: String },

    #[error("columns '{first}' and '{second}' are both marked as body")]
    MultipleBodyFields { first: String, second: String },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
}
