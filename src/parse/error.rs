use std::fmt;

use thiserror::Error;

use crate::schema::{ColumnType, FieldDefinition};

/// Why a raw value could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The value does not fit the declared width
    #[error("numeric overflow")]
    NumericOverflow,

    /// The text does not match the grammar of the declared type
    #[error("malformed literal: {0}")]
    MalformedLiteral(String),

    /// Neither the custom pattern nor any fallback date format matched
    #[error("no date format matched")]
    DateParseExhausted,

    /// The event has no attribute for this column
    #[error("missing field")]
    MissingField,

    /// A MAP entry does not contain exactly one key/value separator
    #[error("malformed collection entry")]
    MalformedCollectionToken,
}

/// A field-scoped parse failure.
///
/// For collection columns `column_type` and `raw` describe the offending
/// element or entry rather than the whole field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "column '{}' ({column_type}): {kind} in {raw:?}",
    .column.as_deref().unwrap_or("<unnamed>")
)]
pub struct ParseError {
    pub column: Option<String>,
    pub column_type: ColumnType,
    pub raw: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(column_type: impl Into<ColumnType>, raw: &str, kind: ParseErrorKind) -> Self {
        Self {
            column: None,
            column_type: column_type.into(),
            raw: raw.to_string(),
            kind,
        }
    }

    pub(crate) fn malformed(
        column_type: impl Into<ColumnType>,
        raw: &str,
        reason: impl fmt::Display,
    ) -> Self {
        Self::new(
            column_type,
            raw,
            ParseErrorKind::MalformedLiteral(reason.to_string()),
        )
    }

    pub(crate) fn missing(field: &FieldDefinition) -> Self {
        Self::new(field.column_type().clone(), "", ParseErrorKind::MissingField)
            .in_column(field.column_name())
    }

    /// Attach the column name, keeping one that is already set.
    pub fn in_column(mut self, column: &str) -> Self {
        if self.column.is_none() {
            self.column = Some(column.to_string());
        }
        self
    }
}
