//! Typed value parsing: raw strings into [`TypedValue`]s.
//!
//! - [`parse_value`] handles scalar kinds
//! - [`parse_date`] implements the TIMESTAMP fallback chain
//! - [`parse_list`], [`parse_set`] and [`parse_map`] split delimited
//!   collections and parse every element as a scalar
//! - [`parse_field`] dispatches on a column's declared type
//!
//! Everything here is a pure function of its inputs.

mod collection;
mod date;
mod error;
mod scalar;

pub use collection::{parse_list, parse_map, parse_set};
pub use date::parse_date;
pub use error::{ParseError, ParseErrorKind};
pub use scalar::parse_value;

use crate::schema::{ColumnType, FieldDefinition};
use crate::value::TypedValue;

/// Parse the raw text of one column according to its definition.
///
/// Errors are stamped with the column name.
pub fn parse_field(raw: &str, field: &FieldDefinition) -> Result<TypedValue, ParseError> {
    let date_format = field.date_format();

    let parsed = match field.column_type() {
        ColumnType::Scalar(kind) => parse_value(raw, *kind, date_format),
        ColumnType::List(list) => parse_list(raw, list, date_format).map(TypedValue::List),
        ColumnType::Set(set) => parse_set(raw, set, date_format).map(TypedValue::Set),
        ColumnType::Map(map) => parse_map(raw, map, date_format).map(TypedValue::Map),
    };

    parsed.map_err(|e| e.in_column(field.column_name()))
}
