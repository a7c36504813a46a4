//! events2cql - turn raw ingestion events into typed CQL column values
//!
//! A sink receives events as string headers plus a body. A declarative
//! [`ColumnDefinition`] says which CQL type every output column has; this
//! crate coerces the raw strings into [`TypedValue`]s and returns them as an
//! ordered row ready to bind into an insert statement.
//!
//! # Usage
//!
//! ```ignore
//! use events2cql::{Event, EventParser};
//!
//! let parser = EventParser::from_json(&std::fs::read_to_string("definition.json")?)?;
//! let event = Event::from_headers([("id", "7"), ("ports", "80;443")]);
//! for field in parser.parse(&event)? {
//!     println!("{} = {}", field.column, field.value);
//! }
//! ```
//!
//! # Layers
//!
//! - [`schema`]: column definitions and custom date formats
//! - [`parse`]: scalar, date and collection parsing
//! - [`event`]: per-event assembly
//! - [`convert`] / [`output`]: JSON rendering of parsed rows

pub mod convert;
pub mod error;
pub mod event;
pub mod output;
pub mod parse;
pub mod schema;
pub mod value;

pub use convert::{row_to_json, typed_value_to_json, typed_value_to_json_lossy};
pub use error::{Error, Result};
pub use event::{parse_batch, parse_event, Event, EventParser, ParseBatchResult, RejectedEvents};
pub use output::to_ndjson;
pub use parse::{
    parse_date, parse_field, parse_list, parse_map, parse_set, parse_value, ParseError,
    ParseErrorKind,
};
pub use schema::{
    ColumnDefinition, ColumnType, DateFormat, FieldDefinition, ListType, MapType, ScalarKind,
    SchemaError,
};
pub use value::{ParsedField, Row, TypedValue};
