//! Error types for events2cql

use crate::parse::ParseError;
use crate::schema::SchemaError;
use thiserror::Error;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a schema or turning events into rows
#[derive(Debug, Error)]
pub enum Error {
    /// A raw field could not be coerced into its declared type
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The column definition is structurally invalid
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
