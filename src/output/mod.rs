//! Output serialization for parsed rows
//!
//! - NDJSON via [`to_ndjson`]

mod json;

pub use json::to_ndjson;
