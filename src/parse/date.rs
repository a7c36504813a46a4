use std::borrow::Cow;

use chrono::{DateTime, Utc};

use super::error::{ParseError, ParseErrorKind};
use crate::schema::{DateFormat, ScalarKind};

/// ISO-8601 date-time with fractional seconds, then without. `Z` is
/// rewritten to `+00:00` before matching.
const ISO_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%:z"];

/// Parse a TIMESTAMP value.
///
/// With a custom format only that format is tried. Otherwise the ISO-8601
/// variants are tried in order, then the raw text as epoch milliseconds.
pub fn parse_date(raw: &str, date_format: Option<&DateFormat>) -> Result<DateTime<Utc>, ParseError> {
    let exhausted =
        || ParseError::new(ScalarKind::Timestamp, raw, ParseErrorKind::DateParseExhausted);

    if let Some(format) = date_format {
        return format.parse(raw).ok_or_else(exhausted);
    }

    parse_iso(raw)
        .or_else(|| parse_epoch_millis(raw))
        .ok_or_else(exhausted)
}

fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(head) => Cow::Owned(format!("{}+00:00", head)),
        None => Cow::Borrowed(raw),
    };

    ISO_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&normalized, format).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_epoch_millis(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}
