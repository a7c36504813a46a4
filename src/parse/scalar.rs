use std::borrow::Cow;
use std::fmt;
use std::net::IpAddr;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use bytes::Bytes;
use num_bigint::BigInt;
use ordered_float::OrderedFloat;
use uuid::{Uuid, Version};

use super::date::parse_date;
use super::error::{ParseError, ParseErrorKind};
use crate::schema::{DateFormat, ScalarKind};
use crate::value::TypedValue;

/// Coerce a raw string into `kind`.
///
/// Numeric kinds have every whitespace character removed first, so
/// `" 1 2 "` parses as INT `12`. `date_format` only affects TIMESTAMP.
pub fn parse_value(
    raw: &str,
    kind: ScalarKind,
    date_format: Option<&DateFormat>,
) -> Result<TypedValue, ParseError> {
    let text = if kind.is_numeric() {
        strip_whitespace(raw)
    } else {
        Cow::Borrowed(raw)
    };

    match kind {
        ScalarKind::Int => parse_integer(&text, kind, raw).map(TypedValue::Int),
        ScalarKind::Bigint | ScalarKind::Counter => {
            parse_integer(&text, kind, raw).map(TypedValue::Long)
        }
        ScalarKind::Varint => parse_arbitrary(&text, kind, raw).map(TypedValue::Varint),
        ScalarKind::Float => {
            let value: f32 = text
                .parse()
                .map_err(|e| ParseError::malformed(kind, raw, e))?;
            check_finite(value.is_infinite(), &text, kind, raw)?;
            Ok(TypedValue::Float(OrderedFloat(value)))
        }
        ScalarKind::Double => {
            let value: f64 = text
                .parse()
                .map_err(|e| ParseError::malformed(kind, raw, e))?;
            check_finite(value.is_infinite(), &text, kind, raw)?;
            Ok(TypedValue::Double(OrderedFloat(value)))
        }
        ScalarKind::Decimal => parse_arbitrary(&text, kind, raw).map(TypedValue::Decimal),
        ScalarKind::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Ok(TypedValue::Boolean(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(TypedValue::Boolean(false))
            } else {
                Err(ParseError::malformed(kind, raw, "expected 'true' or 'false'"))
            }
        }
        ScalarKind::Text | ScalarKind::Varchar => Ok(TypedValue::Text(raw.to_string())),
        ScalarKind::Ascii => {
            if raw.is_ascii() {
                Ok(TypedValue::Text(raw.to_string()))
            } else {
                Err(ParseError::malformed(kind, raw, "non-ASCII characters"))
            }
        }
        ScalarKind::Inet => IpAddr::from_str(raw)
            .map(TypedValue::Inet)
            .map_err(|e| ParseError::malformed(kind, raw, e)),
        ScalarKind::Uuid => parse_uuid(raw, kind).map(TypedValue::Uuid),
        ScalarKind::Timeuuid => {
            let uuid = parse_uuid(raw, kind)?;
            if uuid.get_version() != Some(Version::Mac) {
                return Err(ParseError::malformed(kind, raw, "not a version 1 UUID"));
            }
            Ok(TypedValue::Uuid(uuid))
        }
        ScalarKind::Timestamp => parse_date(raw, date_format).map(TypedValue::Timestamp),
        ScalarKind::Blob => {
            let hex = raw
                .strip_prefix("0x")
                .or_else(|| raw.strip_prefix("0X"))
                .unwrap_or(raw);
            const_hex::decode(hex)
                .map(|bytes| TypedValue::Blob(Bytes::from(bytes)))
                .map_err(|e| ParseError::malformed(kind, raw, e))
        }
    }
}

/// Remove every whitespace character, interior ones included.
pub(crate) fn strip_whitespace(raw: &str) -> Cow<'_, str> {
    if raw.chars().any(char::is_whitespace) {
        Cow::Owned(raw.chars().filter(|c| !c.is_whitespace()).collect())
    } else {
        Cow::Borrowed(raw)
    }
}

fn parse_integer<T>(digits: &str, kind: ScalarKind, raw: &str) -> Result<T, ParseError>
where
    T: FromStr<Err = ParseIntError>,
{
    digits.parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ParseError::new(kind, raw, ParseErrorKind::NumericOverflow)
        }
        _ => ParseError::malformed(kind, raw, e),
    })
}

/// VARINT and DECIMAL. `num-bigint` and `bigdecimal` skip `_` separators,
/// which no other numeric kind accepts.
fn parse_arbitrary<T>(digits: &str, kind: ScalarKind, raw: &str) -> Result<T, ParseError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if digits.contains('_') {
        return Err(ParseError::malformed(kind, raw, "invalid digit found in string"));
    }
    digits
        .parse::<T>()
        .map_err(|e| ParseError::malformed(kind, raw, e))
}

/// A finite literal that rounds to infinity overflowed the declared width.
fn check_finite(
    is_infinite: bool,
    digits: &str,
    kind: ScalarKind,
    raw: &str,
) -> Result<(), ParseError> {
    if is_infinite && !digits.to_ascii_lowercase().contains("inf") {
        return Err(ParseError::new(kind, raw, ParseErrorKind::NumericOverflow));
    }
    Ok(())
}

fn parse_uuid(raw: &str, kind: ScalarKind) -> Result<Uuid, ParseError> {
    Uuid::parse_str(raw).map_err(|e| ParseError::malformed(kind, raw, e))
}
