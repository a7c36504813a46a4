use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use super::error::{ParseError, ParseErrorKind};
use super::scalar::parse_value;
use crate::schema::{ColumnType, DateFormat, ListType, MapType};
use crate::value::TypedValue;

/// Split on a literal separator. An empty string has no items.
fn items<'a>(raw: &'a str, separator: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    let raw = (!raw.is_empty()).then_some(raw);
    raw.into_iter().flat_map(move |raw| raw.split(separator))
}

/// Parse a LIST column, keeping item order.
pub fn parse_list(
    raw: &str,
    list: &ListType,
    date_format: Option<&DateFormat>,
) -> Result<Vec<TypedValue>, ParseError> {
    items(raw, &list.separator)
        .map(|item| parse_value(item, list.item, date_format))
        .collect()
}

/// Parse a SET column. Repeated items collapse into one.
pub fn parse_set(
    raw: &str,
    set: &ListType,
    date_format: Option<&DateFormat>,
) -> Result<BTreeSet<TypedValue>, ParseError> {
    items(raw, &set.separator)
        .map(|item| parse_value(item, set.item, date_format))
        .collect()
}

/// Parse a MAP column. Each entry must hold exactly one key/value separator;
/// when a key repeats the last value wins.
pub fn parse_map(
    raw: &str,
    map: &MapType,
    date_format: Option<&DateFormat>,
) -> Result<BTreeMap<TypedValue, TypedValue>, ParseError> {
    let mut entries = BTreeMap::new();

    for entry in items(raw, &map.item_separator) {
        let mut parts = entry.split(map.key_value_separator.as_str());
        let (key, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) => (key, value),
            _ => {
                return Err(ParseError::new(
                    ColumnType::Map(map.clone()),
                    entry,
                    ParseErrorKind::MalformedCollectionToken,
                ))
            }
        };

        let key = parse_value(key, map.key, date_format)?;
        let value = parse_value(value, map.value, date_format)?;
        if entries.insert(key, value).is_some() {
            trace!(entry, "duplicate map key, keeping the last value");
        }
    }

    Ok(entries)
}
