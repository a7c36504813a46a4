//! Event assembly: one raw event in, one ordered typed row out.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;
use tracing::debug;

use crate::parse::{parse_field, ParseError};
use crate::schema::ColumnDefinition;
use crate::value::{ParsedField, Row};

/// A raw ingestion event: string headers plus an optional body payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Event {
    headers: IndexMap<String, String>,
    body: Bytes,
}

impl Event {
    pub fn new(headers: IndexMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Build an event without a body.
    pub fn from_headers<K, V>(headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            body: Bytes::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Parse one event into a row ordered like `definition`.
///
/// The body column reads the event body; every other column reads the
/// header named after it. The first failing column aborts the event.
pub fn parse_event(event: &Event, definition: &ColumnDefinition) -> Result<Row, ParseError> {
    let row = definition
        .fields()
        .iter()
        .map(|field| -> Result<ParsedField, ParseError> {
            let raw = if field.is_body() {
                event.body_text()
            } else {
                event
                    .header(field.column_name())
                    .map(Cow::Borrowed)
                    .ok_or_else(|| ParseError::missing(field))?
            };
            let value = parse_field(&raw, field)?;
            Ok(ParsedField::new(field.column_name(), value))
        })
        .collect::<Result<Row, _>>();

    if let Err(e) = &row {
        debug!(
            column = e.column.as_deref(),
            kind = %e.kind,
            "rejected event"
        );
    }
    row
}

/// Events that failed to parse in a batch, with their position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RejectedEvents {
    pub errors: Vec<(usize, ParseError)>,
}

impl RejectedEvents {
    pub fn has_rejected(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn count(&self) -> usize {
        self.errors.len()
    }
}

/// Rows for the events that parsed, plus the ones that did not.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParseBatchResult {
    pub rows: Vec<Row>,
    pub rejected: RejectedEvents,
}

/// Parse a batch of events, setting failed events aside instead of stopping.
///
/// Each event is still all-or-nothing; what to do with the rejected ones is
/// up to the caller.
pub fn parse_batch<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    definition: &ColumnDefinition,
) -> ParseBatchResult {
    let mut result = ParseBatchResult::default();
    for (index, event) in events.into_iter().enumerate() {
        match parse_event(event, definition) {
            Ok(row) => result.rows.push(row),
            Err(e) => result.rejected.errors.push((index, e)),
        }
    }
    if result.rejected.has_rejected() {
        debug!(
            parsed = result.rows.len(),
            rejected = result.rejected.count(),
            "parsed event batch"
        );
    }
    result
}

/// A column definition bound for repeated use.
///
/// Cloning is cheap and clones share the definition, so one parser can be
/// handed to any number of worker threads.
#[derive(Clone, Debug)]
pub struct EventParser {
    definition: Arc<ColumnDefinition>,
}

impl EventParser {
    pub fn new(definition: ColumnDefinition) -> Self {
        Self {
            definition: Arc::new(definition),
        }
    }

    /// Load the column definition from its JSON document.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        ColumnDefinition::from_json(json).map(Self::new)
    }

    pub fn definition(&self) -> &ColumnDefinition {
        &self.definition
    }

    pub fn parse(&self, event: &Event) -> Result<Row, ParseError> {
        parse_event(event, &self.definition)
    }

    pub fn parse_batch<'a>(&self, events: impl IntoIterator<Item = &'a Event>) -> ParseBatchResult {
        parse_batch(events, &self.definition)
    }
}

impl From<Arc<ColumnDefinition>> for EventParser {
    fn from(definition: Arc<ColumnDefinition>) -> Self {
        Self { definition }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParseErrorKind;
    use crate::schema::{FieldDefinition, ScalarKind};
    use crate::value::TypedValue;

    fn definition() -> ColumnDefinition {
        ColumnDefinition::new(vec![
            FieldDefinition::new("id", ScalarKind::Int),
            FieldDefinition::list("ports", ScalarKind::Int, ";"),
            FieldDefinition::new("message", ScalarKind::Text).from_body(),
            FieldDefinition::new("ok", ScalarKind::Boolean),
        ])
        .unwrap()
    }

    fn event() -> Event {
        // header order differs from column order on purpose
        Event::from_headers([("ok", "true"), ("ports", "80;443"), ("id", "7")])
            .with_body("hello")
    }

    #[test]
    fn test_parse_event_follows_column_order() {
        let row = parse_event(&event(), &definition()).unwrap();
        let columns: Vec<_> = row.iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, vec!["id", "ports", "message", "ok"]);

        assert_eq!(row[0].value, TypedValue::Int(7));
        assert_eq!(
            row[1].value,
            TypedValue::List(vec![TypedValue::Int(80), TypedValue::Int(443)])
        );
        assert_eq!(row[2].value, TypedValue::Text("hello".to_string()));
        assert_eq!(row[3].value, TypedValue::Boolean(true));
    }

    #[test]
    fn test_missing_header_aborts_event() {
        let event = Event::from_headers([("id", "7"), ("ports", "80")]).with_body("hello");
        let err = parse_event(&event, &definition()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingField);
        assert_eq!(err.column.as_deref(), Some("ok"));
    }

    #[test]
    fn test_first_failing_field_is_reported() {
        let event = Event::from_headers([("id", "x"), ("ports", "a;b"), ("ok", "maybe")]);
        let err = parse_event(&event, &definition()).unwrap_err();
        assert_eq!(err.column.as_deref(), Some("id"));
        assert!(matches!(err.kind, ParseErrorKind::MalformedLiteral(_)));
    }

    #[test]
    fn test_body_field_ignores_headers() {
        let event = Event::from_headers([
            ("id", "7"),
            ("ports", ""),
            ("ok", "false"),
            ("message", "from header"),
        ])
        .with_body("from body");
        let row = parse_event(&event, &definition()).unwrap();
        assert_eq!(row[1].value, TypedValue::List(vec![]));
        assert_eq!(row[2].value, TypedValue::Text("from body".to_string()));
    }

    #[test]
    fn test_missing_body_is_empty_text() {
        let event = Event::from_headers([("id", "7"), ("ports", "1"), ("ok", "true")]);
        let row = parse_event(&event, &definition()).unwrap();
        assert_eq!(row[2].value, TypedValue::Text(String::new()));
    }

    #[test]
    fn test_invalid_utf8_body_is_replaced() {
        let event = Event::from_headers([("id", "7"), ("ports", "1"), ("ok", "true")])
            .with_body(vec![b'h', b'i', 0xff]);
        let row = parse_event(&event, &definition()).unwrap();
        assert_eq!(row[2].value, TypedValue::Text("hi\u{fffd}".to_string()));
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let parser = EventParser::new(definition());
        let event = event();
        assert_eq!(parser.parse(&event).unwrap(), parser.parse(&event).unwrap());
    }

    #[test]
    fn test_parser_is_shared_across_threads() {
        let parser = EventParser::new(definition());
        let expected = parser.parse(&event()).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let parser = parser.clone();
                    scope.spawn(move || parser.parse(&event()).unwrap())
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_parse_batch_sets_failures_aside() {
        let events = vec![
            event(),
            Event::from_headers([("id", "7")]),
            Event::from_headers([("id", "8"), ("ports", "1;2"), ("ok", "false")]),
        ];
        let result = EventParser::new(definition()).parse_batch(&events);

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1][0].value, TypedValue::Int(8));
        assert!(result.rejected.has_rejected());
        assert_eq!(result.rejected.count(), 1);

        let (index, err) = &result.rejected.errors[0];
        assert_eq!(*index, 1);
        assert_eq!(err.kind, ParseErrorKind::MissingField);
        assert_eq!(err.column.as_deref(), Some("ports"));
    }

    #[test]
    fn test_event_accessors() {
        let event = event();
        assert_eq!(event.header("id"), Some("7"));
        assert_eq!(event.header("nope"), None);
        assert_eq!(event.headers().len(), 3);
        assert_eq!(event.body().as_ref(), b"hello");
        assert_eq!(event.body_text(), "hello");
    }
}
