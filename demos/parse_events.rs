//! Example: Parse NDJSON events against a column definition
//!
//! Each input line is `{"headers": {...}, "body": "..."}`. Parsed rows are
//! written to stdout as NDJSON, rejected events are logged.
//!
//! Run with: cargo run --example parse_events -- testdata/definition.json events.ndjson

use std::fs;

use events2cql::{to_ndjson, Event, EventParser};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    headers: IndexMap<String, String>,
    #[serde(default)]
    body: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let (Some(definition_path), Some(events_path)) = (args.next(), args.next()) else {
        return Err("usage: parse_events <definition.json> <events.ndjson>".into());
    };

    let parser = EventParser::from_json(&fs::read_to_string(&definition_path)?)?;
    info!(
        columns = parser.definition().len(),
        definition = %definition_path,
        "loaded column definition"
    );

    let input = fs::read_to_string(&events_path)?;
    let events = input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| -> Result<Event, serde_json::Error> {
            let raw: RawEvent = serde_json::from_str(line)?;
            Ok(Event::new(raw.headers, raw.body))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let result = parser.parse_batch(&events);
    for (index, err) in &result.rejected.errors {
        warn!(line = index + 1, error = %err, "rejected event");
    }

    print!("{}", String::from_utf8(to_ndjson(&result.rows)?)?);
    info!(
        parsed = result.rows.len(),
        rejected = result.rejected.count(),
        "done"
    );
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
