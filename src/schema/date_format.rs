//! Custom timestamp patterns for TIMESTAMP columns.
//!
//! A pattern is either a chrono `strftime` string (anything containing `%`)
//! or a Joda/`SimpleDateFormat` style pattern such as `dd/MM/yyyy HH:mm:ss`,
//! which is translated to `strftime` once when the schema is loaded.

use chrono::format::{Fixed, Item, Numeric, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::SchemaError;

/// A compiled custom date pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    strftime: String,
    has_offset: bool,
    has_date: bool,
    has_time: bool,
    timezone: Tz,
}

impl DateFormat {
    /// Compile a pattern. Values without an explicit offset are read as UTC
    /// unless [`DateFormat::with_timezone`] says otherwise.
    pub fn new(pattern: &str) -> Result<Self, SchemaError> {
        let invalid = |reason: String| SchemaError::InvalidDateFormat {
            pattern: pattern.to_string(),
            reason,
        };

        if pattern.trim().is_empty() {
            return Err(invalid("pattern is empty".to_string()));
        }

        let strftime = if pattern.contains('%') {
            pattern.to_string()
        } else {
            joda_to_strftime(pattern).map_err(invalid)?
        };

        let mut has_offset = strftime.contains("%#z");
        let mut has_date = false;
        let mut has_time = false;
        for item in StrftimeItems::new(&strftime) {
            match item {
                Item::Error => return Err(invalid("unsupported strftime specifier".to_string())),
                Item::Numeric(
                    Numeric::Year
                    | Numeric::YearDiv100
                    | Numeric::YearMod100
                    | Numeric::IsoYear
                    | Numeric::IsoYearDiv100
                    | Numeric::IsoYearMod100
                    | Numeric::Month
                    | Numeric::Day
                    | Numeric::Ordinal,
                    _,
                )
                | Item::Fixed(Fixed::ShortMonthName | Fixed::LongMonthName) => has_date = true,
                Item::Numeric(
                    Numeric::Hour | Numeric::Hour12 | Numeric::Minute | Numeric::Second,
                    _,
                ) => has_time = true,
                Item::Numeric(Numeric::Timestamp, _) => {
                    has_date = true;
                    has_time = true;
                }
                Item::Fixed(Fixed::RFC2822 | Fixed::RFC3339) => {
                    has_date = true;
                    has_time = true;
                    has_offset = true;
                }
                Item::Fixed(
                    Fixed::TimezoneOffset
                    | Fixed::TimezoneOffsetColon
                    | Fixed::TimezoneOffsetDoubleColon
                    | Fixed::TimezoneOffsetTripleColon
                    | Fixed::TimezoneOffsetColonZ
                    | Fixed::TimezoneOffsetZ,
                ) => has_offset = true,
                _ => {}
            }
        }

        if !has_date && !has_time {
            return Err(invalid("pattern has no date or time fields".to_string()));
        }
        if has_offset && !has_date {
            return Err(invalid("offset needs a date in the pattern".to_string()));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            strftime,
            has_offset,
            has_date,
            has_time,
            timezone: Tz::UTC,
        })
    }

    /// Zone used for values whose pattern carries no UTC offset.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// The pattern as written in the schema.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The equivalent chrono `strftime` pattern.
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Parse `raw` strictly against this pattern.
    pub fn parse(&self, raw: &str) -> Option<DateTime<Utc>> {
        if self.has_offset {
            return DateTime::parse_from_str(raw, &self.strftime)
                .ok()
                .map(|dt| dt.with_timezone(&Utc));
        }

        let naive = if !self.has_date {
            // time-only values fall on the epoch date
            let time = NaiveTime::parse_from_str(raw, &self.strftime).ok()?;
            NaiveDate::from_ymd_opt(1970, 1, 1)?.and_time(time)
        } else if self.has_time {
            NaiveDateTime::parse_from_str(raw, &self.strftime).ok()?
        } else {
            NaiveDate::parse_from_str(raw, &self.strftime)
                .ok()?
                .and_hms_opt(0, 0, 0)?
        };

        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Translate a Joda-style pattern into chrono `strftime`.
fn joda_to_strftime(pattern: &str) -> Result<String, String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // '' is an escaped quote, otherwise copy until the closing quote
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            let mut j = i + 1;
            loop {
                match chars.get(j) {
                    None => return Err("unterminated quoted literal".to_string()),
                    Some('\'') if chars.get(j + 1) == Some(&'\'') => {
                        out.push('\'');
                        j += 2;
                    }
                    Some('\'') => break,
                    Some(&literal) => {
                        out.push(literal);
                        j += 1;
                    }
                }
            }
            i = j + 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            out.push(c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&next| next == c).count();
        let directive = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1 | 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', _) => "%d",
            ('D', _) => "%j",
            ('H', _) => "%H",
            ('h', _) => "%I",
            ('m', _) => "%M",
            ('s', _) => "%S",
            ('S', 3) => "%3f",
            ('S', 6) => "%6f",
            ('S', 9) => "%9f",
            ('a', _) => "%p",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            // accepts `Z`, `+0100` and `+01:00`
            ('Z', 1 | 2) => "%#z",
            _ => {
                return Err(format!(
                    "unsupported pattern letter '{}' (repeated {} times)",
                    c, run
                ))
            }
        };
        out.push_str(directive);
        i += run;
    }

    Ok(out)
}
