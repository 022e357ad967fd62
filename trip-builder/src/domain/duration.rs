//! Schedule duration and time-of-day parsing.
//!
//! Bid packages write elapsed times as `H+MM` ("1+30" is ninety minutes)
//! and clock times as `HHMM` or `HH:MM`. Parsing sits behind the
//! `DurationParser` trait so the reconstructor never depends on one format.

use chrono::{Duration, NaiveTime};

/// Error returned when a duration string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unparseable duration {text:?}: {reason}")]
pub struct DurationError {
    text: String,
    reason: &'static str,
}

impl DurationError {
    pub fn new(text: &str, reason: &'static str) -> Self {
        Self {
            text: text.to_string(),
            reason,
        }
    }

    /// Returns the text that failed to parse.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Error returned when a time-of-day string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time of day {text:?}: {reason}")]
pub struct TimeOfDayError {
    text: String,
    reason: &'static str,
}

impl TimeOfDayError {
    fn new(text: &str, reason: &'static str) -> Self {
        Self {
            text: text.to_string(),
            reason,
        }
    }
}

/// An elapsed-time field that a record may leave blank.
///
/// Deadhead legs usually carry no block time, and the last leg of a duty
/// period carries no ground time. Those are `NotReported`, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elapsed {
    /// The field held a valid duration.
    Reported(Duration),
    /// The field was blank or unparseable; holds the raw text.
    NotReported(String),
}

impl Elapsed {
    /// Returns the duration, or zero when not reported.
    pub fn or_zero(&self) -> Duration {
        match self {
            Elapsed::Reported(d) => *d,
            Elapsed::NotReported(_) => Duration::zero(),
        }
    }

    /// Returns true if the field held a valid duration.
    pub fn is_reported(&self) -> bool {
        matches!(self, Elapsed::Reported(_))
    }
}

/// Parses textual schedule durations.
///
/// Implementations must be shareable across threads: trips expanded from
/// one template may be reconstructed concurrently.
pub trait DurationParser: Send + Sync {
    /// Parse a duration, failing on malformed input.
    fn parse(&self, text: &str) -> Result<Duration, DurationError>;

    /// Parse a duration that is allowed to be missing.
    fn parse_reported(&self, text: &str) -> Elapsed {
        match self.parse(text) {
            Ok(d) => Elapsed::Reported(d),
            Err(_) => Elapsed::NotReported(text.to_string()),
        }
    }
}

/// Parser for bid-package durations: `H+MM`, also accepting `H:MM`.
///
/// # Examples
///
/// ```
/// use trip_builder::domain::{DurationParser, PbsDurationParser};
/// use chrono::Duration;
///
/// let parser = PbsDurationParser;
/// assert_eq!(parser.parse("1+30").unwrap(), Duration::minutes(90));
/// assert_eq!(parser.parse("26+05").unwrap(), Duration::minutes(26 * 60 + 5));
/// assert!(parser.parse("").is_err());
/// assert!(parser.parse("1+75").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PbsDurationParser;

impl DurationParser for PbsDurationParser {
    fn parse(&self, text: &str) -> Result<Duration, DurationError> {
        let trimmed = text.trim();
        let (hours, minutes) = trimmed
            .split_once(['+', ':'])
            .ok_or_else(|| DurationError::new(text, "expected H+MM"))?;

        if hours.is_empty() || hours.len() > 4 || !hours.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DurationError::new(text, "invalid hour digits"));
        }
        let minutes = parse_two_digits(minutes.as_bytes())
            .ok_or_else(|| DurationError::new(text, "invalid minute digits"))?;
        if minutes > 59 {
            return Err(DurationError::new(text, "minute must be 0-59"));
        }
        let hours: i64 = hours
            .parse()
            .map_err(|_| DurationError::new(text, "invalid hour digits"))?;

        Ok(Duration::hours(hours) + Duration::minutes(minutes as i64))
    }
}

/// Parse a wall-clock time of day written as `HHMM` or `HH:MM`.
///
/// ```
/// use trip_builder::domain::parse_time_of_day;
///
/// assert_eq!(parse_time_of_day("0645").unwrap().to_string(), "06:45:00");
/// assert_eq!(parse_time_of_day("23:10").unwrap().to_string(), "23:10:00");
/// assert!(parse_time_of_day("2400").is_err());
/// ```
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime, TimeOfDayError> {
    let bytes = text.trim().as_bytes();
    let (hour_bytes, minute_bytes) = match bytes.len() {
        4 => (&bytes[0..2], &bytes[2..4]),
        5 if bytes[2] == b':' => (&bytes[0..2], &bytes[3..5]),
        _ => return Err(TimeOfDayError::new(text, "expected HHMM or HH:MM")),
    };

    let hour =
        parse_two_digits(hour_bytes).ok_or_else(|| TimeOfDayError::new(text, "invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeOfDayError::new(text, "hour must be 0-23"));
    }
    let minute = parse_two_digits(minute_bytes)
        .ok_or_else(|| TimeOfDayError::new(text, "invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeOfDayError::new(text, "minute must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeOfDayError::new(text, "invalid time"))
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every well-formed H+MM string parses to hours*60 + minutes.
        #[test]
        fn valid_durations_parse(hours in 0i64..1000, minutes in 0i64..60) {
            let text = format!("{hours}+{minutes:02}");
            prop_assert_eq!(
                PbsDurationParser.parse(&text).unwrap(),
                Duration::minutes(hours * 60 + minutes)
            );
        }

        /// Minutes past 59 are rejected.
        #[test]
        fn minute_overflow_rejected(hours in 0i64..100, minutes in 60u32..100) {
            let text = format!("{hours}+{minutes}");
            prop_assert!(PbsDurationParser.parse(&text).is_err());
        }

        /// Both clock formats agree.
        #[test]
        fn clock_formats_agree(hour in 0u32..24, minute in 0u32..60) {
            let compact = parse_time_of_day(&format!("{hour:02}{minute:02}")).unwrap();
            let colon = parse_time_of_day(&format!("{hour:02}:{minute:02}")).unwrap();
            prop_assert_eq!(compact, colon);
        }
    }
}
