//! Turning local wall-clock times into instants.
//!
//! Bid packages print times of day local to a station. Around a DST change
//! such a time can occur twice or not at all, so every conversion here says
//! which instant it picked.

use chrono::{Days, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::domain::{Instant, parse_time_of_day};

/// Resolve a local date and time in `zone`.
///
/// An ambiguous time (fall back) resolves to the earlier instant. A time in
/// a gap (spring forward) does not exist and yields `None`.
pub(crate) fn resolve_local(date: NaiveDate, time: NaiveTime, zone: Tz) -> Option<Instant> {
    match zone.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Some(Instant::from_utc(dt.with_timezone(&Utc), zone)),
        LocalResult::Ambiguous(earliest, _) => {
            Some(Instant::from_utc(earliest.with_timezone(&Utc), zone))
        }
        LocalResult::None => None,
    }
}

/// Why an arrival fell back to departure plus block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ArrivalFallback {
    /// The arrival time of day did not parse.
    Unparseable(String),
    /// The arrival wall-clock time does not exist on the day it falls on.
    InGap(NaiveDateTime),
}

impl std::fmt::Display for ArrivalFallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unparseable(reason) => write!(f, "{}", reason),
            Self::InGap(local) => write!(f, "{} falls in a DST gap", local),
        }
    }
}

/// Result of the arrival rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Arrival {
    pub instant: Instant,
    pub fallback: Option<ArrivalFallback>,
}

/// Find the arrival instant for a flight.
///
/// Takes the earliest instant not before `departure` whose wall-clock time
/// in `zone` equals `arrival_time`, looking at most one calendar day ahead.
/// If `arrival_time` is unusable the arrival is `departure + block`.
///
/// Returns `None` only on arithmetic overflow.
pub(crate) fn resolve_arrival(
    departure: Instant,
    zone: Tz,
    arrival_time: &str,
    block: Duration,
) -> Option<Arrival> {
    let fallback = |reason: ArrivalFallback| {
        departure.checked_add(block).map(|instant| Arrival {
            instant: instant.with_tz(zone),
            fallback: Some(reason),
        })
    };

    let time = match parse_time_of_day(arrival_time) {
        Ok(time) => time,
        Err(e) => return fallback(ArrivalFallback::Unparseable(e.to_string())),
    };

    let departure_local = departure.localize_in(zone).naive_local();
    for days in 0..=1 {
        let date = departure_local.date().checked_add_days(Days::new(days))?;
        let candidate = date.and_time(time);
        let resolved = match zone.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => [Some(dt), None],
            LocalResult::Ambiguous(earlier, later) => [Some(earlier), Some(later)],
            LocalResult::None if candidate >= departure_local => {
                return fallback(ArrivalFallback::InGap(candidate));
            }
            LocalResult::None => continue,
        };

        let found = resolved
            .into_iter()
            .flatten()
            .map(|dt| dt.with_timezone(&Utc))
            .find(|utc| *utc >= departure.utc());
        if let Some(utc) = found {
            return Some(Arrival {
                instant: Instant::from_utc(utc, zone),
                fallback: None,
            });
        }
    }

    // Only reachable if a zone shifts by more than a day.
    fallback(ArrivalFallback::Unparseable(format!(
        "no {} on or after departure",
        time
    )))
}
