//! Calendar expansion.
//!
//! A trip template is valid over an effective-date range and only starts on
//! some days of it. Expansion turns the range and the operating pattern
//! into the concrete start dates, each of which becomes its own trip.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Error returned by calendar expansion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// The range ends before it starts.
    #[error("invalid date range: {effective_to} is before {effective_from}")]
    InvalidDateRange {
        effective_from: NaiveDate,
        effective_to: NaiveDate,
    },

    /// A weekday mask string is not 7 characters of `0`/`1`.
    #[error("invalid weekday mask {0:?}: expected 7 characters of 0 or 1, Monday first")]
    InvalidWeekdayMask(String),

    /// A calendar cell holds a day number no date near the range has.
    #[error("calendar cell {cell:?} matches no day on or after {after}")]
    InvalidCalendarCell { cell: String, after: NaiveDate },
}

/// How far past the previous cell a day number is looked for.
///
/// Long enough to reach any day of the month, e.g. the 31st from April 1.
const CELL_SEARCH_DAYS: usize = 62;

/// A set of weekdays, Monday in bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WeekdayMask(u8);

impl WeekdayMask {
    /// Every day of the week.
    pub const ALL: WeekdayMask = WeekdayMask(0b0111_1111);

    /// Build a mask from a list of weekdays.
    pub fn from_days(days: &[Weekday]) -> Self {
        Self(
            days.iter()
                .fold(0, |mask, day| mask | 1 << day.num_days_from_monday()),
        )
    }

    /// Parse a 7-character `0`/`1` string, Monday first (e.g. `1111100`).
    ///
    /// ```
    /// use trip_builder::calendar::WeekdayMask;
    /// use chrono::Weekday;
    ///
    /// let weekdays = WeekdayMask::parse("1111100").unwrap();
    /// assert!(weekdays.contains(Weekday::Fri));
    /// assert!(!weekdays.contains(Weekday::Sat));
    /// ```
    pub fn parse(s: &str) -> Result<Self, CalendarError> {
        if s.len() != 7 {
            return Err(CalendarError::InvalidWeekdayMask(s.to_string()));
        }
        s.bytes().enumerate().try_fold(Self(0), |mask, (i, b)| match b {
            b'1' => Ok(Self(mask.0 | 1 << i)),
            b'0' => Ok(mask),
            _ => Err(CalendarError::InvalidWeekdayMask(s.to_string())),
        })
    }

    /// Returns true if the mask includes `day`.
    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }
}

/// Which days of the effective range a trip starts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OperatingPattern {
    /// Every day in the range.
    Daily,
    /// One flag per day, index 0 being `effective_from`.
    ///
    /// Days past the end of the list do not operate; flags past
    /// `effective_to` are ignored.
    Days(Vec<bool>),
    /// Days of the week.
    Weekdays(WeekdayMask),
    /// Explicit dates; anything outside the range is ignored.
    Dates(Vec<NaiveDate>),
}

impl OperatingPattern {
    /// Build a pattern from bid-package calendar cells.
    ///
    /// A cell holding a day number starts a trip; blank and dash-only cells
    /// do not. Each day number is matched to the first date with that day
    /// of the month on or after `effective_from` and after the previous
    /// numbered cell, so padding before the first day does not shift dates.
    ///
    /// ```
    /// use trip_builder::calendar::OperatingPattern;
    /// use chrono::NaiveDate;
    ///
    /// let from = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
    /// let cells: Vec<String> = ["", "30", "--", "2"].iter().map(|s| s.to_string()).collect();
    /// assert_eq!(
    ///     OperatingPattern::from_calendar_cells(&cells, from).unwrap(),
    ///     OperatingPattern::Dates(vec![from, NaiveDate::from_ymd_opt(2024, 12, 2).unwrap()])
    /// );
    /// ```
    pub fn from_calendar_cells(
        cells: &[String],
        effective_from: NaiveDate,
    ) -> Result<Self, CalendarError> {
        let mut next = effective_from;
        let mut dates = Vec::new();
        for cell in cells {
            let text = cell.trim();
            if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            let invalid = || CalendarError::InvalidCalendarCell {
                cell: cell.clone(),
                after: next,
            };
            let day: u32 = text.parse().map_err(|_| invalid())?;
            let date = next
                .iter_days()
                .take(CELL_SEARCH_DAYS)
                .find(|date| date.day() == day)
                .ok_or_else(invalid)?;
            dates.push(date);
            next = date.succ_opt().ok_or_else(invalid)?;
        }
        Ok(OperatingPattern::Dates(dates))
    }
}

/// Expand an effective-date range into the dates a trip starts on.
///
/// The result is ascending and has no duplicates. Every date lies in
/// `[effective_from, effective_to]`.
///
/// # Examples
///
/// ```
/// use trip_builder::calendar::{OperatingPattern, expand_start_dates};
/// use chrono::NaiveDate;
///
/// let from = NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();
/// let to = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap();
///
/// let dates = expand_start_dates(from, to, &OperatingPattern::Daily).unwrap();
/// assert_eq!(dates.len(), 3);
/// assert_eq!(dates[0], from);
/// assert_eq!(dates[2], to);
///
/// assert!(expand_start_dates(to, from, &OperatingPattern::Daily).is_err());
/// ```
pub fn expand_start_dates(
    effective_from: NaiveDate,
    effective_to: NaiveDate,
    pattern: &OperatingPattern,
) -> Result<Vec<NaiveDate>, CalendarError> {
    if effective_to < effective_from {
        return Err(CalendarError::InvalidDateRange {
            effective_from,
            effective_to,
        });
    }

    let in_range = effective_from
        .iter_days()
        .take_while(move |date| *date <= effective_to);

    let dates: Vec<NaiveDate> = match pattern {
        OperatingPattern::Daily => in_range.collect(),
        OperatingPattern::Days(flags) => {
            if flags.len() as i64 > (effective_to - effective_from).num_days() + 1 {
                debug!(
                    flags = flags.len(),
                    %effective_from,
                    %effective_to,
                    "operating pattern is longer than the effective range"
                );
            }
            in_range
                .zip(flags.iter())
                .filter(|(_, operates)| **operates)
                .map(|(date, _)| date)
                .collect()
        }
        OperatingPattern::Weekdays(mask) => {
            in_range.filter(|date| mask.contains(date.weekday())).collect()
        }
        OperatingPattern::Dates(explicit) => {
            let mut dates: Vec<NaiveDate> = explicit
                .iter()
                .copied()
                .filter(|date| (effective_from..=effective_to).contains(date))
                .collect();
            dates.sort_unstable();
            dates.dedup();
            dates
        }
    };

    Ok(dates)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn valid_date()(
            year in 2000i32..2100,
            month in 1u32..=12,
            day in 1u32..=28
        ) -> NaiveDate {
            NaiveDate::from_ymd_opt(year, month, day).unwrap()
        }
    }

    fn any_pattern() -> impl Strategy<Value = OperatingPattern> {
        prop_oneof![
            Just(OperatingPattern::Daily),
            prop::collection::vec(any::<bool>(), 0..60).prop_map(OperatingPattern::Days),
            (0u8..128).prop_map(|bits| OperatingPattern::Weekdays(WeekdayMask(bits))),
            prop::collection::vec(valid_date(), 0..10).prop_map(OperatingPattern::Dates),
        ]
    }

    proptest! {
        /// Output is strictly ascending and inside the range.
        #[test]
        fn ascending_unique_in_range(
            from in valid_date(),
            span in 0i64..60,
            pattern in any_pattern(),
        ) {
            let to = from + chrono::Duration::days(span);
            let dates = expand_start_dates(from, to, &pattern).unwrap();

            for pair in dates.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            for d in &dates {
                prop_assert!(*d >= from && *d <= to);
            }
        }

        /// Daily yields every day of the range.
        #[test]
        fn daily_count(from in valid_date(), span in 0i64..400) {
            let to = from + chrono::Duration::days(span);
            let dates = expand_start_dates(from, to, &OperatingPattern::Daily).unwrap();
            prop_assert_eq!(dates.len() as i64, span + 1);
        }

        /// A reversed range always fails.
        #[test]
        fn reversed_range_fails(from in valid_date(), back in 1i64..400, pattern in any_pattern()) {
            let to = from - chrono::Duration::days(back);
            let is_invalid_range = matches!(
                expand_start_dates(from, to, &pattern),
                Err(CalendarError::InvalidDateRange { .. })
            );
            prop_assert!(is_invalid_range);
        }
    }
}
