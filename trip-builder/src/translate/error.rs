//! Translation errors and diagnostics.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::airports::AirportError;
use crate::calendar::CalendarError;
use crate::domain::{DurationError, Instant, TimeOfDayError};

/// Where in a template a problem was found.
///
/// Indices are zero-based positions in the template's lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordLocation {
    pub duty_period: Option<usize>,
    pub flight: Option<usize>,
}

impl RecordLocation {
    /// The trip as a whole.
    pub fn trip() -> Self {
        Self::default()
    }

    pub fn duty_period(duty_period: usize) -> Self {
        Self {
            duty_period: Some(duty_period),
            flight: None,
        }
    }

    pub fn flight(duty_period: usize, flight: usize) -> Self {
        Self {
            duty_period: Some(duty_period),
            flight: Some(flight),
        }
    }
}

impl fmt::Display for RecordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.duty_period, self.flight) {
            (None, _) => write!(f, "trip"),
            (Some(dp), None) => write!(f, "dutyperiods[{}]", dp),
            (Some(dp), Some(flight)) => write!(f, "dutyperiods[{}].flights[{}]", dp, flight),
        }
    }
}

/// The kind of failure that stopped a reconstruction.
#[derive(Debug, thiserror::Error)]
pub enum TranslateErrorKind {
    /// A station code is not in the airport database
    #[error("{role} airport: {source}")]
    UnknownAirport {
        role: &'static str,
        source: AirportError,
    },

    /// A required duration field could not be parsed
    #[error("{field}: {source}")]
    UnparseableDuration {
        field: &'static str,
        source: DurationError,
    },

    /// The first report time is not a time of day
    #[error("report time: {0}")]
    InvalidReportTime(TimeOfDayError),

    /// A local date-time does not exist in its zone
    #[error("{local} does not exist in {zone}")]
    UnresolvableLocalTime {
        local: NaiveDateTime,
        zone: &'static str,
    },

    /// A duty period without a layover is followed by another
    #[error("no layover before the next duty period")]
    MissingLayover,

    /// The flights end after the duty period's release
    #[error("last arrival {last_arrival} is after release {release}")]
    FlightsExceedDuty {
        last_arrival: Instant,
        release: Instant,
    },

    /// The template has no duty periods
    #[error("trip has no duty periods")]
    EmptyTrip,

    /// A duty period has no flights
    #[error("duty period has no flights")]
    EmptyDutyPeriod,

    /// Instant arithmetic left the representable range
    #[error("time arithmetic overflow")]
    Overflow,

    /// The template's effective range is reversed
    #[error(transparent)]
    InvalidDateRange(#[from] CalendarError),
}

/// A failed reconstruction, with enough context to find the bad record.
#[derive(Debug, thiserror::Error)]
#[error("trip {trip_id}{}, {location}: {kind}", on_date(.start_date))]
pub struct TranslateError {
    /// Template uuid.
    pub trip_id: String,
    /// Start date being reconstructed; `None` for template-wide failures.
    pub start_date: Option<NaiveDate>,
    pub location: RecordLocation,
    #[source]
    pub kind: TranslateErrorKind,
}

fn on_date(date: &Option<NaiveDate>) -> String {
    date.map(|d| format!(" on {}", d)).unwrap_or_default()
}

/// A recoverable oddity noticed while reconstructing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Block time missing or unparseable; zero used.
    BlockNotReported { raw: String },
    /// Ground time missing or unparseable; zero used.
    GroundNotReported { raw: String },
    /// Arrival time of day unusable; arrival is departure plus block.
    ArrivalFromBlock { raw: String, reason: String },
    /// A reported block total differs from the sum of the flights.
    TotalMismatch { reported: Duration, summed: Duration },
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockNotReported { raw } => write!(f, "block {:?} not reported, using zero", raw),
            Self::GroundNotReported { raw } => {
                write!(f, "ground {:?} not reported, using zero", raw)
            }
            Self::ArrivalFromBlock { raw, reason } => {
                write!(f, "arrival time {:?} unusable ({}), using block time", raw, reason)
            }
            Self::TotalMismatch { reported, summed } => write!(
                f,
                "block total {}m differs from flight sum {}m",
                reported.num_minutes(),
                summed.num_minutes()
            ),
        }
    }
}

/// A recoverable oddity and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: RecordLocation,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.kind)
    }
}
