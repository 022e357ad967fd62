//! The resolved trip tree.
//!
//! A `Trip` owns its duty periods, which own their flights and optional
//! layover, which owns its hotels. Nothing is shared and nothing points
//! back up the tree. Values are built once by the reconstructor; editing
//! means building a new value.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::{AirportCode, Instant};

/// Serialize a `chrono::Duration` as whole seconds.
mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        i64::deserialize(d).map(Duration::seconds)
    }
}

/// An event time seen from three places: UTC, the station, and home base.
///
/// Stores one `Instant` in the station's zone plus the home-base zone, so
/// the three views can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationTime {
    instant: Instant,
    home_base: Tz,
}

impl StationTime {
    /// Build from an instant; its zone is re-pointed at the station.
    pub fn new(instant: Instant, station: &AirportCode, base: &AirportCode) -> Self {
        Self {
            instant: instant.with_tz(station.tz()),
            home_base: base.tz(),
        }
    }

    /// Returns the underlying instant (shown in station time).
    pub fn instant(&self) -> Instant {
        self.instant
    }

    /// Returns the UTC time.
    pub fn utc(&self) -> DateTime<chrono::Utc> {
        self.instant.utc()
    }

    /// Returns the station-local time.
    pub fn local(&self) -> DateTime<Tz> {
        self.instant.localize()
    }

    /// Returns the home-base time.
    pub fn home_base(&self) -> DateTime<Tz> {
        self.instant.localize_in(self.home_base)
    }
}

/// A crew position, e.g. CA or FO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub name: String,
}

/// An area of operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
}

/// Base and equipment in the bidding context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseEquipment {
    pub base: AirportCode,
    pub satellite_base: Option<AirportCode>,
    pub equipment: String,
}

/// A single flight segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub number: String,
    pub eq_code: String,
    pub departure_station: AirportCode,
    pub depart: StationTime,
    pub arrival_station: AirportCode,
    pub arrive: StationTime,
    pub deadhead: bool,
    pub deadhead_code: String,
    pub crew_meal: String,
    pub eq_change: bool,
    /// Arrival minus departure.
    #[serde(with = "duration_secs")]
    pub flight_time: Duration,
    /// Scheduled block time; zero when the record has none.
    #[serde(with = "duration_secs")]
    pub operating_time: Duration,
    #[serde(with = "duration_secs")]
    pub soft_time: Duration,
    /// Time on the ground before the next departure.
    #[serde(with = "duration_secs")]
    pub ground_time: Duration,
}

/// Ground transportation for a hotel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transportation {
    pub name: String,
    pub phone: String,
}

/// A layover hotel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotel {
    pub name: String,
    pub phone: String,
    pub transportation: Vec<Transportation>,
}

/// Rest between two duty periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layover {
    pub station: AirportCode,
    pub start: StationTime,
    pub end: StationTime,
    #[serde(with = "duration_secs")]
    pub rest: Duration,
    pub hotels: Vec<Hotel>,
}

/// A continuous stretch of duty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyPeriod {
    pub start_station: AirportCode,
    pub report: StationTime,
    pub end_station: AirportCode,
    pub release: StationTime,
    pub flights: Vec<Flight>,
    #[serde(with = "duration_secs")]
    pub duty: Duration,
    #[serde(with = "duration_secs")]
    pub flight_duty: Duration,
    #[serde(with = "duration_secs")]
    pub operating_time: Duration,
    /// Sum of the flights' flight times.
    #[serde(with = "duration_secs")]
    pub flight_time: Duration,
    #[serde(with = "duration_secs")]
    pub soft_time: Duration,
    pub layover: Option<Layover>,
}

/// A fully time-resolved trip starting on one date.
///
/// # Invariants
///
/// - `start` is the first duty period's report
/// - `end` is the last duty period's release
/// - `flight_time` is the sum of the duty periods' flight times
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub source: String,
    pub trip_number: String,
    pub base_equipment: BaseEquipment,
    pub positions: Vec<Position>,
    pub operations: Vec<Operation>,
    pub special_qual: bool,
    pub start_station: AirportCode,
    pub start: StationTime,
    pub end_station: AirportCode,
    pub end: StationTime,
    #[serde(with = "duration_secs")]
    pub flight_time: Duration,
    #[serde(with = "duration_secs")]
    pub operating_time: Duration,
    #[serde(with = "duration_secs")]
    pub soft_time: Duration,
    pub dutyperiods: Vec<DutyPeriod>,
}

impl Trip {
    /// Time away from base: trip end minus trip start.
    pub fn tafb(&self) -> Duration {
        self.end.instant().difference(&self.start.instant())
    }

    /// File name other tooling expects for this trip, without extension.
    ///
    /// `{start-local-date}_{base}[_{satellite}]_{equipment}_{trip_number}`
    pub fn default_file_name(&self) -> String {
        let date = self.start.local().date_naive();
        let base = &self.base_equipment;
        match &base.satellite_base {
            Some(satellite) => format!(
                "{}_{}_{}_{}_{}",
                date.format("%Y-%m-%d"),
                base.base.iata(),
                satellite.iata(),
                base.equipment,
                self.trip_number
            ),
            None => format!(
                "{}_{}_{}_{}",
                date.format("%Y-%m-%d"),
                base.base.iata(),
                base.equipment,
                self.trip_number
            ),
        }
    }
}
