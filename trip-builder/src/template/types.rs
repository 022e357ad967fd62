//! Current template shape.
//!
//! Times of day are local wall-clock strings (`HHMM` or `HH:MM`); elapsed
//! times are duration strings (`H+MM`). Nothing here is an absolute
//! instant. Optional elapsed fields may be blank.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::OperatingPattern;

/// Ground transportation listed for a hotel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportationTemplate {
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// A hotel listed for a layover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelTemplate {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub transportation: Vec<TransportationTemplate>,
}

/// Rest following a duty period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoverTemplate {
    /// IATA code of the layover city.
    pub city: String,
    /// Rest duration.
    pub rest: String,
    #[serde(default)]
    pub hotels: Vec<HotelTemplate>,
}

/// One flight as listed in the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightTemplate {
    pub flight_number: String,
    pub departure_station: String,
    pub arrival_station: String,
    /// Arrival time of day, local to the arrival station.
    pub arrival_time: String,
    #[serde(default)]
    pub eq_code: String,
    #[serde(default)]
    pub deadhead: bool,
    #[serde(default)]
    pub deadhead_code: String,
    /// Block time; blank on most deadheads.
    #[serde(default)]
    pub block: String,
    /// Ground time before the next departure; blank on the last leg.
    #[serde(default)]
    pub ground: String,
    #[serde(default)]
    pub synth: String,
    #[serde(default)]
    pub crew_meal: String,
    #[serde(default)]
    pub equipment_change: bool,
}

/// One duty period as listed in the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyPeriodTemplate {
    /// Report time of day. Only the first duty period's value is used to
    /// anchor the trip; later reports follow from the layovers.
    pub report_time: String,
    pub duty: String,
    pub flight_duty: String,
    pub block: String,
    pub synth: String,
    pub flights: Vec<FlightTemplate>,
    #[serde(default)]
    pub layover: Option<LayoverTemplate>,
}

/// A trip pattern valid over an effective-date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripTemplate {
    pub uuid: String,
    pub number: String,
    pub base: String,
    #[serde(default)]
    pub satellite_base: Option<String>,
    pub equipment: String,
    #[serde(default)]
    pub positions: Vec<String>,
    #[serde(default)]
    pub operations: Vec<String>,
    #[serde(default)]
    pub qualifications: Vec<String>,
    pub block: String,
    pub synth: String,
    pub effective_from: NaiveDate,
    pub effective_to: NaiveDate,
    pub operating_pattern: OperatingPattern,
    /// Number of trips the bid package says this pattern produces.
    #[serde(default)]
    pub ops_count: Option<u32>,
    pub dutyperiods: Vec<DutyPeriodTemplate>,
}

impl TripTemplate {
    /// Returns true if the template lists any qualification at all.
    pub fn special_qual(&self) -> bool {
        !self.qualifications.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "uuid": "5f0c",
        "number": "1001",
        "base": "LAX",
        "equipment": "320",
        "block": "1+30",
        "synth": "0+00",
        "effective_from": "2024-11-01",
        "effective_to": "2024-11-03",
        "operating_pattern": {"kind": "daily"},
        "dutyperiods": [{
            "report_time": "0600",
            "duty": "3+00",
            "flight_duty": "2+30",
            "block": "1+30",
            "synth": "0+00",
            "flights": [{
                "flight_number": "100",
                "departure_station": "LAX",
                "arrival_station": "SFO",
                "arrival_time": "0730",
                "block": "1+30"
            }]
        }]
    }"#;

    #[test]
    fn defaults_for_optional_fields() {
        let t: TripTemplate = serde_json::from_str(MINIMAL).unwrap();
        assert_eq!(t.satellite_base, None);
        assert!(t.positions.is_empty());
        assert_eq!(t.ops_count, None);
        assert!(!t.special_qual());

        let flight = &t.dutyperiods[0].flights[0];
        assert!(!flight.deadhead);
        assert_eq!(flight.ground, "");
        assert!(t.dutyperiods[0].layover.is_none());
    }

    #[test]
    fn any_listed_qualification_counts() {
        let mut t: TripTemplate = serde_json::from_str(MINIMAL).unwrap();
        t.qualifications = vec!["ETOPS".into()];
        assert!(t.special_qual());
        t.qualifications = vec!["  ".into()];
        assert!(t.special_qual());
    }
}
