//! The 2022-01 bid-package parser's structured output.
//!
//! Everything is a string: flags are "present when non-blank", dates are
//! ISO strings and the operating days are calendar-grid cells. `migrate`
//! turns it into a `TripTemplate`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TemplateError;
use super::types::{DutyPeriodTemplate, FlightTemplate, LayoverTemplate, TripTemplate};
use crate::calendar::OperatingPattern;

/// Base and equipment as printed in the page footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripFooter {
    pub base: String,
    #[serde(default)]
    pub satellite_base: String,
    pub equipment: String,
}

/// Data from outside the trip text, e.g. the bid period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripExternal {
    pub effective_from: String,
    pub effective_to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFlight {
    pub flight_number: String,
    pub departure_station: String,
    pub arrival_station: String,
    pub arrival_time: String,
    #[serde(default)]
    pub eq_code: String,
    #[serde(default)]
    pub deadhead: String,
    #[serde(default)]
    pub deadhead_code: String,
    #[serde(default)]
    pub block: String,
    #[serde(default)]
    pub ground: String,
    #[serde(default)]
    pub synth: String,
    #[serde(default)]
    pub crew_meal: String,
    #[serde(default)]
    pub equipment_change: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDutyPeriod {
    pub report_time: String,
    pub duty: String,
    pub flight_duty: String,
    pub block: String,
    pub synth: String,
    pub flights: Vec<StructuredFlight>,
    #[serde(default)]
    pub layover: Option<LayoverTemplate>,
}

/// One trip as emitted by the 2022-01 parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredTrip {
    pub uuid: String,
    pub number: String,
    pub page_footer: TripFooter,
    #[serde(default)]
    pub positions: Vec<String>,
    #[serde(default)]
    pub operations: Vec<String>,
    #[serde(default)]
    pub qualifications: Vec<String>,
    pub block: String,
    pub synth: String,
    pub external: TripExternal,
    pub calendar: Vec<String>,
    #[serde(default)]
    pub ops_count: String,
    pub dutyperiods: Vec<StructuredDutyPeriod>,
}

fn flag(s: &str) -> bool {
    !s.trim().is_empty()
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, TemplateError> {
    value
        .trim()
        .parse::<NaiveDate>()
        .map_err(|_| TemplateError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

impl From<StructuredFlight> for FlightTemplate {
    fn from(f: StructuredFlight) -> Self {
        Self {
            deadhead: flag(&f.deadhead),
            equipment_change: flag(&f.equipment_change),
            flight_number: f.flight_number,
            departure_station: f.departure_station,
            arrival_station: f.arrival_station,
            arrival_time: f.arrival_time,
            eq_code: f.eq_code,
            deadhead_code: f.deadhead_code,
            block: f.block,
            ground: f.ground,
            synth: f.synth,
            crew_meal: f.crew_meal,
        }
    }
}

impl From<StructuredDutyPeriod> for DutyPeriodTemplate {
    fn from(dp: StructuredDutyPeriod) -> Self {
        Self {
            report_time: dp.report_time,
            duty: dp.duty,
            flight_duty: dp.flight_duty,
            block: dp.block,
            synth: dp.synth,
            flights: dp.flights.into_iter().map(FlightTemplate::from).collect(),
            layover: dp.layover,
        }
    }
}

impl StructuredTrip {
    /// Convert into the current template shape.
    pub fn migrate(self) -> Result<TripTemplate, TemplateError> {
        let effective_from = parse_date("external.effective_from", &self.external.effective_from)?;
        let effective_to = parse_date("external.effective_to", &self.external.effective_to)?;
        let satellite_base =
            Some(self.page_footer.satellite_base.trim().to_string()).filter(|s| !s.is_empty());
        let operating_pattern =
            OperatingPattern::from_calendar_cells(&self.calendar, effective_from)?;

        Ok(TripTemplate {
            uuid: self.uuid,
            number: self.number,
            base: self.page_footer.base,
            satellite_base,
            equipment: self.page_footer.equipment,
            positions: self.positions,
            operations: self.operations,
            qualifications: self.qualifications,
            block: self.block,
            synth: self.synth,
            effective_from,
            effective_to,
            operating_pattern,
            ops_count: self.ops_count.trim().parse().ok(),
            dutyperiods: self
                .dutyperiods
                .into_iter()
                .map(DutyPeriodTemplate::from)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarError;
    use crate::template::VersionedTemplate;

    const LEGACY: &str = r#"{
        "schema": "pbs_2022_01",
        "uuid": "0c9a",
        "number": "2040",
        "page_footer": {"base": "LAX", "satellite_base": " ", "equipment": "737"},
        "positions": ["CA", "FO"],
        "operations": ["DOM"],
        "qualifications": [],
        "block": "5+10",
        "synth": "0+20",
        "external": {"effective_from": "2024-11-01", "effective_to": "2024-11-04"},
        "calendar": ["1", "--", "3", "--"],
        "ops_count": "2",
        "dutyperiods": [{
            "report_time": "0645",
            "duty": "6+00",
            "flight_duty": "5+30",
            "block": "5+10",
            "synth": "0+20",
            "flights": [{
                "flight_number": "1405",
                "departure_station": "LAX",
                "arrival_station": "ORD",
                "arrival_time": "1350",
                "deadhead": "DH",
                "deadhead_code": "AA",
                "block": "",
                "equipment_change": ""
            }],
            "layover": {"city": "ORD", "rest": "14+05", "hotels": [{"name": "Hyatt", "phone": "555"}]}
        }]
    }"#;

    #[test]
    fn migrates_legacy_shape() {
        let template = VersionedTemplate::from_json(LEGACY)
            .unwrap()
            .into_current()
            .unwrap();

        assert_eq!(template.base, "LAX");
        assert_eq!(template.satellite_base, None);
        assert_eq!(template.equipment, "737");
        assert_eq!(template.effective_from, NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());
        assert_eq!(template.effective_to, NaiveDate::from_ymd_opt(2024, 11, 4).unwrap());
        assert_eq!(
            template.operating_pattern,
            OperatingPattern::Dates(vec![
                NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 11, 3).unwrap(),
            ])
        );
        assert_eq!(template.ops_count, Some(2));

        let flight = &template.dutyperiods[0].flights[0];
        assert!(flight.deadhead);
        assert!(!flight.equipment_change);
        assert_eq!(flight.deadhead_code, "AA");

        let layover = template.dutyperiods[0].layover.as_ref().unwrap();
        assert_eq!(layover.hotels[0].name, "Hyatt");
        assert!(layover.hotels[0].transportation.is_empty());
    }

    #[test]
    fn satellite_base_kept_when_present() {
        let json = LEGACY.replace(r#""satellite_base": " ""#, r#""satellite_base": "SNA""#);
        let template = VersionedTemplate::from_json(&json)
            .unwrap()
            .into_current()
            .unwrap();
        assert_eq!(template.satellite_base.as_deref(), Some("SNA"));
    }

    #[test]
    fn bad_dates_rejected() {
        let json = LEGACY.replace("2024-11-04", "11/04/2024");
        let err = VersionedTemplate::from_json(&json)
            .unwrap()
            .into_current()
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::InvalidDate { field: "external.effective_to", .. }
        ));
    }

    #[test]
    fn bad_calendar_cell_rejected() {
        let json = LEGACY.replace(
            r#""calendar": ["1", "--", "3", "--"]"#,
            r#""calendar": ["1", "45"]"#,
        );
        let err = VersionedTemplate::from_json(&json)
            .unwrap()
            .into_current()
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::Calendar(CalendarError::InvalidCalendarCell { .. })
        ));
    }

    #[test]
    fn unparseable_ops_count_is_none() {
        let json = LEGACY.replace(r#""ops_count": "2""#, r#""ops_count": "n/a""#);
        let template = VersionedTemplate::from_json(&json)
            .unwrap()
            .into_current()
            .unwrap();
        assert_eq!(template.ops_count, None);
    }

    #[test]
    fn unknown_schema_rejected() {
        let json = LEGACY.replace("pbs_2022_01", "pbs_1999_12");
        assert!(matches!(
            VersionedTemplate::from_json(&json),
            Err(TemplateError::Json(_))
        ));
    }
}
