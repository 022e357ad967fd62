//! Single-pass trip reconstruction.
//!
//! A template only knows times of day and elapsed durations. Given a start
//! date, the first report is anchored in the base's zone and everything
//! else follows by walking forward: each flight departs at the cursor, the
//! cursor moves past its arrival and ground time, each duty period is
//! released `duty` after its report, and each layover ends `rest` after
//! the release, which is the next report.

use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::airports::AirportLookup;
use crate::calendar::expand_start_dates;
use crate::domain::{
    AirportCode, BaseEquipment, DurationParser, DutyPeriod, Elapsed, Flight, Hotel, Instant,
    Layover, Operation, Position, StationTime, Transportation, Trip, parse_time_of_day,
};
use crate::template::{
    DutyPeriodTemplate, FlightTemplate, HotelTemplate, LayoverTemplate, TripTemplate,
};

use super::arrival::{resolve_arrival, resolve_local};
use super::config::{MissingLayoverPolicy, ReconstructConfig};
use super::error::{
    Diagnostic, DiagnosticKind, RecordLocation, TranslateError, TranslateErrorKind,
};

/// A reconstructed trip and the recoverable problems met on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    pub trip: Trip,
    pub diagnostics: Vec<Diagnostic>,
}

/// Every trip expanded from one template.
#[derive(Debug)]
pub struct Translation {
    /// Successful reconstructions, in start-date order.
    pub trips: Vec<Reconstruction>,
    /// Start dates that could not be reconstructed.
    pub failures: Vec<TranslateError>,
}

/// Per-reconstruction state: error context and collected diagnostics.
struct Pass<'t> {
    template: &'t TripTemplate,
    start_date: NaiveDate,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Pass<'t> {
    fn new(template: &'t TripTemplate, start_date: NaiveDate) -> Self {
        Self {
            template,
            start_date,
            diagnostics: Vec::new(),
        }
    }

    fn error(&self, location: RecordLocation, kind: TranslateErrorKind) -> TranslateError {
        TranslateError {
            trip_id: self.template.uuid.clone(),
            start_date: Some(self.start_date),
            location,
            kind,
        }
    }

    fn note(&mut self, location: RecordLocation, kind: DiagnosticKind) {
        warn!(
            trip = %self.template.uuid,
            start_date = %self.start_date,
            %location,
            "{}",
            kind
        );
        self.diagnostics.push(Diagnostic { location, kind });
    }
}

/// Builds time-resolved trips from templates.
///
/// Borrows the airport lookup and duration parser; both are read-only, so
/// one reconstructor can be shared by any number of threads.
///
/// # Examples
///
/// ```
/// use trip_builder::airports::{AirportDatabase, AirportRecord};
/// use trip_builder::domain::PbsDurationParser;
/// use trip_builder::template::TripTemplate;
/// use trip_builder::translate::{ReconstructConfig, Reconstructor};
/// use chrono::{Duration, NaiveDate};
///
/// let airports = AirportDatabase::from_records(vec![
///     AirportRecord { iata: "LAX".into(), icao: "KLAX".into(), tz: "America/Los_Angeles".into(), name: None },
///     AirportRecord { iata: "SFO".into(), icao: "KSFO".into(), tz: "America/Los_Angeles".into(), name: None },
/// ]);
/// let template: TripTemplate = serde_json::from_str(r#"{
///     "uuid": "t1", "number": "1001", "base": "LAX", "equipment": "320",
///     "block": "1+30", "synth": "0+00",
///     "effective_from": "2024-11-01", "effective_to": "2024-11-01",
///     "operating_pattern": {"kind": "daily"},
///     "dutyperiods": [{
///         "report_time": "0600", "duty": "3+00", "flight_duty": "2+30",
///         "block": "1+30", "synth": "0+00",
///         "flights": [{"flight_number": "100", "departure_station": "LAX",
///                      "arrival_station": "SFO", "arrival_time": "0730", "block": "1+30"}]
///     }]
/// }"#).unwrap();
///
/// let reconstructor = Reconstructor::new(&airports, &PbsDurationParser, ReconstructConfig::default());
/// let built = reconstructor
///     .reconstruct(&template, NaiveDate::from_ymd_opt(2024, 11, 1).unwrap())
///     .unwrap();
///
/// assert_eq!(built.trip.start.local().to_rfc3339(), "2024-11-01T06:00:00-07:00");
/// assert_eq!(built.trip.flight_time, Duration::minutes(90));
/// assert_eq!(built.trip.tafb(), Duration::hours(3));
/// ```
pub struct Reconstructor<'a, L: ?Sized, P: ?Sized> {
    airports: &'a L,
    durations: &'a P,
    config: ReconstructConfig,
}

impl<'a, L, P> Reconstructor<'a, L, P>
where
    L: AirportLookup + ?Sized,
    P: DurationParser + ?Sized,
{
    pub fn new(airports: &'a L, durations: &'a P, config: ReconstructConfig) -> Self {
        Self {
            airports,
            durations,
            config,
        }
    }

    /// Reconstruct every start date the template operates on.
    ///
    /// A failure on one date does not stop the others; it is collected in
    /// `failures`. Only a reversed effective range fails the whole call.
    pub fn translate(&self, template: &TripTemplate) -> Result<Translation, TranslateError> {
        let dates = expand_start_dates(
            template.effective_from,
            template.effective_to,
            &template.operating_pattern,
        )
        .map_err(|e| TranslateError {
            trip_id: template.uuid.clone(),
            start_date: None,
            location: RecordLocation::trip(),
            kind: e.into(),
        })?;

        if let Some(expected) = template.ops_count.filter(|n| *n as usize != dates.len()) {
            warn!(
                trip = %template.uuid,
                expected,
                expanded = dates.len(),
                "operation count does not match the calendar"
            );
        }

        let mut trips = Vec::with_capacity(dates.len());
        let mut failures = Vec::new();
        for date in dates {
            match self.reconstruct(template, date) {
                Ok(reconstruction) => trips.push(reconstruction),
                Err(e) => {
                    warn!(error = %e, "skipping trip");
                    failures.push(e);
                }
            }
        }

        debug!(
            trip = %template.uuid,
            built = trips.len(),
            failed = failures.len(),
            "translated template"
        );
        Ok(Translation { trips, failures })
    }

    /// Reconstruct the trip starting on `start_date`.
    pub fn reconstruct(
        &self,
        template: &TripTemplate,
        start_date: NaiveDate,
    ) -> Result<Reconstruction, TranslateError> {
        let mut pass = Pass::new(template, start_date);
        let trip_location = RecordLocation::trip();

        let base = self.airport(&pass, trip_location, "base", &template.base)?;
        let satellite_base = template
            .satellite_base
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .and_then(|code| match self.airports.lookup(code) {
                Ok(airport) => Some(airport),
                Err(e) => {
                    debug!(trip = %template.uuid, error = %e, "ignoring satellite base");
                    None
                }
            });

        let operating_time = self.duration(&pass, trip_location, "block", &template.block)?;
        let soft_time = self.duration(&pass, trip_location, "synth", &template.synth)?;

        let first = template
            .dutyperiods
            .first()
            .ok_or_else(|| pass.error(trip_location, TranslateErrorKind::EmptyTrip))?;
        let mut report = self.first_report(&pass, start_date, &first.report_time, &base)?;

        let count = template.dutyperiods.len();
        let mut dutyperiods: Vec<DutyPeriod> = Vec::with_capacity(count);
        for (index, dp_template) in template.dutyperiods.iter().enumerate() {
            let dp = self.duty_period(&mut pass, index, dp_template, report, &base)?;

            if index + 1 < count {
                report = match (&dp.layover, self.config.missing_layover) {
                    (Some(layover), _) => layover.end.instant(),
                    (None, MissingLayoverPolicy::FollowsRelease) => {
                        debug!(
                            trip = %template.uuid,
                            duty_period = index,
                            "no layover, next report at release"
                        );
                        dp.release.instant()
                    }
                    (None, MissingLayoverPolicy::Reject) => {
                        return Err(pass.error(
                            RecordLocation::duty_period(index),
                            TranslateErrorKind::MissingLayover,
                        ));
                    }
                };
            }
            dutyperiods.push(dp);
        }

        let flight_time = dutyperiods
            .iter()
            .fold(Duration::zero(), |total, dp| total + dp.flight_time);
        let summed_block = dutyperiods
            .iter()
            .flat_map(|dp| &dp.flights)
            .fold(Duration::zero(), |total, f| total + f.operating_time);
        self.check_total(&mut pass, trip_location, operating_time, summed_block);

        let first_dp = &dutyperiods[0];
        let last_dp = &dutyperiods[count - 1];
        let (start_station, start) = (first_dp.start_station.clone(), first_dp.report);
        let (end_station, end) = (last_dp.end_station.clone(), last_dp.release);

        let trip = Trip {
            source: template.uuid.clone(),
            trip_number: template.number.clone(),
            base_equipment: BaseEquipment {
                base,
                satellite_base,
                equipment: template.equipment.clone(),
            },
            positions: template
                .positions
                .iter()
                .map(|name| Position { name: name.clone() })
                .collect(),
            operations: template
                .operations
                .iter()
                .map(|name| Operation { name: name.clone() })
                .collect(),
            special_qual: template.special_qual(),
            start_station,
            start,
            end_station,
            end,
            flight_time,
            operating_time,
            soft_time,
            dutyperiods,
        };

        debug!(
            trip = %template.uuid,
            %start_date,
            duty_periods = count,
            diagnostics = pass.diagnostics.len(),
            "reconstructed trip"
        );
        Ok(Reconstruction {
            trip,
            diagnostics: pass.diagnostics,
        })
    }

    /// Anchor the first report: `start_date` at the report time, base-local.
    fn first_report(
        &self,
        pass: &Pass<'_>,
        start_date: NaiveDate,
        report_time: &str,
        base: &AirportCode,
    ) -> Result<Instant, TranslateError> {
        let location = RecordLocation::duty_period(0);
        let time = parse_time_of_day(report_time)
            .map_err(|e| pass.error(location, TranslateErrorKind::InvalidReportTime(e)))?;

        resolve_local(start_date, time, base.tz()).ok_or_else(|| {
            pass.error(
                location,
                TranslateErrorKind::UnresolvableLocalTime {
                    local: start_date.and_time(time),
                    zone: base.tz_name(),
                },
            )
        })
    }

    fn duty_period(
        &self,
        pass: &mut Pass<'_>,
        index: usize,
        template: &DutyPeriodTemplate,
        report: Instant,
        base: &AirportCode,
    ) -> Result<DutyPeriod, TranslateError> {
        let location = RecordLocation::duty_period(index);
        let (Some(first), Some(last)) = (template.flights.first(), template.flights.last()) else {
            return Err(pass.error(location, TranslateErrorKind::EmptyDutyPeriod));
        };
        let last_index = template.flights.len() - 1;

        let start_station = self.airport(
            pass,
            RecordLocation::flight(index, 0),
            "departure",
            &first.departure_station,
        )?;
        let end_station = self.airport(
            pass,
            RecordLocation::flight(index, last_index),
            "arrival",
            &last.arrival_station,
        )?;

        let duty = self.duration(pass, location, "duty", &template.duty)?;
        let flight_duty = self.duration(pass, location, "flight_duty", &template.flight_duty)?;
        let operating_time = self.duration(pass, location, "block", &template.block)?;
        let soft_time = self.duration(pass, location, "synth", &template.synth)?;
        let release = report
            .checked_add(duty)
            .ok_or_else(|| pass.error(location, TranslateErrorKind::Overflow))?;

        let mut flights = Vec::with_capacity(template.flights.len());
        let mut cursor = report;
        for (flight_index, flight_template) in template.flights.iter().enumerate() {
            let (flight, next) = self.flight(
                pass,
                RecordLocation::flight(index, flight_index),
                flight_template,
                cursor,
                flight_index == last_index,
                base,
            )?;
            cursor = next;
            flights.push(flight);
        }

        if let Some(last_flight) = flights.last() {
            let last_arrival = last_flight.arrive.instant();
            if last_arrival > release {
                return Err(pass.error(
                    RecordLocation::flight(index, last_index),
                    TranslateErrorKind::FlightsExceedDuty {
                        last_arrival,
                        release,
                    },
                ));
            }
        }

        let flight_time = flights
            .iter()
            .fold(Duration::zero(), |total, f| total + f.flight_time);
        let summed_block = flights
            .iter()
            .fold(Duration::zero(), |total, f| total + f.operating_time);
        self.check_total(pass, location, operating_time, summed_block);

        let layover = template
            .layover
            .as_ref()
            .map(|layover| self.layover(pass, index, layover, release, base))
            .transpose()?;

        Ok(DutyPeriod {
            report: StationTime::new(report, &start_station, base),
            release: StationTime::new(release, &end_station, base),
            start_station,
            end_station,
            flights,
            duty,
            flight_duty,
            operating_time,
            flight_time,
            soft_time,
            layover,
        })
    }

    /// Build one flight departing at `departure`.
    ///
    /// Returns the flight and the next departure (arrival plus ground).
    fn flight(
        &self,
        pass: &mut Pass<'_>,
        location: RecordLocation,
        template: &FlightTemplate,
        departure: Instant,
        last_in_duty: bool,
        base: &AirportCode,
    ) -> Result<(Flight, Instant), TranslateError> {
        let departure_station =
            self.airport(pass, location, "departure", &template.departure_station)?;
        let arrival_station = self.airport(pass, location, "arrival", &template.arrival_station)?;

        let operating_time = self.elapsed(pass, location, &template.block, false, |raw| {
            DiagnosticKind::BlockNotReported { raw }
        });
        // Blank per-flight synth is zero; anything else must parse.
        let soft_time = if template.synth.trim().is_empty() {
            Duration::zero()
        } else {
            self.duration(pass, location, "synth", &template.synth)?
        };
        // The last leg of a duty period has nothing to be on the ground for.
        let ground_time = self.elapsed(pass, location, &template.ground, last_in_duty, |raw| {
            DiagnosticKind::GroundNotReported { raw }
        });

        let arrival = resolve_arrival(
            departure,
            arrival_station.tz(),
            &template.arrival_time,
            operating_time,
        )
        .ok_or_else(|| pass.error(location, TranslateErrorKind::Overflow))?;
        if let Some(reason) = arrival.fallback {
            pass.note(
                location,
                DiagnosticKind::ArrivalFromBlock {
                    raw: template.arrival_time.clone(),
                    reason: reason.to_string(),
                },
            );
        }

        let next = arrival
            .instant
            .checked_add(ground_time)
            .ok_or_else(|| pass.error(location, TranslateErrorKind::Overflow))?;

        let flight = Flight {
            number: template.flight_number.clone(),
            eq_code: template.eq_code.clone(),
            depart: StationTime::new(departure, &departure_station, base),
            arrive: StationTime::new(arrival.instant, &arrival_station, base),
            departure_station,
            arrival_station,
            deadhead: template.deadhead,
            deadhead_code: template.deadhead_code.clone(),
            crew_meal: template.crew_meal.clone(),
            eq_change: template.equipment_change,
            flight_time: arrival.instant.difference(&departure),
            operating_time,
            soft_time,
            ground_time,
        };
        Ok((flight, next))
    }

    fn layover(
        &self,
        pass: &Pass<'_>,
        dp_index: usize,
        template: &LayoverTemplate,
        release: Instant,
        base: &AirportCode,
    ) -> Result<Layover, TranslateError> {
        let location = RecordLocation::duty_period(dp_index);
        let station = self.airport(pass, location, "layover", &template.city)?;
        let rest = self.duration(pass, location, "layover.rest", &template.rest)?;
        let end = release
            .checked_add(rest)
            .ok_or_else(|| pass.error(location, TranslateErrorKind::Overflow))?;

        Ok(Layover {
            start: StationTime::new(release, &station, base),
            end: StationTime::new(end, &station, base),
            station,
            rest,
            hotels: template.hotels.iter().map(hotel).collect(),
        })
    }

    fn airport(
        &self,
        pass: &Pass<'_>,
        location: RecordLocation,
        role: &'static str,
        code: &str,
    ) -> Result<AirportCode, TranslateError> {
        self.airports
            .lookup(code)
            .map_err(|source| pass.error(location, TranslateErrorKind::UnknownAirport { role, source }))
    }

    /// Parse a duration the trip cannot be built without.
    fn duration(
        &self,
        pass: &Pass<'_>,
        location: RecordLocation,
        field: &'static str,
        text: &str,
    ) -> Result<Duration, TranslateError> {
        self.durations.parse(text).map_err(|source| {
            pass.error(
                location,
                TranslateErrorKind::UnparseableDuration { field, source },
            )
        })
    }

    /// Parse a duration that may be missing; zero when it is.
    ///
    /// A blank field is only noted when `blank_ok` is false.
    fn elapsed(
        &self,
        pass: &mut Pass<'_>,
        location: RecordLocation,
        text: &str,
        blank_ok: bool,
        diagnostic: fn(String) -> DiagnosticKind,
    ) -> Duration {
        match self.durations.parse_reported(text) {
            Elapsed::Reported(d) => d,
            Elapsed::NotReported(raw) => {
                if !(blank_ok && raw.trim().is_empty()) {
                    pass.note(location, diagnostic(raw));
                }
                Duration::zero()
            }
        }
    }

    fn check_total(
        &self,
        pass: &mut Pass<'_>,
        location: RecordLocation,
        reported: Duration,
        summed: Duration,
    ) {
        let tolerance = self.config.total_tolerance();
        let difference = reported - summed;
        if difference > tolerance || difference < -tolerance {
            pass.note(location, DiagnosticKind::TotalMismatch { reported, summed });
        }
    }
}

fn hotel(template: &HotelTemplate) -> Hotel {
    Hotel {
        name: template.name.clone(),
        phone: template.phone.clone(),
        transportation: template
            .transportation
            .iter()
            .map(|t| Transportation {
                name: t.name.clone(),
                phone: t.phone.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
#[path = "reconstruct_tests.rs"]
mod tests;
