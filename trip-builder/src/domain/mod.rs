//! Domain types for trip reconstruction.
//!
//! All types enforce their invariants at construction time, so code that
//! receives them can trust their validity. Every stored instant is
//! anchored to UTC; local times are projections.

mod airport;
mod duration;
mod instant;
mod trip;

pub use airport::{AirportCode, InvalidAirport, normalize_iata};
pub use duration::{
    DurationError, DurationParser, Elapsed, PbsDurationParser, TimeOfDayError, parse_time_of_day,
};
pub use instant::{Instant, InstantError, is_utc_equivalent};
pub use trip::{
    BaseEquipment, DutyPeriod, Flight, Hotel, Layover, Operation, Position, StationTime,
    Transportation, Trip,
};
