//! Airline trip itinerary reconstruction.
//!
//! Turns a bid-package trip template (times of day and elapsed durations)
//! into fully time-resolved trips: one per start date the template
//! operates on, with every event anchored to UTC and shown in the local
//! time of its station and of the crew's home base.

pub mod airports;
pub mod calendar;
pub mod domain;
pub mod template;
pub mod translate;
