//! Airport lookup by IATA code.
//!
//! The reconstructor only sees the `AirportLookup` trait. `AirportDatabase`
//! is the in-memory implementation, built by the caller from records or
//! a JSON file and passed in by reference.

mod database;
mod error;

pub use database::{AirportDatabase, AirportLookup, AirportRecord};
pub use error::AirportError;
