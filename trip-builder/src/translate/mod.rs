//! Template → trip translation.
//!
//! Expands a template's calendar into start dates and reconstructs one
//! fully time-resolved [`Trip`](crate::domain::Trip) per date.

mod arrival;
mod config;
mod error;
mod reconstruct;

pub use config::{MissingLayoverPolicy, ReconstructConfig, UnknownPolicy};
pub use error::{Diagnostic, DiagnosticKind, RecordLocation, TranslateError, TranslateErrorKind};
pub use reconstruct::{Reconstruction, Reconstructor, Translation};

use crate::airports::AirportLookup;
use crate::domain::DurationParser;
use crate::template::TripTemplate;

/// Reconstruct every trip a template produces.
///
/// Convenience wrapper around [`Reconstructor::translate`].
pub fn translate_template<L, P>(
    template: &TripTemplate,
    airports: &L,
    durations: &P,
    config: &ReconstructConfig,
) -> Result<Translation, TranslateError>
where
    L: AirportLookup + ?Sized,
    P: DurationParser + ?Sized,
{
    Reconstructor::new(airports, durations, config.clone()).translate(template)
}
