//! Structured trip templates.
//!
//! A template is the already-parsed bid-package record for one trip
//! pattern: local report times, elapsed-time strings and an effective-date
//! range. Templates arrive in more than one schema; each is a variant of
//! `VersionedTemplate` and migrates explicitly into the current
//! `TripTemplate` shape.

mod legacy;
mod types;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarError;

pub use legacy::{
    StructuredDutyPeriod, StructuredFlight, StructuredTrip, TripExternal, TripFooter,
};
pub use types::{
    DutyPeriodTemplate, FlightTemplate, HotelTemplate, LayoverTemplate, TransportationTemplate,
    TripTemplate,
};

/// Errors from loading or migrating a template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Failed to read the template file
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the template JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A date field is not `YYYY-MM-DD`
    #[error("invalid date in {field}: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    /// The operating calendar cannot be turned into dates
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// A template in any supported schema, tagged by `schema`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "schema")]
pub enum VersionedTemplate {
    /// Structured output of the 2022-01 bid-package parser.
    #[serde(rename = "pbs_2022_01")]
    Pbs2022_01(StructuredTrip),
    /// The current shape.
    #[serde(rename = "trip_template_v2")]
    V2(TripTemplate),
}

impl VersionedTemplate {
    /// Migrate into the current template shape.
    pub fn into_current(self) -> Result<TripTemplate, TemplateError> {
        match self {
            VersionedTemplate::Pbs2022_01(trip) => trip.migrate(),
            VersionedTemplate::V2(template) => Ok(template),
        }
    }

    /// Parse a template of any schema from JSON.
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Load a template file of any schema and migrate it.
pub fn load_template(path: impl AsRef<Path>) -> Result<TripTemplate, TemplateError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    VersionedTemplate::from_json(&json)?.into_current()
}
