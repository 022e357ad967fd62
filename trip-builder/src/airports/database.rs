//! In-memory airport database.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{AirportCode, normalize_iata};

use super::error::AirportError;

/// Looks up airports by IATA code.
///
/// Lookups are read-only, so one instance can serve any number of
/// concurrent reconstructions.
pub trait AirportLookup: Send + Sync {
    /// Find the airport for an IATA code (case-insensitive).
    fn lookup(&self, iata: &str) -> Result<AirportCode, AirportError>;
}

/// One airport as stored in a database file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportRecord {
    pub iata: String,
    #[serde(default)]
    pub icao: String,
    pub tz: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// IATA code → airport mapping.
///
/// Built once by the caller and never modified afterwards.
///
/// # Examples
///
/// ```
/// use trip_builder::airports::{AirportDatabase, AirportLookup, AirportRecord};
///
/// let db = AirportDatabase::from_records(vec![AirportRecord {
///     iata: "LAX".into(),
///     icao: "KLAX".into(),
///     tz: "America/Los_Angeles".into(),
///     name: None,
/// }]);
///
/// assert_eq!(db.lookup("lax").unwrap().icao(), "KLAX");
/// assert!(db.lookup("XXX").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AirportDatabase {
    airports: HashMap<String, AirportCode>,
}

impl AirportDatabase {
    /// Build a database from records.
    ///
    /// Records with an invalid IATA code or timezone are skipped with a
    /// warning. Later duplicates replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = AirportRecord>) -> Self {
        let airports = records
            .into_iter()
            .filter_map(|record| {
                match AirportCode::new(&record.iata, &record.icao, &record.tz) {
                    Ok(code) => Some((code.iata().to_string(), code)),
                    Err(e) => {
                        warn!(iata = %record.iata, error = %e, "skipping airport record");
                        None
                    }
                }
            })
            .collect();

        Self { airports }
    }

    /// Load a database from a JSON array of records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AirportError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| AirportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<AirportRecord> =
            serde_json::from_str(&contents).map_err(|e| AirportError::Json {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let db = Self::from_records(records);
        debug!(path = %path.display(), airports = db.len(), "loaded airport database");
        Ok(db)
    }

    /// Get the number of airports in the database.
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    /// Check if the database is empty.
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

impl AirportLookup for AirportDatabase {
    fn lookup(&self, iata: &str) -> Result<AirportCode, AirportError> {
        normalize_iata(iata)
            .and_then(|key| self.airports.get(&key))
            .cloned()
            .ok_or_else(|| AirportError::UnknownAirport(iata.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(iata: &str, icao: &str, tz: &str) -> AirportRecord {
        AirportRecord {
            iata: iata.into(),
            icao: icao.into(),
            tz: tz.into(),
            name: None,
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let db = AirportDatabase::from_records(vec![record("SFO", "KSFO", "America/Los_Angeles")]);
        assert_eq!(db.lookup("sfo").unwrap().iata(), "SFO");
        assert_eq!(db.lookup(" SFO ").unwrap().iata(), "SFO");
    }

    #[test]
    fn unknown_airport() {
        let db = AirportDatabase::from_records(vec![record("SFO", "KSFO", "America/Los_Angeles")]);
        let err = db.lookup("OAK").unwrap_err();
        assert!(matches!(err, AirportError::UnknownAirport(code) if code == "OAK"));

        // Not even a valid code
        assert!(matches!(db.lookup(""), Err(AirportError::UnknownAirport(_))));
    }

    #[test]
    fn skips_invalid_records() {
        let db = AirportDatabase::from_records(vec![
            record("SFO", "KSFO", "America/Los_Angeles"),
            record("", "XXXX", "UTC"),
            record("BAD", "XBAD", "Not/AZone"),
            record("NRT", "RJAA", "Asia/Tokyo"),
        ]);
        assert_eq!(db.len(), 2);
        assert!(db.lookup("BAD").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("airports.json");
        let records = vec![
            record("LAX", "KLAX", "America/Los_Angeles"),
            AirportRecord {
                name: Some("Honolulu".into()),
                ..record("HNL", "PHNL", "Pacific/Honolulu")
            },
        ];
        std::fs::write(&path, serde_json::to_string_pretty(&records).unwrap()).unwrap();

        let db = AirportDatabase::load(&path).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.lookup("HNL").unwrap().tz_name(), "Pacific/Honolulu");
    }

    #[test]
    fn load_missing_file() {
        let err = AirportDatabase::load("/nonexistent/airports.json").unwrap_err();
        assert!(matches!(err, AirportError::Io { .. }));
    }

    #[test]
    fn load_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("airports.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = AirportDatabase::load(&path).unwrap_err();
        assert!(matches!(err, AirportError::Json { .. }));
    }

    #[test]
    fn empty_database() {
        let db = AirportDatabase::default();
        assert!(db.is_empty());
        assert!(db.lookup("LAX").is_err());
    }
}
