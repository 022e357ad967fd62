//! Airport identifier types.

use std::fmt;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::instant::resolve_zone;

/// Error returned when building an invalid `AirportCode`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAirport {
    /// IATA codes are 3 ASCII letters.
    #[error("invalid IATA code: {0:?}")]
    Iata(String),

    /// The timezone name does not resolve.
    #[error("invalid timezone for {iata}: {tz_name}")]
    Timezone { iata: String, tz_name: String },
}

/// Airport/city identifiers with the station's timezone.
///
/// The IATA code is normalized to uppercase. The timezone is validated
/// against the timezone database when the code is built.
///
/// # Examples
///
/// ```
/// use trip_builder::domain::AirportCode;
///
/// let lax = AirportCode::new("lax", "KLAX", "America/Los_Angeles").unwrap();
/// assert_eq!(lax.iata(), "LAX");
/// assert_eq!(lax.tz_name(), "America/Los_Angeles");
///
/// assert!(AirportCode::new("LAXX", "KLAX", "America/Los_Angeles").is_err());
/// assert!(AirportCode::new("LAX", "KLAX", "America/Hollywood").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AirportCode {
    iata: String,
    icao: String,
    #[serde(rename = "tz_name")]
    tz: Tz,
}

impl AirportCode {
    /// Build an airport code, validating the IATA code and timezone.
    pub fn new(iata: &str, icao: &str, tz_name: &str) -> Result<Self, InvalidAirport> {
        let iata = normalize_iata(iata).ok_or_else(|| InvalidAirport::Iata(iata.to_string()))?;
        let tz = resolve_zone(tz_name).map_err(|_| InvalidAirport::Timezone {
            iata: iata.clone(),
            tz_name: tz_name.to_string(),
        })?;
        Ok(Self {
            iata,
            icao: icao.trim().to_ascii_uppercase(),
            tz,
        })
    }

    /// Returns the 3-letter IATA code.
    pub fn iata(&self) -> &str {
        &self.iata
    }

    /// Returns the 4-letter ICAO code (may be empty for city codes).
    pub fn icao(&self) -> &str {
        &self.icao
    }

    /// Returns the station's timezone.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Returns the station's timezone name.
    pub fn tz_name(&self) -> &'static str {
        self.tz.name()
    }
}

/// Uppercase a 3-letter IATA code, or `None` if it is not one.
pub fn normalize_iata(code: &str) -> Option<String> {
    let code = code.trim();
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic()) {
        Some(code.to_ascii_uppercase())
    } else {
        None
    }
}

impl fmt::Debug for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AirportCode({}/{}, {})", self.iata, self.icao, self.tz.name())
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case() {
        let code = AirportCode::new(" jfk ", "kjfk", "America/New_York").unwrap();
        assert_eq!(code.iata(), "JFK");
        assert_eq!(code.icao(), "KJFK");
        assert_eq!(code.tz(), Tz::America__New_York);
    }

    #[test]
    fn rejects_bad_iata() {
        for bad in ["", "LA", "LAXX", "L4X", "L-X"] {
            assert_eq!(
                AirportCode::new(bad, "KLAX", "America/Los_Angeles"),
                Err(InvalidAirport::Iata(bad.to_string()))
            );
        }
    }

    #[test]
    fn rejects_bad_timezone() {
        let err = AirportCode::new("LAX", "KLAX", "Pacific/Nowhere").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid timezone for LAX: Pacific/Nowhere"
        );
    }

    #[test]
    fn display_and_debug() {
        let code = AirportCode::new("NRT", "RJAA", "Asia/Tokyo").unwrap();
        assert_eq!(code.to_string(), "NRT");
        assert_eq!(format!("{code:?}"), "AirportCode(NRT/RJAA, Asia/Tokyo)");
    }

    #[test]
    fn serde_shape() {
        let code = AirportCode::new("NRT", "RJAA", "Asia/Tokyo").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, r#"{"iata":"NRT","icao":"RJAA","tz_name":"Asia/Tokyo"}"#);
        let back: AirportCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any 3 ASCII letters normalize to the uppercase form.
        #[test]
        fn iata_normalized(s in "[a-zA-Z]{3}") {
            let code = AirportCode::new(&s, "", "UTC").unwrap();
            prop_assert_eq!(code.iata(), s.to_ascii_uppercase());
        }

        /// Wrong-length codes are rejected.
        #[test]
        fn wrong_length_rejected(s in "[A-Z]{0,2}|[A-Z]{4,8}") {
            prop_assert!(AirportCode::new(&s, "", "UTC").is_err());
        }
    }
}
