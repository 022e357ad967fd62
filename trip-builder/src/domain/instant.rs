//! UTC-anchored instants with a local zone.
//!
//! Schedule arithmetic across a DST boundary is not well defined on local
//! wall-clock times, so every `Instant` stores its point in time in UTC and
//! only projects into the local zone when asked.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Zone names accepted as a UTC anchor (compared case-insensitively).
const UTC_EQUIVALENT_NAMES: [&str; 6] = [
    "utc",
    "zulu",
    "universal",
    "etc/utc",
    "etc/universal",
    "etc/zulu",
];

/// Error returned when an `Instant` cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstantError {
    /// The anchor date-time carries no zone at all.
    #[error("instant has no timezone: {0}")]
    NaiveInstant(String),

    /// The anchor is attached to a zone that is not UTC.
    #[error("instant must be anchored to UTC, found {0}")]
    NonUtcInstant(String),

    /// The zone name is not in the timezone database.
    #[error("unknown timezone: {0}")]
    InvalidTimezone(String),

    /// The text is not a date-time at all.
    #[error("malformed instant: {0}")]
    Malformed(String),
}

/// Returns true if `name` is one of the zone names treated as UTC.
///
/// A zero offset is not enough: `Africa/Abidjan` is +00:00 all year but is
/// still a local zone.
///
/// ```
/// use trip_builder::domain::is_utc_equivalent;
///
/// assert!(is_utc_equivalent("Etc/UTC"));
/// assert!(is_utc_equivalent("zulu"));
/// assert!(!is_utc_equivalent("Africa/Abidjan"));
/// ```
pub fn is_utc_equivalent(name: &str) -> bool {
    UTC_EQUIVALENT_NAMES
        .iter()
        .any(|utc| utc.eq_ignore_ascii_case(name))
}

/// Resolve an IANA zone name.
pub(crate) fn resolve_zone(name: &str) -> Result<Tz, InstantError> {
    name.parse::<Tz>()
        .map_err(|_| InstantError::InvalidTimezone(name.to_string()))
}

/// An instant in time, stored in UTC, with the zone it should be shown in.
///
/// Equality, ordering and hashing only look at the UTC instant, so two
/// values shown in different zones are equal when they name the same moment.
///
/// # Examples
///
/// ```
/// use trip_builder::domain::Instant;
/// use chrono::Duration;
///
/// let report = Instant::parse("2024-11-01T14:00:00Z", "America/Los_Angeles").unwrap();
/// assert_eq!(report.localize().to_rfc3339(), "2024-11-01T07:00:00-07:00");
///
/// let release = report + Duration::hours(10);
/// assert_eq!(release.difference(&report), Duration::hours(10));
/// assert_eq!(release.tz_name(), "America/Los_Angeles");
/// ```
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "InstantRepr", into = "InstantRepr")]
pub struct Instant {
    utc: DateTime<Utc>,
    zone: Tz,
}

impl Instant {
    /// Create an instant from a UTC date-time and a zone name.
    pub fn new(utc: DateTime<Utc>, zone_name: &str) -> Result<Self, InstantError> {
        let zone = resolve_zone(zone_name)?;
        Ok(Self { utc, zone })
    }

    /// Create an instant from a UTC date-time and an already-resolved zone.
    pub fn from_utc(utc: DateTime<Utc>, zone: Tz) -> Self {
        Self { utc, zone }
    }

    /// Create an instant from a date-time in a named zone.
    ///
    /// The date-time's own zone must be one of the UTC-equivalent names.
    ///
    /// ```
    /// use trip_builder::domain::{Instant, InstantError};
    /// use chrono::TimeZone;
    /// use chrono_tz::Tz;
    ///
    /// let utc = Tz::Etc__UTC.with_ymd_and_hms(2024, 11, 1, 12, 0, 0).unwrap();
    /// assert!(Instant::from_zoned(utc, "Asia/Tokyo").is_ok());
    ///
    /// // Zero offset, but not UTC by name.
    /// let abidjan = Tz::Africa__Abidjan.with_ymd_and_hms(2024, 11, 1, 12, 0, 0).unwrap();
    /// assert!(matches!(
    ///     Instant::from_zoned(abidjan, "Asia/Tokyo"),
    ///     Err(InstantError::NonUtcInstant(_))
    /// ));
    /// ```
    pub fn from_zoned(anchor: DateTime<Tz>, zone_name: &str) -> Result<Self, InstantError> {
        let zone = resolve_zone(zone_name)?;
        let anchor_name = anchor.timezone().name();
        if !is_utc_equivalent(anchor_name) {
            return Err(InstantError::NonUtcInstant(anchor_name.to_string()));
        }
        Ok(Self {
            utc: anchor.with_timezone(&Utc),
            zone,
        })
    }

    /// Parse an anchor from text and attach a zone name.
    ///
    /// Accepted anchors:
    /// - RFC 3339 with a `Z` suffix, e.g. `2024-11-01T14:00:00Z`
    /// - a naive date-time with a bracketed zone, e.g. `2024-11-01T14:00:00[Etc/UTC]`
    ///
    /// A numeric offset (even `+00:00`) or a non-UTC bracketed zone is
    /// `NonUtcInstant`; a date-time with no zone is `NaiveInstant`.
    pub fn parse(text: &str, zone_name: &str) -> Result<Self, InstantError> {
        let zone = resolve_zone(zone_name)?;
        let text = text.trim();

        if let Some((naive_part, rest)) = text.split_once('[') {
            let anchor_name = rest
                .strip_suffix(']')
                .ok_or_else(|| InstantError::Malformed(text.to_string()))?;
            if !is_utc_equivalent(anchor_name) {
                resolve_zone(anchor_name)?;
                return Err(InstantError::NonUtcInstant(anchor_name.to_string()));
            }
            let naive = naive_part
                .parse::<NaiveDateTime>()
                .map_err(|_| InstantError::Malformed(text.to_string()))?;
            return Ok(Self {
                utc: Utc.from_utc_datetime(&naive),
                zone,
            });
        }

        match DateTime::parse_from_rfc3339(text) {
            Ok(fixed) if text.ends_with('Z') || text.ends_with('z') => Ok(Self {
                utc: fixed.with_timezone(&Utc),
                zone,
            }),
            Ok(fixed) => Err(InstantError::NonUtcInstant(fixed.offset().to_string())),
            Err(_) if text.parse::<NaiveDateTime>().is_ok() => {
                Err(InstantError::NaiveInstant(text.to_string()))
            }
            Err(_) => Err(InstantError::Malformed(text.to_string())),
        }
    }

    /// Returns the UTC instant.
    pub fn utc(&self) -> DateTime<Utc> {
        self.utc
    }

    /// Returns the display zone.
    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Returns the display zone's IANA name.
    pub fn tz_name(&self) -> &'static str {
        self.zone.name()
    }

    /// Returns the instant projected into its zone.
    pub fn localize(&self) -> DateTime<Tz> {
        self.utc.with_timezone(&self.zone)
    }

    /// Returns the instant projected into another zone.
    pub fn localize_in(&self, zone: Tz) -> DateTime<Tz> {
        self.utc.with_timezone(&zone)
    }

    /// Returns the same instant shown in a different zone.
    pub fn with_zone(&self, zone_name: &str) -> Result<Self, InstantError> {
        Self::new(self.utc, zone_name)
    }

    /// Returns the same instant shown in an already-resolved zone.
    pub fn with_tz(&self, zone: Tz) -> Self {
        Self::from_utc(self.utc, zone)
    }

    /// Add a duration, keeping the zone.
    ///
    /// Returns `None` on overflow.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        Some(Self {
            utc: self.utc.checked_add_signed(duration)?,
            zone: self.zone,
        })
    }

    /// Subtract a duration, keeping the zone.
    ///
    /// Returns `None` on overflow.
    pub fn checked_sub(&self, duration: Duration) -> Option<Self> {
        Some(Self {
            utc: self.utc.checked_sub_signed(duration)?,
            zone: self.zone,
        })
    }

    /// Add a duration, keeping the zone.
    pub fn add(&self, duration: Duration) -> Self {
        *self + duration
    }

    /// Subtract a duration, keeping the zone.
    pub fn subtract(&self, duration: Duration) -> Self {
        *self - duration
    }

    /// Returns `self - other`.
    ///
    /// Negative when `self` is before `other`.
    pub fn difference(&self, other: &Self) -> Duration {
        self.utc.signed_duration_since(other.utc)
    }
}

impl Add<Duration> for Instant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        self.checked_add(rhs).expect("instant overflow")
    }
}

impl Sub<Duration> for Instant {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        self.checked_sub(rhs).expect("instant overflow")
    }
}

impl Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Self::Output {
        self.difference(&rhs)
    }
}

impl PartialEq for Instant {
    fn eq(&self, other: &Self) -> bool {
        self.utc == other.utc
    }
}

impl Eq for Instant {}

impl Hash for Instant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.utc.hash(state);
    }
}

impl Ord for Instant {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utc.cmp(&other.utc)
    }
}

impl PartialOrd for Instant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Instant({}, {})",
            self.utc.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.zone.name()
        )
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "utc={}, tz_name={}, local={}",
            self.utc.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.zone.name(),
            self.localize().to_rfc3339_opts(SecondsFormat::AutoSi, false)
        )
    }
}

/// Serialized form: the UTC instant as RFC 3339 plus the zone name.
#[derive(Serialize, Deserialize)]
struct InstantRepr {
    utc: String,
    tz_name: String,
}

impl TryFrom<InstantRepr> for Instant {
    type Error = InstantError;

    fn try_from(repr: InstantRepr) -> Result<Self, Self::Error> {
        Instant::parse(&repr.utc, &repr.tz_name)
    }
}

impl From<Instant> for InstantRepr {
    fn from(instant: Instant) -> Self {
        Self {
            utc: instant.utc.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            tz_name: instant.zone.name().to_string(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const ZONES: [&str; 6] = [
        "UTC",
        "America/Los_Angeles",
        "America/New_York",
        "Europe/London",
        "Australia/Lord_Howe",
        "Asia/Kolkata",
    ];

    prop_compose! {
        fn any_instant()(
            secs in 946_684_800i64..4_102_444_800,
            zone_idx in 0usize..ZONES.len(),
        ) -> Instant {
            let utc = DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
            Instant::new(utc, ZONES[zone_idx]).unwrap()
        }
    }

    proptest! {
        /// Adding then subtracting a duration is the identity, including
        /// the local projection.
        #[test]
        fn add_subtract_identity(instant in any_instant(), minutes in -200_000i64..200_000) {
            let d = Duration::minutes(minutes);
            let round = instant.add(d).subtract(d);
            prop_assert_eq!(round, instant);
            prop_assert_eq!(round.localize(), instant.localize());
            prop_assert_eq!(round.tz_name(), instant.tz_name());
        }

        /// difference is antisymmetric.
        #[test]
        fn difference_antisymmetric(a in any_instant(), b in any_instant()) {
            prop_assert_eq!(a.difference(&b), -b.difference(&a));
        }

        /// difference agrees with ordering.
        #[test]
        fn difference_matches_ordering(a in any_instant(), b in any_instant()) {
            let d = a.difference(&b);
            match a.cmp(&b) {
                Ordering::Less => prop_assert!(d < Duration::zero()),
                Ordering::Greater => prop_assert!(d > Duration::zero()),
                Ordering::Equal => prop_assert_eq!(d, Duration::zero()),
            }
        }

        /// Localizing never changes the underlying instant.
        #[test]
        fn localize_preserves_instant(instant in any_instant()) {
            prop_assert_eq!(instant.localize().with_timezone(&Utc), instant.utc());
        }

        /// Any zone name that is not UTC-equivalent is rejected as an anchor.
        #[test]
        fn non_utc_anchor_rejected(secs in 946_684_800i64..4_102_444_800, zone_idx in 1usize..ZONES.len()) {
            let tz: Tz = ZONES[zone_idx].parse().unwrap();
            let anchor = DateTime::<Utc>::from_timestamp(secs, 0).unwrap().with_timezone(&tz);
            prop_assert!(matches!(
                Instant::from_zoned(anchor, "UTC"),
                Err(InstantError::NonUtcInstant(_))
            ));
        }
    }
}
