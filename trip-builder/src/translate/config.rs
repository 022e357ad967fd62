//! Reconstruction configuration.

use std::str::FromStr;

use chrono::Duration;

/// What to do when a duty period has no layover but another one follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingLayoverPolicy {
    /// Fail the trip.
    #[default]
    Reject,
    /// Report for the next duty period at the previous release.
    FollowsRelease,
}

/// Error returned when a policy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown missing-layover policy {0:?}: expected \"reject\" or \"follow\"")]
pub struct UnknownPolicy(String);

impl FromStr for MissingLayoverPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "follow" | "follows_release" => Ok(Self::FollowsRelease),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Configuration parameters for trip reconstruction.
#[derive(Debug, Clone)]
pub struct ReconstructConfig {
    /// Handling of a missing layover between duty periods.
    pub missing_layover: MissingLayoverPolicy,

    /// Largest difference between a reported block total and the sum of
    /// the flights' block times that is not flagged (minutes).
    pub total_tolerance_mins: i64,
}

impl ReconstructConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(missing_layover: MissingLayoverPolicy, total_tolerance_mins: i64) -> Self {
        Self {
            missing_layover,
            total_tolerance_mins,
        }
    }

    /// Returns the total tolerance as a Duration.
    pub fn total_tolerance(&self) -> Duration {
        Duration::minutes(self.total_tolerance_mins)
    }
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            missing_layover: MissingLayoverPolicy::Reject,
            total_tolerance_mins: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ReconstructConfig::default();

        assert_eq!(config.missing_layover, MissingLayoverPolicy::Reject);
        assert_eq!(config.total_tolerance(), Duration::zero());
    }

    #[test]
    fn custom_config() {
        let config = ReconstructConfig::new(MissingLayoverPolicy::FollowsRelease, 5);

        assert_eq!(config.missing_layover, MissingLayoverPolicy::FollowsRelease);
        assert_eq!(config.total_tolerance(), Duration::minutes(5));
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("reject".parse(), Ok(MissingLayoverPolicy::Reject));
        assert_eq!(" Follow ".parse(), Ok(MissingLayoverPolicy::FollowsRelease));
        assert_eq!(
            "follows_release".parse(),
            Ok(MissingLayoverPolicy::FollowsRelease)
        );
        assert!("ignore".parse::<MissingLayoverPolicy>().is_err());
    }
}
