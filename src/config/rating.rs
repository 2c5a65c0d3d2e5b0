//! Rating system configuration

use crate::error::{LeagueError, Result};
use serde::{Deserialize, Serialize};

/// Parameters of the margin-weighted Elo model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Rating assigned at enrollment when the registry gives none
    pub default_rating: f64,
    /// Scores whose larger side exceeds this are rescaled before the margin is taken
    pub blowout_threshold: u32,
    /// Larger score after rescaling a blowout
    pub blowout_ceiling: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            default_rating: 1000.0,
            blowout_threshold: 10,
            blowout_ceiling: 8.0,
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.default_rating.is_finite() {
            return Err(LeagueError::ConfigurationError {
                message: "Default rating must be finite".to_string(),
            }
            .into());
        }

        if !self.blowout_ceiling.is_finite() || self.blowout_ceiling <= 0.0 {
            return Err(LeagueError::ConfigurationError {
                message: "Blowout ceiling must be positive and finite".to_string(),
            }
            .into());
        }

        if self.blowout_ceiling > self.blowout_threshold as f64 {
            return Err(LeagueError::ConfigurationError {
                message: "Blowout ceiling cannot exceed the blowout threshold".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Experience-based K-factor curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KFactorConfig {
    /// K for a player with no matches
    pub onboarding_k: f64,
    /// K once the onboarding period is over
    pub steady_k: f64,
    /// Number of matches over which K decays linearly
    pub onboarding_matches: u32,
}

impl Default for KFactorConfig {
    fn default() -> Self {
        Self {
            onboarding_k: 60.0,
            steady_k: 30.0,
            onboarding_matches: 16,
        }
    }
}

impl KFactorConfig {
    /// Same K for every player regardless of experience
    pub fn flat(k: f64) -> Self {
        Self {
            onboarding_k: k,
            steady_k: k,
            onboarding_matches: 1,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.steady_k.is_finite() || self.steady_k <= 0.0 {
            return Err(LeagueError::ConfigurationError {
                message: "Steady-state K must be positive and finite".to_string(),
            }
            .into());
        }

        if !self.onboarding_k.is_finite() {
            return Err(LeagueError::ConfigurationError {
                message: "Onboarding K must be finite".to_string(),
            }
            .into());
        }

        if self.onboarding_k < self.steady_k {
            return Err(LeagueError::ConfigurationError {
                message: "Onboarding K must be at least the steady-state K".to_string(),
            }
            .into());
        }

        if self.onboarding_matches == 0 {
            return Err(LeagueError::ConfigurationError {
                message: "Onboarding period must be at least one match".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_config_defaults_are_valid() {
        let config = RatingConfig::default();
        assert_eq!(config.default_rating, 1000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rating_config_validation() {
        let mut config = RatingConfig::default();
        config.blowout_ceiling = 0.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.blowout_ceiling = 12.0;
        assert!(config.validate().is_err());

        config = RatingConfig::default();
        config.default_rating = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_k_factor_config_validation() {
        assert!(KFactorConfig::default().validate().is_ok());
        assert!(KFactorConfig::flat(30.0).validate().is_ok());

        let mut config = KFactorConfig::default();
        config.onboarding_k = 10.0;
        assert!(config.validate().is_err());

        config = KFactorConfig::default();
        config.onboarding_matches = 0;
        assert!(config.validate().is_err());

        config = KFactorConfig::default();
        config.steady_k = 0.0;
        config.onboarding_k = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut rating = RatingConfig::default();
        rating.blowout_ceiling = f64::NAN;
        assert!(rating.validate().is_err());

        for k in [f64::NAN, f64::INFINITY] {
            let mut config = KFactorConfig::default();
            config.onboarding_k = k;
            assert!(config.validate().is_err(), "onboarding_k {} accepted", k);

            let mut config = KFactorConfig::default();
            config.steady_k = k;
            assert!(config.validate().is_err(), "steady_k {} accepted", k);
        }
    }
}
