//! Experience-based K-factor policy
//!
//! New players start at the onboarding K and decay linearly to the steady-state
//! K over the onboarding period. A team's K is the mean of its two members'.

use crate::config::KFactorConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KFactorPolicy {
    config: KFactorConfig,
}

impl KFactorPolicy {
    pub fn new(config: KFactorConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &KFactorConfig {
        &self.config
    }

    /// K for a single player who has already played `matches_played` matches
    pub fn player_k(&self, matches_played: u32) -> f64 {
        let KFactorConfig {
            onboarding_k,
            steady_k,
            onboarding_matches,
        } = self.config;

        let remaining = 1.0 - matches_played as f64 / onboarding_matches as f64;
        steady_k + (remaining * (onboarding_k - steady_k)).max(0.0)
    }

    /// K for a team, blending both partners' experience
    pub fn team_k(&self, matches_first: u32, matches_second: u32) -> f64 {
        (self.player_k(matches_first) + self.player_k(matches_second)) / 2.0
    }
}
