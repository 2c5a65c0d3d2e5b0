//! Ranking and statistics configuration

use crate::error::{LeagueError, Result};
use serde::{Deserialize, Serialize};

/// Leaderboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RankingConfig {
    /// Players with fewer matches stay unranked
    pub min_matches: u32,
}

/// Per-player analytics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Number of latest matches summarized as recent form
    pub recent_form_window: usize,
    /// Share of matches in one role needed to call it the preferred role
    pub role_preference_threshold: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            recent_form_window: 5,
            role_preference_threshold: 0.67,
        }
    }
}

impl StatsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.recent_form_window == 0 {
            return Err(LeagueError::ConfigurationError {
                message: "Recent form window must be at least one match".to_string(),
            }
            .into());
        }

        if !(self.role_preference_threshold > 0.5 && self.role_preference_threshold <= 1.0) {
            return Err(LeagueError::ConfigurationError {
                message: "Role preference threshold must be in (0.5, 1.0]".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
