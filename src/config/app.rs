//! Main application configuration
//!
//! This module defines the top-level configuration for the league engine,
//! including TOML file loading, environment variable overrides and validation.

use crate::config::league::{RankingConfig, StatsConfig};
use crate::config::rating::{KFactorConfig, RatingConfig};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub k_factor: KFactorConfig,
    pub ranking: RankingConfig,
    pub stats: StatsConfig,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "foosball-league".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse configuration from TOML text; missing sections keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        if let Ok(rating) = env::var("DEFAULT_RATING") {
            self.rating.default_rating = rating
                .parse()
                .map_err(|_| anyhow!("Invalid DEFAULT_RATING value: {}", rating))?;
        }
        if let Ok(threshold) = env::var("BLOWOUT_THRESHOLD") {
            self.rating.blowout_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("Invalid BLOWOUT_THRESHOLD value: {}", threshold))?;
        }
        if let Ok(ceiling) = env::var("BLOWOUT_CEILING") {
            self.rating.blowout_ceiling = ceiling
                .parse()
                .map_err(|_| anyhow!("Invalid BLOWOUT_CEILING value: {}", ceiling))?;
        }

        // K-factor settings
        if let Ok(k) = env::var("K_ONBOARDING") {
            self.k_factor.onboarding_k = k
                .parse()
                .map_err(|_| anyhow!("Invalid K_ONBOARDING value: {}", k))?;
        }
        if let Ok(k) = env::var("K_STEADY") {
            self.k_factor.steady_k = k
                .parse()
                .map_err(|_| anyhow!("Invalid K_STEADY value: {}", k))?;
        }
        if let Ok(matches) = env::var("K_ONBOARDING_MATCHES") {
            self.k_factor.onboarding_matches = matches
                .parse()
                .map_err(|_| anyhow!("Invalid K_ONBOARDING_MATCHES value: {}", matches))?;
        }

        // Ranking and stats settings
        if let Ok(min_matches) = env::var("RANKING_MIN_MATCHES") {
            self.ranking.min_matches = min_matches
                .parse()
                .map_err(|_| anyhow!("Invalid RANKING_MIN_MATCHES value: {}", min_matches))?;
        }
        if let Ok(window) = env::var("RECENT_FORM_WINDOW") {
            self.stats.recent_form_window = window
                .parse()
                .map_err(|_| anyhow!("Invalid RECENT_FORM_WINDOW value: {}", window))?;
        }
        if let Ok(threshold) = env::var("ROLE_PREFERENCE_THRESHOLD") {
            self.stats.role_preference_threshold = threshold.parse().map_err(|_| {
                anyhow!("Invalid ROLE_PREFERENCE_THRESHOLD value: {}", threshold)
            })?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.rating.validate()?;
    config.k_factor.validate()?;
    config.stats.validate()?;

    Ok(())
}
