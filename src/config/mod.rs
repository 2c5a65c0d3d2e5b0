//! Configuration management for the league engine
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values.

pub mod app;
pub mod league;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use league::{RankingConfig, StatsConfig};
pub use rating::{KFactorConfig, RatingConfig};
