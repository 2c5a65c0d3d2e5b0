//! Foosball League - Rating and ranking engine for 2v2 table football
//!
//! This crate keeps per-player Elo ratings for a league of defender/attacker
//! pairs, applies finished matches with a goal-margin multiplier and an
//! experience-dependent K-factor, and maintains a tie-aware leaderboard and
//! per-player analytics.

pub mod config;
pub mod error;
pub mod league;
pub mod metrics;
pub mod rating;
pub mod stats;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LeagueError, Result};
pub use types::*;

// Re-export key components
pub use league::{LeagueEngine, Player, PlayerAggregateStore, RankTable, ReplayPolicy};
pub use rating::{EloMarginCalculator, KFactorPolicy, RatingCalculator};
pub use stats::{PlayerStats, StatsProjector};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
