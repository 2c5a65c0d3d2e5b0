//! Rating calculator trait and shared input/output types
//!
//! This module defines the interface the match processor uses to turn a
//! finished match into rating deltas, so alternate models can be swapped in.

use serde::{Deserialize, Serialize};

/// Everything a model needs to price one match. Pairs are (team A, team B).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaInput {
    /// Mean rating of each team before the match
    pub team_ratings: (f64, f64),
    /// Final score
    pub score: (u32, u32),
    /// K-factor of each team
    pub k_factors: (f64, f64),
}

/// Result of pricing one match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingDelta {
    pub expected_scores: (f64, f64),
    pub margin_multiplier: f64,
    /// Signed rating change for every member of each team
    pub deltas: (f64, f64),
}

/// Trait for calculating rating changes after matches
#[cfg_attr(test, mockall::automock)]
pub trait RatingCalculator {
    /// Probability that a team rated `rating_a` beats a team rated `rating_b`
    fn expected_score(&self, rating_a: f64, rating_b: f64) -> f64;

    /// Compute the per-team rating deltas for a finished match
    fn compute_delta(&self, input: &DeltaInput) -> RatingDelta;

    /// Rating given to players enrolled without one
    fn initial_rating(&self) -> f64;
}
