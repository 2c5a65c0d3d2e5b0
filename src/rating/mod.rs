//! Rating model: win probability, margin-weighted deltas and K-factors
//!
//! This module provides the pure math the match processor relies on, behind
//! the `RatingCalculator` trait so the model can be replaced.

pub mod calculator;
pub mod elo;
pub mod k_factor;

// Re-export commonly used types
pub use calculator::{DeltaInput, RatingCalculator, RatingDelta};
pub use elo::EloMarginCalculator;
pub use k_factor::KFactorPolicy;
