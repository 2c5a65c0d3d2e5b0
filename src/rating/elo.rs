//! Margin-weighted Elo rating model
//!
//! Team ratings are compared with the logistic Elo curve from the skillratings
//! crate. The result is scaled by a per-team K-factor and by a multiplier that
//! grows with the goal difference. There is no upset ("surprise") multiplier, so
//! with equal K on both sides the two deltas cancel exactly.

use crate::config::RatingConfig;
use crate::rating::calculator::{DeltaInput, RatingCalculator, RatingDelta};
use crate::types::MatchOutcome;
use skillratings::elo::{expected_score, EloRating};

/// Smallest goal difference of a decided match; the multiplier is 1 there
const MIN_DECISIVE_DIFF: f64 = 1.0;

/// Margin-weighted Elo calculator implementation
#[derive(Debug, Clone)]
pub struct EloMarginCalculator {
    config: RatingConfig,
}

impl EloMarginCalculator {
    /// Create a new calculator
    pub fn new(config: RatingConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Goal-difference multiplier, normalized to 1 for a one-goal win.
    ///
    /// Scores above the blowout threshold are first scaled down so the larger
    /// equals the blowout ceiling.
    pub fn margin_multiplier(&self, score_a: u32, score_b: u32) -> f64 {
        let (goals_a, goals_b) = self.rescale_blowout(score_a, score_b);
        let diff = (goals_a - goals_b).abs();

        raw_margin(diff) / raw_margin(MIN_DECISIVE_DIFF)
    }

    fn rescale_blowout(&self, score_a: u32, score_b: u32) -> (f64, f64) {
        let max_goals = score_a.max(score_b);
        if max_goals > self.config.blowout_threshold {
            let factor = self.config.blowout_ceiling / max_goals as f64;
            (score_a as f64 * factor, score_b as f64 * factor)
        } else {
            (score_a as f64, score_b as f64)
        }
    }
}

impl Default for EloMarginCalculator {
    fn default() -> Self {
        Self {
            config: RatingConfig::default(),
        }
    }
}

fn raw_margin(diff: f64) -> f64 {
    (diff / 2.0 + 1.0).sqrt() * (1.0 + diff / 8.0)
}

impl RatingCalculator for EloMarginCalculator {
    fn expected_score(&self, rating_a: f64, rating_b: f64) -> f64 {
        let (expected_a, _) = expected_score(
            &EloRating { rating: rating_a },
            &EloRating { rating: rating_b },
        );
        expected_a
    }

    fn compute_delta(&self, input: &DeltaInput) -> RatingDelta {
        let (rating_a, rating_b) = input.team_ratings;
        let (score_a, score_b) = input.score;
        let (k_a, k_b) = input.k_factors;

        let expected_a = self.expected_score(rating_a, rating_b);
        let expected_b = 1.0 - expected_a;

        let actual_a = MatchOutcome::from_goals(score_a, score_b).actual_score();
        let actual_b = 1.0 - actual_a;

        let margin = self.margin_multiplier(score_a, score_b);

        RatingDelta {
            expected_scores: (expected_a, expected_b),
            margin_multiplier: margin,
            deltas: (
                k_a * margin * (actual_a - expected_a),
                k_b * margin * (actual_b - expected_b),
            ),
        }
    }

    fn initial_rating(&self) -> f64 {
        self.config.default_rating
    }
}
