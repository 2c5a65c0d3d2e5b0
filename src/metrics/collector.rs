//! Metrics collection using Prometheus
//!
//! This module provides metrics for the league engine: matches applied and
//! rejected, rank recomputations, rating movement and enrollment size.

use crate::types::MatchAudit;
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Main metrics collector for the league engine
#[derive(Clone)]
pub struct EngineMetrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Matches successfully applied
    pub matches_applied_total: IntCounter,

    /// Matches rejected, by error kind
    pub matches_rejected_total: IntCounterVec,

    /// Leaderboard recomputations triggered by stale ranks
    pub rank_recomputations_total: IntCounter,

    /// Absolute per-team rating delta
    pub rating_delta_abs: Histogram,

    /// Players currently enrolled
    pub players_enrolled: IntGauge,
}

impl EngineMetrics {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let matches_applied_total = IntCounter::new(
            "league_matches_applied_total",
            "Total matches applied to the player store",
        )?;
        registry.register(Box::new(matches_applied_total.clone()))?;

        let matches_rejected_total = IntCounterVec::new(
            Opts::new(
                "league_matches_rejected_total",
                "Total matches rejected without mutation",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(matches_rejected_total.clone()))?;

        let rank_recomputations_total = IntCounter::new(
            "league_rank_recomputations_total",
            "Total leaderboard recomputations",
        )?;
        registry.register(Box::new(rank_recomputations_total.clone()))?;

        let rating_delta_abs = Histogram::with_opts(
            HistogramOpts::new(
                "league_rating_delta_abs",
                "Absolute rating change per team per match",
            )
            .buckets(vec![1.0, 2.5, 5.0, 10.0, 20.0, 35.0, 50.0, 75.0, 100.0]),
        )?;
        registry.register(Box::new(rating_delta_abs.clone()))?;

        let players_enrolled =
            IntGauge::new("league_players_enrolled", "Players currently enrolled")?;
        registry.register(Box::new(players_enrolled.clone()))?;

        Ok(Self {
            registry,
            matches_applied_total,
            matches_rejected_total,
            rank_recomputations_total,
            rating_delta_abs,
            players_enrolled,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record a match applied to the store
    pub fn record_match_applied(&self, audit: &MatchAudit) {
        self.matches_applied_total.inc();
        self.rating_delta_abs.observe(audit.deltas.0.abs());
        self.rating_delta_abs.observe(audit.deltas.1.abs());
    }

    /// Record a rejected match
    pub fn record_match_rejected(&self, reason: &str) {
        self.matches_rejected_total
            .with_label_values(&[reason])
            .inc();
    }

    pub fn record_rank_recomputation(&self) {
        self.rank_recomputations_total.inc();
    }

    pub fn set_players_enrolled(&self, count: usize) {
        self.players_enrolled.set(count as i64);
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audit(delta_a: f64, delta_b: f64) -> MatchAudit {
        MatchAudit {
            team_ratings: (1000.0, 1000.0),
            expected_scores: (0.5, 0.5),
            k_factors: (30.0, 30.0),
            deltas: (delta_a, delta_b),
        }
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = EngineMetrics::new().unwrap();
        assert_eq!(metrics.matches_applied_total.get(), 0);
        assert_eq!(metrics.players_enrolled.get(), 0);
    }

    #[test]
    fn test_record_match_applied() {
        let metrics = EngineMetrics::new().unwrap();
        metrics.record_match_applied(&audit(12.0, -12.0));
        metrics.record_match_applied(&audit(-3.0, 3.0));

        assert_eq!(metrics.matches_applied_total.get(), 2);
        assert_eq!(metrics.rating_delta_abs.get_sample_count(), 4);
        assert_eq!(metrics.rating_delta_abs.get_sample_sum(), 30.0);
    }

    #[test]
    fn test_record_rejections_by_reason() {
        let metrics = EngineMetrics::new().unwrap();
        metrics.record_match_rejected("player_not_found");
        metrics.record_match_rejected("player_not_found");

        assert_eq!(
            metrics
                .matches_rejected_total
                .with_label_values(&["player_not_found"])
                .get(),
            2
        );
    }

    #[test]
    fn test_render_text_format() {
        let metrics = EngineMetrics::new().unwrap();
        metrics.set_players_enrolled(6);
        metrics.record_rank_recomputation();

        let text = metrics.render().unwrap();
        assert!(text.contains("league_players_enrolled 6"));
        assert!(text.contains("league_rank_recomputations_total 1"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = Arc::new(Registry::new());
        assert!(EngineMetrics::with_registry(registry.clone()).is_ok());
        assert!(EngineMetrics::with_registry(registry).is_err());
    }
}
