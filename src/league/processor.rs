//! Match processor
//!
//! Applies finished matches to the player store one at a time. Each match is
//! all-or-nothing: every participant is looked up before anything is mutated.
//! Applying a match is not idempotent, and the processor never reorders or
//! deduplicates its input.

use crate::config::{KFactorConfig, RatingConfig};
use crate::error::{LeagueError, Result};
use crate::league::store::{MatchContribution, PlayerAggregateStore};
use crate::metrics::EngineMetrics;
use crate::rating::{DeltaInput, EloMarginCalculator, KFactorPolicy, RatingCalculator};
use crate::types::{Match, MatchAudit, MatchId, PlayerId, Role, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a batch replay does when a match cannot be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayPolicy {
    /// Log the failure, record it in the report and keep going
    SkipFailed,
    /// Stop at the first failure; earlier matches stay applied
    Abort,
}

/// A match left out of a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedMatch {
    pub match_id: MatchId,
    pub reason: String,
}

/// Outcome of a batch replay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub skipped: Vec<SkippedMatch>,
}

pub struct MatchProcessor {
    calculator: Box<dyn RatingCalculator>,
    k_policy: KFactorPolicy,
    metrics: Option<Arc<EngineMetrics>>,
}

impl MatchProcessor {
    pub fn new(calculator: Box<dyn RatingCalculator>, k_policy: KFactorPolicy) -> Self {
        Self {
            calculator,
            k_policy,
            metrics: None,
        }
    }

    /// Build the production processor from configuration
    pub fn from_config(rating: &RatingConfig, k_factor: &KFactorConfig) -> Result<Self> {
        let calculator = EloMarginCalculator::new(rating.clone())?;
        let k_policy = KFactorPolicy::new(k_factor.clone())?;
        Ok(Self::new(Box::new(calculator), k_policy))
    }

    /// Record applied and rejected matches on `metrics`
    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn calculator(&self) -> &dyn RatingCalculator {
        self.calculator.as_ref()
    }

    pub fn k_policy(&self) -> &KFactorPolicy {
        &self.k_policy
    }

    /// Apply one match to the store and write its audit fields.
    ///
    /// Fails with [`LeagueError::PlayerNotFound`] without touching the store
    /// when any participant is not enrolled.
    pub fn apply_match(
        &self,
        store: &mut PlayerAggregateStore,
        game: &mut Match,
    ) -> Result<MatchAudit> {
        let audit = match self.price_match(store, game) {
            Ok(audit) => audit,
            Err(err) => {
                if let Some(metrics) = &self.metrics {
                    let kind = err
                        .downcast_ref::<LeagueError>()
                        .map_or("unknown", LeagueError::kind);
                    metrics.record_match_rejected(kind);
                }
                warn!("Rejected match {}: {}", game.id, err);
                return Err(err);
            }
        };

        for side in [Side::A, Side::B] {
            let team = *game.team(side);
            let opponents = game.team(side.opposite()).members();
            let (goals_for, goals_against) = game.goals(side);
            let delta = audit.delta_for(side);

            for (player_id, teammate_id, role) in [
                (team.defender, team.attacker, Role::Defender),
                (team.attacker, team.defender, Role::Attacker),
            ] {
                store.apply_match(&MatchContribution {
                    player_id,
                    teammate_id,
                    opponent_ids: opponents,
                    delta,
                    role,
                    goals_for,
                    goals_against,
                })?;
            }
        }

        game.audit = Some(audit);

        if let Some(metrics) = &self.metrics {
            metrics.record_match_applied(&audit);
        }
        debug!(
            match_id = %game.id,
            score_a = game.score.0,
            score_b = game.score.1,
            delta_a = audit.deltas.0,
            delta_b = audit.deltas.1,
            "Applied match"
        );

        Ok(audit)
    }

    /// Compute the audit for `game` from the current store without mutating it
    pub fn price_match(&self, store: &PlayerAggregateStore, game: &Match) -> Result<MatchAudit> {
        let lookup = |player_id: PlayerId| -> Result<(f64, u32)> {
            let player = store
                .get_by_id(player_id)
                .ok_or(LeagueError::PlayerNotFound { player_id })?;
            Ok((player.rating, player.matches_played))
        };

        let (a_def_rating, a_def_matches) = lookup(game.team_a.defender)?;
        let (a_att_rating, a_att_matches) = lookup(game.team_a.attacker)?;
        let (b_def_rating, b_def_matches) = lookup(game.team_b.defender)?;
        let (b_att_rating, b_att_matches) = lookup(game.team_b.attacker)?;

        let team_ratings = (
            (a_def_rating + a_att_rating) / 2.0,
            (b_def_rating + b_att_rating) / 2.0,
        );
        let k_factors = (
            self.k_policy.team_k(a_def_matches, a_att_matches),
            self.k_policy.team_k(b_def_matches, b_att_matches),
        );

        let priced = self.calculator.compute_delta(&DeltaInput {
            team_ratings,
            score: game.score,
            k_factors,
        });

        Ok(MatchAudit {
            team_ratings,
            expected_scores: priced.expected_scores,
            k_factors,
            deltas: priced.deltas,
        })
    }

    /// Apply `matches` in the order given.
    ///
    /// Matches are expected in nondecreasing creation time; a regression is
    /// logged but the input is not reordered.
    pub fn replay(
        &self,
        store: &mut PlayerAggregateStore,
        matches: &mut [Match],
        policy: ReplayPolicy,
    ) -> Result<ReplayReport> {
        let mut report = ReplayReport::default();
        let mut previous: Option<DateTime<Utc>> = None;

        for game in matches.iter_mut() {
            if let Some(prev) = previous {
                if game.created_at < prev {
                    warn!(
                        "Match {} created at {} precedes the previous match ({})",
                        game.id, game.created_at, prev
                    );
                }
            }
            previous = Some(game.created_at);

            match self.apply_match(store, game) {
                Ok(_) => report.applied += 1,
                Err(err) => match policy {
                    ReplayPolicy::Abort => {
                        return Err(err.context(format!("Replay aborted at match {}", game.id)));
                    }
                    ReplayPolicy::SkipFailed => report.skipped.push(SkippedMatch {
                        match_id: game.id.clone(),
                        reason: err.to_string(),
                    }),
                },
            }
        }

        info!(
            applied = report.applied,
            skipped = report.skipped.len(),
            "Replay complete"
        );

        Ok(report)
    }
}
