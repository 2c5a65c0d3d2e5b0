//! League engine
//!
//! Single entry point tying the player store, match processor, leaderboard and
//! analytics together. Ranks are recomputed lazily: any mutation marks them
//! stale and the next rank read rebuilds the table.

use crate::config::{AppConfig, StatsConfig};
use crate::error::{LeagueError, Result};
use crate::league::processor::{MatchProcessor, ReplayPolicy, ReplayReport};
use crate::league::ranking::{RankTable, RankingComputer};
use crate::league::store::{Player, PlayerAggregateStore};
use crate::metrics::EngineMetrics;
use crate::stats::{PlayerStats, RecentForm, RolePreference, StatsProjector};
use crate::types::{Match, MatchAudit, PlayerId, PlayerRegistration};
use std::sync::Arc;
use tracing::{debug, info};

pub struct LeagueEngine {
    store: PlayerAggregateStore,
    processor: MatchProcessor,
    ranking: RankingComputer,
    stats_config: StatsConfig,
    metrics: Option<Arc<EngineMetrics>>,
}

impl LeagueEngine {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let processor = MatchProcessor::from_config(&config.rating, &config.k_factor)?;
        Ok(Self::with_processor(config, processor))
    }

    /// Build an engine around a caller-supplied processor. Players enrolled
    /// without a rating start at the calculator's initial rating.
    pub fn with_processor(config: &AppConfig, processor: MatchProcessor) -> Self {
        Self {
            store: PlayerAggregateStore::new(processor.calculator().initial_rating()),
            processor,
            ranking: RankingComputer::new(config.ranking.clone()),
            stats_config: config.stats.clone(),
            metrics: None,
        }
    }

    /// Attach a metrics collector to the engine and its processor
    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        metrics.set_players_enrolled(self.store.len());
        self.processor = self.processor.with_metrics(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    pub fn enroll_player(&mut self, registration: &PlayerRegistration) -> Result<()> {
        self.store.enroll(registration)?;
        if let Some(metrics) = &self.metrics {
            metrics.set_players_enrolled(self.store.len());
        }
        debug!(player_id = registration.id, name = %registration.name, "Enrolled player");
        Ok(())
    }

    /// Enroll every registration, stopping at the first duplicate
    pub fn enroll_all<'a, I>(&mut self, registrations: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a PlayerRegistration>,
    {
        for registration in registrations {
            self.enroll_player(registration)?;
        }
        info!(players = self.store.len(), "Player registry loaded");
        Ok(())
    }

    /// Apply one finished match. See [`MatchProcessor::apply_match`].
    pub fn apply_match(&mut self, game: &mut Match) -> Result<MatchAudit> {
        self.processor.apply_match(&mut self.store, game)
    }

    /// Apply a batch of matches in the given order
    pub fn replay(&mut self, matches: &mut [Match], policy: ReplayPolicy) -> Result<ReplayReport> {
        self.processor.replay(&mut self.store, matches, policy)
    }

    pub fn get_player_by_id(&self, player_id: PlayerId) -> Option<&Player> {
        self.store.get_by_id(player_id)
    }

    /// Substring lookup, first enrolled match wins
    pub fn get_player_by_name(&self, fragment: &str) -> Option<&Player> {
        self.store.get_by_name(fragment)
    }

    pub fn get_player_by_full_name(&self, name: &str) -> Option<&Player> {
        self.store.get_by_full_name(name)
    }

    pub fn get_all_players(&self) -> &[Player] {
        self.store.get_all()
    }

    /// Current rank of `player_id`, `None` if they are below the match minimum
    pub fn get_rank(&mut self, player_id: PlayerId) -> Result<Option<u32>> {
        if !self.store.contains(player_id) {
            return Err(LeagueError::PlayerNotFound { player_id }.into());
        }
        self.refresh_ranks();
        Ok(self.store.rank_table().rank_of(player_id))
    }

    /// Up-to-date leaderboard
    pub fn rank_table(&mut self) -> &RankTable {
        self.refresh_ranks();
        self.store.rank_table()
    }

    fn refresh_ranks(&mut self) {
        if !self.store.ranks_stale() {
            return;
        }

        let table = self.ranking.compute_ranks(self.store.get_all());
        debug!(ranked = table.len(), players = self.store.len(), "Recomputed ranks");
        self.store.install_ranks(table);

        if let Some(metrics) = &self.metrics {
            metrics.record_rank_recomputation();
        }
    }

    /// Analytics for `player_id` over `history`, which the caller owns
    pub fn get_player_stats(&self, player_id: PlayerId, history: &[Match]) -> Result<PlayerStats> {
        let player = self
            .store
            .get_by_id(player_id)
            .ok_or(LeagueError::PlayerNotFound { player_id })?;
        Ok(StatsProjector::project(
            history,
            player_id,
            Some(player.initial_rating),
        ))
    }

    pub fn recent_form(&self, player_id: PlayerId) -> Result<RecentForm> {
        let player = self
            .store
            .get_by_id(player_id)
            .ok_or(LeagueError::PlayerNotFound { player_id })?;
        Ok(RecentForm::from_deltas(
            &player.match_deltas,
            self.stats_config.recent_form_window,
        ))
    }

    pub fn role_preference(&self, player_id: PlayerId) -> Result<RolePreference> {
        let player = self
            .store
            .get_by_id(player_id)
            .ok_or(LeagueError::PlayerNotFound { player_id })?;
        Ok(RolePreference::classify(
            player,
            self.stats_config.role_preference_threshold,
        ))
    }

    pub fn store(&self) -> &PlayerAggregateStore {
        &self.store
    }

    pub fn processor(&self) -> &MatchProcessor {
        &self.processor
    }

    /// Return every player to their enrollment state, keeping the registry
    pub fn reset(&mut self) {
        self.store.reset();
        info!("League state reset");
    }
}
