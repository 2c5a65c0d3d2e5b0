//! Tie-aware leaderboard ranking
//!
//! Players are ordered by rating and compared on their rounded display rating.
//! Equal display ratings share a rank and the next distinct rating resumes at
//! its position, so 1050, 1050, 1020 rank as 1, 1, 3.

use crate::config::RankingConfig;
use crate::league::store::Player;
use crate::types::PlayerId;
use crate::utils::display_rating;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub player_id: PlayerId,
    pub display_rating: i64,
    pub rank: u32,
    /// Size of the group sharing this rank, 1 when untied
    pub tie_size: u32,
}

impl RankEntry {
    /// Last position covered by this rank's tie group
    pub fn last_position(&self) -> u32 {
        self.rank + self.tie_size - 1
    }
}

/// Leaderboard in rank order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankTable {
    entries: Vec<RankEntry>,
    #[serde(skip)]
    positions: HashMap<PlayerId, usize>,
}

impl RankTable {
    fn new(entries: Vec<RankEntry>) -> Self {
        let positions = entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| (entry.player_id, pos))
            .collect();
        Self { entries, positions }
    }

    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    pub fn entry(&self, player_id: PlayerId) -> Option<&RankEntry> {
        self.positions.get(&player_id).map(|&pos| &self.entries[pos])
    }

    /// Rank of `player_id`, `None` when they are not on the board
    pub fn rank_of(&self, player_id: PlayerId) -> Option<u32> {
        self.entry(player_id).map(|entry| entry.rank)
    }

    /// First and last position shared by the player's tie group
    pub fn rank_span(&self, player_id: PlayerId) -> Option<(u32, u32)> {
        self.entry(player_id)
            .map(|entry| (entry.rank, entry.last_position()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Computes the leaderboard from the current player state
#[derive(Debug, Clone, Default)]
pub struct RankingComputer {
    config: RankingConfig,
}

impl RankingComputer {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn compute_ranks<'a, I>(&self, players: I) -> RankTable
    where
        I: IntoIterator<Item = &'a Player>,
    {
        let mut ranked: Vec<&Player> = players
            .into_iter()
            .filter(|p| p.matches_played >= self.config.min_matches)
            .collect();

        ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating).then(a.id.cmp(&b.id)));

        let mut entries: Vec<RankEntry> = Vec::with_capacity(ranked.len());
        let mut rank = 0;
        let mut previous = None;

        for (pos, player) in ranked.iter().enumerate() {
            let shown = display_rating(player.rating);
            if previous != Some(shown) {
                rank = pos as u32 + 1;
                previous = Some(shown);
            }
            entries.push(RankEntry {
                player_id: player.id,
                display_rating: shown,
                rank,
                tie_size: 1,
            });
        }

        let mut start = 0;
        while start < entries.len() {
            let group_rank = entries[start].rank;
            let end = entries[start..]
                .iter()
                .position(|entry| entry.rank != group_rank)
                .map_or(entries.len(), |offset| start + offset);

            let tie_size = (end - start) as u32;
            for entry in &mut entries[start..end] {
                entry.tie_size = tie_size;
            }
            start = end;
        }

        RankTable::new(entries)
    }
}
