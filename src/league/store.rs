//! Player aggregate store
//!
//! The store is the single owner of per-player mutable state: rating, counters,
//! delta history and teammate/opponent aggregates. It is created once by the
//! caller and passed by reference; nothing outside this module mutates a
//! `Player` directly.

use crate::error::{LeagueError, Result};
use crate::league::ranking::RankTable;
use crate::types::{PlayerId, PlayerRegistration, Role};
use crate::utils::normalize_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shared history with one counterpart
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterpartRecord {
    /// Sum of the owning player's deltas across shared matches
    pub net_delta: f64,
    pub matches: u32,
}

impl CounterpartRecord {
    fn add(&mut self, delta: f64) {
        self.net_delta += delta;
        self.matches += 1;
    }
}

/// How two players met in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    Teammate,
    Opponent,
}

/// One player's share of a processed match, as handed to the store mutator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchContribution {
    pub player_id: PlayerId,
    pub teammate_id: PlayerId,
    pub opponent_ids: [PlayerId; 2],
    /// Signed delta of the player's team
    pub delta: f64,
    pub role: Role,
    pub goals_for: u32,
    pub goals_against: u32,
}

/// Per-player cumulative state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub defense_preference: f64,
    /// Rating at enrollment
    pub initial_rating: f64,
    pub rating: f64,
    pub best_rating: f64,
    pub matches_played: u32,
    /// Matches with a positive delta
    pub wins: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub matches_as_attacker: u32,
    pub matches_as_defender: u32,
    /// Signed delta of every processed match, oldest first
    pub match_deltas: Vec<f64>,
    /// Only holds counterparts with a smaller id than this player
    pub teammates: HashMap<PlayerId, CounterpartRecord>,
    /// Only holds counterparts with a smaller id than this player
    pub opponents: HashMap<PlayerId, CounterpartRecord>,
    /// Last computed rank; meaningful only while the store's ranks are fresh
    pub rank: Option<u32>,
}

impl Player {
    fn enroll(registration: &PlayerRegistration, default_rating: f64) -> Self {
        let rating = registration.initial_rating.unwrap_or(default_rating);
        Self {
            id: registration.id,
            name: registration.name.clone(),
            defense_preference: registration.defense_preference,
            initial_rating: rating,
            rating,
            best_rating: rating,
            matches_played: 0,
            wins: 0,
            goals_for: 0,
            goals_against: 0,
            matches_as_attacker: 0,
            matches_as_defender: 0,
            match_deltas: Vec::new(),
            teammates: HashMap::new(),
            opponents: HashMap::new(),
            rank: None,
        }
    }

    /// Matches without a positive delta
    pub fn losses(&self) -> u32 {
        self.matches_played - self.wins
    }

    pub fn win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            return 0.0;
        }
        self.wins as f64 / self.matches_played as f64
    }

    pub fn counterparts(&self, relation: Relation) -> &HashMap<PlayerId, CounterpartRecord> {
        match relation {
            Relation::Teammate => &self.teammates,
            Relation::Opponent => &self.opponents,
        }
    }

    fn record_match(&mut self, contribution: &MatchContribution) {
        let delta = contribution.delta;

        self.rating += delta;
        self.best_rating = self.best_rating.max(self.rating);
        self.matches_played += 1;
        if delta > 0.0 {
            self.wins += 1;
        }
        self.goals_for += contribution.goals_for;
        self.goals_against += contribution.goals_against;
        match contribution.role {
            Role::Defender => self.matches_as_defender += 1,
            Role::Attacker => self.matches_as_attacker += 1,
        }
        self.match_deltas.push(delta);

        // Each pair is recorded once, on the larger id's side
        if self.id > contribution.teammate_id {
            self.teammates
                .entry(contribution.teammate_id)
                .or_default()
                .add(delta);
        }
        for opponent_id in contribution.opponent_ids {
            if self.id > opponent_id {
                self.opponents.entry(opponent_id).or_default().add(delta);
            }
        }
    }

    fn reset(&mut self) {
        let registration = PlayerRegistration {
            id: self.id,
            name: self.name.clone(),
            initial_rating: Some(self.initial_rating),
            defense_preference: self.defense_preference,
        };
        *self = Player::enroll(&registration, self.initial_rating);
    }
}

/// Owner of all enrolled players and the cached rank table
#[derive(Debug, Clone)]
pub struct PlayerAggregateStore {
    /// Enrollment order
    players: Vec<Player>,
    index: HashMap<PlayerId, usize>,
    /// Normalized full name to the first player enrolled under it
    name_index: HashMap<String, PlayerId>,
    default_rating: f64,
    rank_table: RankTable,
    ranks_stale: bool,
}

impl PlayerAggregateStore {
    /// Create an empty store; players enrolled without a rating get `default_rating`
    pub fn new(default_rating: f64) -> Self {
        Self {
            players: Vec::new(),
            index: HashMap::new(),
            name_index: HashMap::new(),
            default_rating,
            rank_table: RankTable::default(),
            ranks_stale: true,
        }
    }

    /// Enroll a player from the registry
    pub fn enroll(&mut self, registration: &PlayerRegistration) -> Result<()> {
        if self.index.contains_key(&registration.id) {
            return Err(LeagueError::DuplicatePlayer {
                player_id: registration.id,
            }
            .into());
        }

        let player = Player::enroll(registration, self.default_rating);
        self.name_index
            .entry(normalize_name(&player.name))
            .or_insert(player.id);
        self.index.insert(player.id, self.players.len());
        self.players.push(player);
        self.ranks_stale = true;

        Ok(())
    }

    pub fn get_by_id(&self, player_id: PlayerId) -> Option<&Player> {
        self.index.get(&player_id).map(|&idx| &self.players[idx])
    }

    /// First player, in enrollment order, whose name contains `fragment`.
    ///
    /// This is not a unique lookup: with several matching names the earliest
    /// enrolled wins. Use [`get_by_full_name`](Self::get_by_full_name) for exact
    /// matches.
    pub fn get_by_name(&self, fragment: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name.contains(fragment))
    }

    /// Exact lookup by full name, ignoring case and surrounding or repeated
    /// whitespace. Duplicate names resolve to the first enrolled player.
    pub fn get_by_full_name(&self, name: &str) -> Option<&Player> {
        self.name_index
            .get(&normalize_name(name))
            .and_then(|&id| self.get_by_id(id))
    }

    /// All players in enrollment order
    pub fn get_all(&self) -> &[Player] {
        &self.players
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.index.contains_key(&player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Apply one player's share of a processed match
    pub fn apply_match(&mut self, contribution: &MatchContribution) -> Result<()> {
        let idx = *self
            .index
            .get(&contribution.player_id)
            .ok_or(LeagueError::PlayerNotFound {
                player_id: contribution.player_id,
            })?;

        self.players[idx].record_match(contribution);
        self.ranks_stale = true;

        Ok(())
    }

    /// The single record of `a` and `b`'s shared history, kept on the larger
    /// id. The net delta is from that player's perspective.
    pub fn shared_history(
        &self,
        a: PlayerId,
        b: PlayerId,
        relation: Relation,
    ) -> Option<&CounterpartRecord> {
        let (owner, other) = if a > b { (a, b) } else { (b, a) };
        self.get_by_id(owner)?.counterparts(relation).get(&other)
    }

    pub fn ranks_stale(&self) -> bool {
        self.ranks_stale
    }

    /// Cached rank table; only current while [`ranks_stale`](Self::ranks_stale) is false
    pub fn rank_table(&self) -> &RankTable {
        &self.rank_table
    }

    /// Store a freshly computed rank table and clear the staleness flag
    pub fn install_ranks(&mut self, table: RankTable) {
        for player in &mut self.players {
            player.rank = table.rank_of(player.id);
        }
        self.rank_table = table;
        self.ranks_stale = false;
    }

    /// Restore every player to their enrollment state.
    ///
    /// Intended for tests and for re-replaying a full history from scratch.
    pub fn reset(&mut self) {
        for player in &mut self.players {
            player.reset();
        }
        self.rank_table = RankTable::default();
        self.ranks_stale = true;
    }
}

impl Default for PlayerAggregateStore {
    fn default() -> Self {
        Self::new(crate::config::RatingConfig::default().default_rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::test_support::store_fixture;

    fn contribution(player_id: PlayerId, teammate_id: PlayerId, delta: f64) -> MatchContribution {
        MatchContribution {
            player_id,
            teammate_id,
            opponent_ids: [10, 11],
            delta,
            role: Role::Defender,
            goals_for: 8,
            goals_against: 4,
        }
    }

    #[test]
    fn test_enroll_uses_default_or_registered_rating() {
        let mut store = PlayerAggregateStore::new(1000.0);
        store.enroll(&PlayerRegistration::new(1, "Ada")).unwrap();
        store
            .enroll(&PlayerRegistration::new(2, "Bea").with_rating(1200.0))
            .unwrap();

        assert_eq!(store.get_by_id(1).unwrap().rating, 1000.0);
        assert_eq!(store.get_by_id(2).unwrap().rating, 1200.0);
        assert_eq!(store.get_by_id(2).unwrap().best_rating, 1200.0);
        assert!(store.get_by_id(1).unwrap().teammates.is_empty());
        assert!(store.get_by_id(1).unwrap().opponents.is_empty());
    }

    #[test]
    fn test_duplicate_enrollment_rejected() {
        let mut store = store_fixture(&[1]);
        let err = store.enroll(&PlayerRegistration::new(1, "Again")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LeagueError>(),
            Some(&LeagueError::DuplicatePlayer { player_id: 1 })
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_apply_match_updates_counters() {
        let mut store = store_fixture(&[1, 2]);
        store.apply_match(&contribution(2, 1, 12.5)).unwrap();

        let player = store.get_by_id(2).unwrap();
        assert_eq!(player.rating, 1012.5);
        assert_eq!(player.best_rating, 1012.5);
        assert_eq!(player.matches_played, 1);
        assert_eq!(player.wins, 1);
        assert_eq!(player.goals_for, 8);
        assert_eq!(player.goals_against, 4);
        assert_eq!(player.matches_as_defender, 1);
        assert_eq!(player.matches_as_attacker, 0);
        assert_eq!(player.match_deltas, vec![12.5]);
    }

    #[test]
    fn test_negative_delta_is_not_a_win_and_keeps_best() {
        let mut store = store_fixture(&[1, 2]);
        store.apply_match(&contribution(2, 1, -7.0)).unwrap();

        let player = store.get_by_id(2).unwrap();
        assert_eq!(player.rating, 993.0);
        assert_eq!(player.best_rating, 1000.0);
        assert_eq!(player.wins, 0);
        assert_eq!(player.losses(), 1);
    }

    #[test]
    fn test_counterparts_recorded_on_larger_id_only() {
        let mut store = store_fixture(&[1, 2, 10, 11]);
        store.apply_match(&contribution(2, 1, 5.0)).unwrap();
        store.apply_match(&contribution(1, 2, 5.0)).unwrap();

        let larger = store.get_by_id(2).unwrap();
        let smaller = store.get_by_id(1).unwrap();
        assert_eq!(larger.teammates.get(&1).unwrap().matches, 1);
        assert!(smaller.teammates.is_empty());
        // Opponents 10 and 11 are larger than both players
        assert!(larger.opponents.is_empty());
        assert!(smaller.opponents.is_empty());

        let shared = store.shared_history(1, 2, Relation::Teammate).unwrap();
        assert_eq!(shared.matches, 1);
        assert_eq!(shared.net_delta, 5.0);
        assert_eq!(store.shared_history(2, 1, Relation::Teammate), Some(shared));
    }

    #[test]
    fn test_opponent_records_for_larger_acting_player() {
        let mut store = store_fixture(&[1, 2, 10, 11, 20]);
        let mut c = contribution(20, 1, -3.0);
        c.opponent_ids = [10, 11];
        store.apply_match(&c).unwrap();

        let player = store.get_by_id(20).unwrap();
        assert_eq!(player.opponents.len(), 2);
        assert_eq!(player.opponents[&10].net_delta, -3.0);
        assert!(store.shared_history(10, 20, Relation::Opponent).is_some());
    }

    #[test]
    fn test_unknown_player_rejected() {
        let mut store = store_fixture(&[1]);
        let err = store.apply_match(&contribution(5, 1, 1.0)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LeagueError>(),
            Some(&LeagueError::PlayerNotFound { player_id: 5 })
        );
    }

    #[test]
    fn test_name_lookups() {
        let mut store = PlayerAggregateStore::new(1000.0);
        store.enroll(&PlayerRegistration::new(1, "Mario Rossi")).unwrap();
        store.enroll(&PlayerRegistration::new(2, "Maria Rossi")).unwrap();
        store.enroll(&PlayerRegistration::new(3, "mario rossi")).unwrap();

        // Substring lookup returns the earliest enrolled match
        assert_eq!(store.get_by_name("Rossi").unwrap().id, 1);
        assert_eq!(store.get_by_name("Maria").unwrap().id, 2);
        assert!(store.get_by_name("Verdi").is_none());

        assert_eq!(store.get_by_full_name("  MARIO   rossi ").unwrap().id, 1);
        assert_eq!(store.get_by_full_name("maria rossi").unwrap().id, 2);
        assert!(store.get_by_full_name("Mario").is_none());
    }

    #[test]
    fn test_staleness_flag() {
        let mut store = store_fixture(&[1, 2]);
        assert!(store.ranks_stale());

        store.install_ranks(RankTable::default());
        assert!(!store.ranks_stale());

        store.apply_match(&contribution(2, 1, 1.0)).unwrap();
        assert!(store.ranks_stale());
    }

    #[test]
    fn test_reset_restores_enrollment_state() {
        let mut store = PlayerAggregateStore::new(1000.0);
        store
            .enroll(&PlayerRegistration::new(4, "Dora").with_rating(1100.0))
            .unwrap();
        store.enroll(&PlayerRegistration::new(1, "Ada")).unwrap();
        store.apply_match(&contribution(4, 1, 20.0)).unwrap();

        store.reset();

        let player = store.get_by_id(4).unwrap();
        assert_eq!(player.rating, 1100.0);
        assert_eq!(player.best_rating, 1100.0);
        assert_eq!(player.matches_played, 0);
        assert!(player.match_deltas.is_empty());
        assert!(player.teammates.is_empty());
        assert!(store.ranks_stale());
    }
}
