//! Common types used throughout the league engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for players. Ordering is numeric and drives the
/// counterpart bookkeeping tie-break.
pub type PlayerId = u32;

/// Unique identifier for matches
pub type MatchId = String;

/// Position a player holds for the whole of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Defender,
    Attacker,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Defender => write!(f, "defender"),
            Role::Attacker => write!(f, "attacker"),
        }
    }
}

/// Which of the two teams of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Result of a match from one side's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    Win,
    Draw,
    Loss,
}

impl MatchOutcome {
    /// Outcome decided by the literal score
    pub fn from_goals(goals_for: u32, goals_against: u32) -> Self {
        match goals_for.cmp(&goals_against) {
            std::cmp::Ordering::Greater => MatchOutcome::Win,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
            std::cmp::Ordering::Less => MatchOutcome::Loss,
        }
    }

    /// Elo "actual score": 1 for a win, 0.5 for a draw, 0 for a loss
    pub fn actual_score(self) -> f64 {
        match self {
            MatchOutcome::Win => 1.0,
            MatchOutcome::Draw => 0.5,
            MatchOutcome::Loss => 0.0,
        }
    }
}

/// A two-player team with fixed roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team {
    pub defender: PlayerId,
    pub attacker: PlayerId,
}

impl Team {
    pub fn new(defender: PlayerId, attacker: PlayerId) -> Self {
        Self { defender, attacker }
    }

    pub fn members(&self) -> [PlayerId; 2] {
        [self.defender, self.attacker]
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.defender == player_id || self.attacker == player_id
    }

    /// Role held by `player_id`, if they are on this team
    pub fn role_of(&self, player_id: PlayerId) -> Option<Role> {
        if self.defender == player_id {
            Some(Role::Defender)
        } else if self.attacker == player_id {
            Some(Role::Attacker)
        } else {
            None
        }
    }

    /// The other member of the team
    pub fn partner_of(&self, player_id: PlayerId) -> Option<PlayerId> {
        match self.role_of(player_id)? {
            Role::Defender => Some(self.attacker),
            Role::Attacker => Some(self.defender),
        }
    }
}

/// Derived fields written onto a match when it is applied.
/// Each pair is ordered (team A, team B).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchAudit {
    /// Team ratings before the match (mean of both members)
    pub team_ratings: (f64, f64),
    pub expected_scores: (f64, f64),
    pub k_factors: (f64, f64),
    pub deltas: (f64, f64),
}

impl MatchAudit {
    pub fn delta_for(&self, side: Side) -> f64 {
        match side {
            Side::A => self.deltas.0,
            Side::B => self.deltas.1,
        }
    }
}

/// A finalized match as handed in by the booking flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub team_a: Team,
    pub team_b: Team,
    /// Final score as (team A goals, team B goals)
    pub score: (u32, u32),
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<MatchAudit>,
}

impl Match {
    /// Create a match with a fresh id, stamped now
    pub fn new(team_a: Team, team_b: Team, score: (u32, u32)) -> Self {
        Self::at(team_a, team_b, score, crate::utils::current_timestamp())
    }

    /// Create a match with a fresh id and an explicit creation time
    pub fn at(team_a: Team, team_b: Team, score: (u32, u32), created_at: DateTime<Utc>) -> Self {
        Self {
            id: crate::utils::generate_match_id(),
            team_a,
            team_b,
            score,
            created_at,
            audit: None,
        }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        }
    }

    /// Side `player_id` played on, if they took part
    pub fn side_of(&self, player_id: PlayerId) -> Option<Side> {
        if self.team_a.contains(player_id) {
            Some(Side::A)
        } else if self.team_b.contains(player_id) {
            Some(Side::B)
        } else {
            None
        }
    }

    /// Goals scored and conceded by `side`
    pub fn goals(&self, side: Side) -> (u32, u32) {
        match side {
            Side::A => (self.score.0, self.score.1),
            Side::B => (self.score.1, self.score.0),
        }
    }

    /// All four participants: team A defender, attacker, then team B
    pub fn participants(&self) -> [PlayerId; 4] {
        [
            self.team_a.defender,
            self.team_a.attacker,
            self.team_b.defender,
            self.team_b.attacker,
        ]
    }
}

/// Player registry entry consumed at enrollment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRegistration {
    pub id: PlayerId,
    pub name: String,
    /// Falls back to the configured default rating when absent
    #[serde(default)]
    pub initial_rating: Option<f64>,
    /// Declared share of matches the player would like to spend in defence
    #[serde(default = "default_defense_preference")]
    pub defense_preference: f64,
}

fn default_defense_preference() -> f64 {
    0.5
}

impl PlayerRegistration {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            initial_rating: None,
            defense_preference: default_defense_preference(),
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.initial_rating = Some(rating);
        self
    }
}

/// Players and match history as exported by the persistence layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub players: Vec<PlayerRegistration>,
    #[serde(default)]
    pub matches: Vec<Match>,
}
