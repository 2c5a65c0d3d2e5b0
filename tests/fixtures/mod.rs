//! Test fixtures for integration testing
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use foosball_league::config::{AppConfig, KFactorConfig};
use foosball_league::league::LeagueEngine;
use foosball_league::types::{LeagueSnapshot, Match, PlayerId, PlayerRegistration, Team};

/// Small league used across the integration suite
pub const ROSTER: [(PlayerId, &str); 6] = [
    (1, "Alex Moreau"),
    (2, "Bea Lindqvist"),
    (3, "Chidi Okafor"),
    (4, "Dana Kowalski"),
    (5, "Eli Navarro"),
    (6, "Alexis Brandt"),
];

pub fn roster() -> Vec<PlayerRegistration> {
    ROSTER
        .iter()
        .map(|&(id, name)| PlayerRegistration::new(id, name))
        .collect()
}

/// Config with a constant K of 30, which keeps expected deltas easy to check
pub fn flat_k_config() -> AppConfig {
    AppConfig {
        k_factor: KFactorConfig::flat(30.0),
        ..AppConfig::default()
    }
}

pub fn engine_with(config: &AppConfig) -> LeagueEngine {
    let mut engine = LeagueEngine::new(config).unwrap();
    engine.enroll_all(&roster()).unwrap();
    engine
}

pub fn season_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 17, 30, 0).unwrap()
}

/// Builds matches with creation times a few minutes apart
pub struct MatchBuilder {
    next_at: DateTime<Utc>,
}

impl MatchBuilder {
    pub fn new() -> Self {
        Self {
            next_at: season_start(),
        }
    }

    /// `a` and `b` are (defender, attacker)
    pub fn game(
        &mut self,
        a: (PlayerId, PlayerId),
        b: (PlayerId, PlayerId),
        score: (u32, u32),
    ) -> Match {
        let m = Match::at(Team::new(a.0, a.1), Team::new(b.0, b.1), score, self.next_at);
        self.next_at += Duration::minutes(7);
        m
    }
}

/// A week of lunchtime matches between the roster
pub fn sample_season() -> Vec<Match> {
    let mut builder = MatchBuilder::new();
    vec![
        builder.game((1, 2), (3, 4), (8, 5)),
        builder.game((5, 6), (1, 3), (6, 8)),
        builder.game((2, 4), (5, 6), (8, 8)),
        builder.game((3, 1), (2, 5), (10, 4)),
        builder.game((4, 6), (1, 2), (3, 8)),
        builder.game((1, 5), (3, 2), (8, 7)),
        builder.game((6, 3), (4, 5), (8, 2)),
        builder.game((2, 1), (6, 4), (5, 8)),
    ]
}

pub fn snapshot_json() -> &'static str {
    include_str!("league_snapshot.json")
}

pub fn load_snapshot() -> LeagueSnapshot {
    serde_json::from_str(snapshot_json()).unwrap()
}
