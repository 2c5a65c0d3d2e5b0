//! League state and match processing
//!
//! This module owns the player aggregates and applies finished matches to them.
//! It includes:
//! - Player store with the cached leaderboard
//! - Match processor and batch replay
//! - Tie-aware ranking
//! - The [`LeagueEngine`] facade

pub mod engine;
pub mod processor;
pub mod ranking;
pub mod store;

pub use engine::LeagueEngine;
pub use processor::{MatchProcessor, ReplayPolicy, ReplayReport, SkippedMatch};
pub use ranking::{RankEntry, RankTable, RankingComputer};
pub use store::{CounterpartRecord, MatchContribution, Player, PlayerAggregateStore, Relation};
