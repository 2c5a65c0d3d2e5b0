//! Metrics and monitoring for the league engine
//!
//! This module provides Prometheus metrics for match processing and
//! leaderboard maintenance.

pub mod collector;

pub use collector::EngineMetrics;
