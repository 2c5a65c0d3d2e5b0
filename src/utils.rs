//! Utility functions for the league engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique match ID
pub fn generate_match_id() -> String {
    Uuid::new_v4().to_string()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Rating as shown on the leaderboard; ties are decided on this value
pub fn display_rating(rating: f64) -> i64 {
    rating.round() as i64
}

/// Normalize a full name for exact lookups: trimmed, lowercased,
/// inner whitespace collapsed to single spaces
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
