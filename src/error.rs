//! Error types for the league engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. Callers that need to branch on a specific failure
//! recover the typed variant with `downcast_ref::<LeagueError>()`.

use crate::types::PlayerId;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific league scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LeagueError {
    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: PlayerId },

    #[error("Player already enrolled: {player_id}")]
    DuplicatePlayer { player_id: PlayerId },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl LeagueError {
    /// Short machine-friendly label, used as a metrics label value
    pub fn kind(&self) -> &'static str {
        match self {
            LeagueError::PlayerNotFound { .. } => "player_not_found",
            LeagueError::DuplicatePlayer { .. } => "duplicate_player",
            LeagueError::ConfigurationError { .. } => "configuration",
        }
    }
}
