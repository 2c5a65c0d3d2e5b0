//! Read-only analytics over players and the match history

pub mod form;
pub mod projector;

pub use form::{recent_matches, FormMark, RecentForm, RolePreference};
pub use projector::{
    CounterpartSummary, MatchHighlight, PlayerStats, RatingTrajectory, RoleRecord,
    StatsProjector,
};
