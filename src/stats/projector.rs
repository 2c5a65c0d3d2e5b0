//! Per-player analytics derived from the match history
//!
//! Everything here is recomputed from scratch on each request. Wins and losses
//! come from the literal score, streaks follow creation order, and rating-based
//! figures only use matches that carry an audit.

use crate::types::{Match, MatchId, MatchOutcome, PlayerId, Role, Side};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Win/draw/loss tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleRecord {
    pub matches: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl RoleRecord {
    fn record(&mut self, outcome: MatchOutcome) {
        self.matches += 1;
        match outcome {
            MatchOutcome::Win => self.wins += 1,
            MatchOutcome::Draw => self.draws += 1,
            MatchOutcome::Loss => self.losses += 1,
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.matches == 0 {
            return 0.0;
        }
        self.wins as f64 / self.matches as f64
    }
}

/// Cumulative rating movement alongside or against one counterpart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CounterpartSummary {
    pub player_id: PlayerId,
    pub net_delta: f64,
    pub matches: u32,
}

/// A single notable match seen from the player's side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchHighlight {
    pub match_id: MatchId,
    pub created_at: DateTime<Utc>,
    pub teammate_id: PlayerId,
    pub opponent_ids: [PlayerId; 2],
    pub goals_for: u32,
    pub goals_against: u32,
    /// Rating change, when the match has been applied
    pub delta: Option<f64>,
}

impl MatchHighlight {
    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }
}

/// Extremes of the rating reconstructed from the enrollment rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingTrajectory {
    pub peak: f64,
    pub low: f64,
    pub current: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub overall: RoleRecord,
    pub as_attacker: RoleRecord,
    pub as_defender: RoleRecord,
    pub win_rate: f64,
    pub longest_win_streak: u32,
    pub longest_loss_streak: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub avg_goals_for: f64,
    pub avg_goals_against: f64,
    pub best_teammate: Option<CounterpartSummary>,
    pub worst_teammate: Option<CounterpartSummary>,
    pub best_opponent: Option<CounterpartSummary>,
    pub worst_opponent: Option<CounterpartSummary>,
    pub best_victory_by_rating: Option<MatchHighlight>,
    pub worst_defeat_by_rating: Option<MatchHighlight>,
    pub best_victory_by_score: Option<MatchHighlight>,
    pub worst_defeat_by_score: Option<MatchHighlight>,
    pub rating_trajectory: Option<RatingTrajectory>,
}

impl PlayerStats {
    fn empty(player_id: PlayerId) -> Self {
        Self {
            player_id,
            overall: RoleRecord::default(),
            as_attacker: RoleRecord::default(),
            as_defender: RoleRecord::default(),
            win_rate: 0.0,
            longest_win_streak: 0,
            longest_loss_streak: 0,
            goals_for: 0,
            goals_against: 0,
            avg_goals_for: 0.0,
            avg_goals_against: 0.0,
            best_teammate: None,
            worst_teammate: None,
            best_opponent: None,
            worst_opponent: None,
            best_victory_by_rating: None,
            worst_defeat_by_rating: None,
            best_victory_by_score: None,
            worst_defeat_by_score: None,
            rating_trajectory: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatsProjector;

impl StatsProjector {
    /// Project analytics for `player_id` from the full match history.
    ///
    /// `history` may be in any order; it is sorted by creation time here. The
    /// rating trajectory is only filled in when `initial_rating` is given.
    pub fn project(
        history: &[Match],
        player_id: PlayerId,
        initial_rating: Option<f64>,
    ) -> PlayerStats {
        let mut games: Vec<(&Match, Side)> = history
            .iter()
            .filter_map(|m| m.side_of(player_id).map(|side| (m, side)))
            .collect();
        games.sort_by_key(|(m, _)| m.created_at);

        let mut stats = PlayerStats::empty(player_id);
        let mut teammates: BTreeMap<PlayerId, (f64, u32)> = BTreeMap::new();
        let mut opponents: BTreeMap<PlayerId, (f64, u32)> = BTreeMap::new();
        let mut win_run = 0;
        let mut loss_run = 0;
        let mut trajectory = initial_rating.map(|r| RatingTrajectory {
            peak: r,
            low: r,
            current: r,
        });

        for (game, side) in games {
            let team = game.team(side);
            let (Some(role), Some(teammate_id)) =
                (team.role_of(player_id), team.partner_of(player_id))
            else {
                continue;
            };
            let opponent_ids = game.team(side.opposite()).members();
            let (goals_for, goals_against) = game.goals(side);
            let outcome = MatchOutcome::from_goals(goals_for, goals_against);
            let delta = game.audit.map(|audit| audit.delta_for(side));

            stats.overall.record(outcome);
            match role {
                Role::Attacker => stats.as_attacker.record(outcome),
                Role::Defender => stats.as_defender.record(outcome),
            }

            match outcome {
                MatchOutcome::Win => {
                    win_run += 1;
                    loss_run = 0;
                }
                MatchOutcome::Loss => {
                    loss_run += 1;
                    win_run = 0;
                }
                MatchOutcome::Draw => {
                    win_run = 0;
                    loss_run = 0;
                }
            }
            stats.longest_win_streak = stats.longest_win_streak.max(win_run);
            stats.longest_loss_streak = stats.longest_loss_streak.max(loss_run);

            stats.goals_for += goals_for;
            stats.goals_against += goals_against;

            if let Some(delta) = delta {
                accumulate(&mut teammates, teammate_id, delta);
                for opponent_id in opponent_ids {
                    accumulate(&mut opponents, opponent_id, delta);
                }
                if let Some(t) = trajectory.as_mut() {
                    t.current += delta;
                    t.peak = t.peak.max(t.current);
                    t.low = t.low.min(t.current);
                }
            }

            let highlight = MatchHighlight {
                match_id: game.id.clone(),
                created_at: game.created_at,
                teammate_id,
                opponent_ids,
                goals_for,
                goals_against,
                delta,
            };

            match outcome {
                MatchOutcome::Win => {
                    if delta.is_some() {
                        replace_if(&mut stats.best_victory_by_rating, &highlight, |new, cur| {
                            new.delta > cur.delta
                        });
                    }
                    replace_if(&mut stats.best_victory_by_score, &highlight, |new, cur| {
                        new.goal_difference() > cur.goal_difference()
                    });
                }
                MatchOutcome::Loss => {
                    if delta.is_some() {
                        replace_if(&mut stats.worst_defeat_by_rating, &highlight, |new, cur| {
                            new.delta < cur.delta
                        });
                    }
                    replace_if(&mut stats.worst_defeat_by_score, &highlight, |new, cur| {
                        new.goal_difference() < cur.goal_difference()
                    });
                }
                MatchOutcome::Draw => {}
            }
        }

        stats.win_rate = stats.overall.win_rate();
        if stats.overall.matches > 0 {
            let matches = stats.overall.matches as f64;
            stats.avg_goals_for = stats.goals_for as f64 / matches;
            stats.avg_goals_against = stats.goals_against as f64 / matches;
        }

        (stats.best_teammate, stats.worst_teammate) = extremes(&teammates);
        (stats.best_opponent, stats.worst_opponent) = extremes(&opponents);
        stats.rating_trajectory = trajectory;

        stats
    }
}

fn accumulate(map: &mut BTreeMap<PlayerId, (f64, u32)>, player_id: PlayerId, delta: f64) {
    let entry = map.entry(player_id).or_insert((0.0, 0));
    entry.0 += delta;
    entry.1 += 1;
}

/// Store `candidate` when the slot is empty or it beats the current holder.
/// Earlier matches win ties.
fn replace_if<F>(slot: &mut Option<MatchHighlight>, candidate: &MatchHighlight, beats: F)
where
    F: Fn(&MatchHighlight, &MatchHighlight) -> bool,
{
    let replace = match slot {
        None => true,
        Some(current) => beats(candidate, current),
    };
    if replace {
        *slot = Some(candidate.clone());
    }
}

/// Highest and lowest net delta; the lowest id wins ties
fn extremes(
    map: &BTreeMap<PlayerId, (f64, u32)>,
) -> (Option<CounterpartSummary>, Option<CounterpartSummary>) {
    let mut best: Option<CounterpartSummary> = None;
    let mut worst: Option<CounterpartSummary> = None;

    for (&player_id, &(net_delta, matches)) in map {
        let summary = CounterpartSummary {
            player_id,
            net_delta,
            matches,
        };
        if best.map_or(true, |b| net_delta > b.net_delta) {
            best = Some(summary);
        }
        if worst.map_or(true, |w| net_delta < w.net_delta) {
            worst = Some(summary);
        }
    }

    (best, worst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchAudit, Team};
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, day, 18, 0, 0).unwrap()
    }

    fn played(team_a: Team, team_b: Team, score: (u32, u32), day: u32, delta_a: f64) -> Match {
        let mut m = Match::at(team_a, team_b, score, at(day));
        m.audit = Some(MatchAudit {
            team_ratings: (1000.0, 1000.0),
            expected_scores: (0.5, 0.5),
            k_factors: (30.0, 30.0),
            deltas: (delta_a, -delta_a),
        });
        m
    }

    fn history() -> Vec<Match> {
        vec![
            // Player 1 defends with 2 against 3 & 4
            played(Team::new(1, 2), Team::new(3, 4), (8, 2), 1, 20.0),
            played(Team::new(1, 2), Team::new(3, 4), (8, 7), 2, 8.0),
            // Player 1 attacks with 3 against 2 & 4
            played(Team::new(2, 4), Team::new(3, 1), (8, 0), 3, 25.0),
            played(Team::new(2, 4), Team::new(3, 1), (5, 8), 4, -10.0),
            played(Team::new(1, 2), Team::new(3, 4), (6, 8), 5, -9.0),
            played(Team::new(1, 2), Team::new(3, 4), (4, 4), 6, 0.0),
        ]
    }

    #[test]
    fn test_records_by_role() {
        let stats = StatsProjector::project(&history(), 1, None);

        assert_eq!(stats.overall.matches, 6);
        assert_eq!(stats.overall.wins, 3);
        assert_eq!(stats.overall.losses, 2);
        assert_eq!(stats.overall.draws, 1);
        assert_eq!(stats.as_defender.matches, 4);
        assert_eq!(stats.as_defender.wins, 2);
        assert_eq!(stats.as_attacker.matches, 2);
        assert_eq!(stats.as_attacker.wins, 1);
        assert_eq!(stats.as_attacker.losses, 1);
        assert!((stats.win_rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_streaks_follow_creation_order() {
        let mut shuffled = history();
        shuffled.reverse();
        let stats = StatsProjector::project(&shuffled, 1, None);

        // W W L W L D
        assert_eq!(stats.longest_win_streak, 2);
        assert_eq!(stats.longest_loss_streak, 1);
    }

    #[test]
    fn test_goals() {
        let stats = StatsProjector::project(&history(), 1, None);

        assert_eq!(stats.goals_for, 8 + 8 + 0 + 8 + 6 + 4);
        assert_eq!(stats.goals_against, 2 + 7 + 8 + 5 + 8 + 4);
        assert!((stats.avg_goals_for - 34.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_teammates_and_opponents_by_net_delta() {
        let stats = StatsProjector::project(&history(), 1, None);

        // Teammate 2: 20 + 8 - 9 + 0 = 19, teammate 3: -25 + 10 = -15
        let best = stats.best_teammate.unwrap();
        assert_eq!(best.player_id, 2);
        assert!((best.net_delta - 19.0).abs() < 1e-12);
        assert_eq!(best.matches, 4);
        assert_eq!(stats.worst_teammate.unwrap().player_id, 3);

        // Opponent 3: 19, opponent 4: 19 - 15 = 4, opponent 2: -15
        assert_eq!(stats.best_opponent.unwrap().player_id, 3);
        assert_eq!(stats.worst_opponent.unwrap().player_id, 2);
    }

    #[test]
    fn test_match_highlights() {
        let matches = history();
        let stats = StatsProjector::project(&matches, 1, None);

        let best_by_rating = stats.best_victory_by_rating.unwrap();
        assert_eq!(best_by_rating.match_id, matches[0].id);
        assert_eq!(best_by_rating.delta, Some(20.0));

        // 8-2 beats the 5-8 comeback on goal difference
        assert_eq!(stats.best_victory_by_score.unwrap().match_id, matches[0].id);
        assert_eq!(stats.worst_defeat_by_rating.unwrap().match_id, matches[2].id);
        assert_eq!(stats.worst_defeat_by_score.unwrap().goal_difference(), -8);
    }

    #[test]
    fn test_rating_trajectory() {
        let stats = StatsProjector::project(&history(), 1, Some(1000.0));
        let trajectory = stats.rating_trajectory.unwrap();

        // 1020, 1028, 1003, 1013, 1004, 1004
        assert!((trajectory.peak - 1028.0).abs() < 1e-9);
        assert!((trajectory.low - 1000.0).abs() < 1e-9);
        assert!((trajectory.current - 1004.0).abs() < 1e-9);
    }

    #[test]
    fn test_unapplied_matches_have_no_rating_figures() {
        let matches = vec![Match::at(Team::new(1, 2), Team::new(3, 4), (8, 1), at(1))];
        let stats = StatsProjector::project(&matches, 1, Some(1000.0));

        assert_eq!(stats.overall.wins, 1);
        assert!(stats.best_teammate.is_none());
        assert!(stats.best_victory_by_rating.is_none());
        assert!(stats.best_victory_by_score.is_some());
        assert_eq!(stats.rating_trajectory.unwrap().current, 1000.0);
    }

    #[test]
    fn test_player_without_matches() {
        let stats = StatsProjector::project(&history(), 42, None);
        assert_eq!(stats.overall.matches, 0);
        assert_eq!(stats.avg_goals_for, 0.0);
        assert_eq!(stats.win_rate, 0.0);
        assert!(stats.best_opponent.is_none());
    }
}
