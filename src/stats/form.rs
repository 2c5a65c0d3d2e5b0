//! Recent form and role preference summaries

use crate::league::store::Player;
use crate::types::Match;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one match judged by the sign of its rating delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormMark {
    Win,
    Loss,
}

impl FormMark {
    fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            FormMark::Win
        } else {
            FormMark::Loss
        }
    }
}

/// The latest few matches of a player, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentForm {
    pub marks: Vec<FormMark>,
    /// Sum of the deltas inside the window
    pub net_delta: f64,
}

impl RecentForm {
    /// Summarize the last `window` entries of `deltas` (stored oldest first)
    pub fn from_deltas(deltas: &[f64], window: usize) -> Self {
        let recent = deltas.iter().rev().take(window);
        let marks = recent.clone().map(|&d| FormMark::from_delta(d)).collect();
        let net_delta = recent.sum();
        Self { marks, net_delta }
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

impl fmt::Display for RecentForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mark in &self.marks {
            match mark {
                FormMark::Win => write!(f, "W")?,
                FormMark::Loss => write!(f, "L")?,
            }
        }
        Ok(())
    }
}

/// Which role a player has actually been filling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolePreference {
    Attacker,
    Defender,
    Flexible,
}

impl RolePreference {
    /// A role is preferred once its share of played matches reaches `threshold`
    pub fn classify(player: &Player, threshold: f64) -> Self {
        if player.matches_played == 0 {
            return RolePreference::Flexible;
        }

        let played = player.matches_played as f64;
        if player.matches_as_attacker as f64 / played >= threshold {
            RolePreference::Attacker
        } else if player.matches_as_defender as f64 / played >= threshold {
            RolePreference::Defender
        } else {
            RolePreference::Flexible
        }
    }
}

impl fmt::Display for RolePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RolePreference::Attacker => write!(f, "attacker"),
            RolePreference::Defender => write!(f, "defender"),
            RolePreference::Flexible => write!(f, "flexible"),
        }
    }
}

/// The `n` most recently created matches, newest first
pub fn recent_matches(history: &[Match], n: usize) -> Vec<&Match> {
    let mut sorted: Vec<&Match> = history.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::store::PlayerAggregateStore;
    use crate::types::{PlayerRegistration, Team};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_recent_form_newest_first() {
        let form = RecentForm::from_deltas(&[5.0, -3.0, 12.0, -8.0, 4.0, 9.0, -1.0], 5);

        assert_eq!(
            form.marks,
            vec![
                FormMark::Loss,
                FormMark::Win,
                FormMark::Win,
                FormMark::Loss,
                FormMark::Win
            ]
        );
        assert!((form.net_delta - 16.0).abs() < 1e-12);
        assert_eq!(form.to_string(), "LWWLW");
    }

    #[test]
    fn test_recent_form_short_history() {
        let form = RecentForm::from_deltas(&[2.0], 5);
        assert_eq!(form.marks, vec![FormMark::Win]);

        let empty = RecentForm::from_deltas(&[], 5);
        assert!(empty.is_empty());
        assert_eq!(empty.net_delta, 0.0);
    }

    #[test]
    fn test_zero_delta_is_not_a_win() {
        let form = RecentForm::from_deltas(&[0.0], 5);
        assert_eq!(form.marks, vec![FormMark::Loss]);
    }

    fn player_with_roles(attacker: u32, defender: u32) -> Player {
        let mut store = PlayerAggregateStore::new(1000.0);
        store.enroll(&PlayerRegistration::new(1, "Sam")).unwrap();
        let mut player = store.get_by_id(1).unwrap().clone();
        player.matches_as_attacker = attacker;
        player.matches_as_defender = defender;
        player.matches_played = attacker + defender;
        player
    }

    #[test]
    fn test_role_preference() {
        assert_eq!(
            RolePreference::classify(&player_with_roles(7, 3), 0.67),
            RolePreference::Attacker
        );
        assert_eq!(
            RolePreference::classify(&player_with_roles(1, 4), 0.67),
            RolePreference::Defender
        );
        assert_eq!(
            RolePreference::classify(&player_with_roles(5, 5), 0.67),
            RolePreference::Flexible
        );
        assert_eq!(
            RolePreference::classify(&player_with_roles(0, 0), 0.67),
            RolePreference::Flexible
        );
    }

    #[test]
    fn test_recent_matches_newest_first() {
        let history: Vec<Match> = (1..=4)
            .map(|day| {
                Match::at(
                    Team::new(1, 2),
                    Team::new(3, 4),
                    (8, day),
                    Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap(),
                )
            })
            .collect();

        let recent = recent_matches(&history, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, history[3].id);
        assert_eq!(recent[1].id, history[2].id);
    }
}
