use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::match_result::Outcome;
use crate::config::PointsSystem;

/// Standings keyed by team id.
pub type Table = BTreeMap<u32, TableRow>;

/// One team's accumulated standings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub team_id: u32,
    pub name: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

impl TableRow {
    pub fn new(team_id: u32, name: impl Into<String>) -> Self {
        Self {
            team_id,
            name: name.into(),
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            points: 0,
        }
    }

    pub fn goal_diff(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }

    pub fn record(&mut self, scored: u32, conceded: u32, outcome: Outcome, points: &PointsSystem) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        match outcome {
            Outcome::Win => {
                self.wins += 1;
                self.points += points.win;
            }
            Outcome::Draw => {
                self.draws += 1;
                self.points += points.draw;
            }
            Outcome::Loss => {
                self.losses += 1;
                self.points += points.loss;
            }
        }
    }

    /// Describes the first broken counter, if any.
    pub fn inconsistency(&self, points: &PointsSystem) -> Option<String> {
        if self.played != self.wins + self.draws + self.losses {
            return Some(format!(
                "team {}: played {} != {}W + {}D + {}L",
                self.team_id, self.played, self.wins, self.draws, self.losses
            ));
        }
        let expected = points.points_for(self.wins, self.draws, self.losses);
        if self.points != expected {
            return Some(format!(
                "team {}: points {} != expected {}",
                self.team_id, self.points, expected
            ));
        }
        None
    }
}
