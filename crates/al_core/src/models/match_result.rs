//! Match outcome produced by combat resolution.
//!
//! A `MatchResult` is transient: the week simulator folds it into the
//! fixture and the table immediately and never stores it on its own.

use serde::{Deserialize, Serialize};

use crate::error::{CareerError, Result};

/// Outcome of a match from one team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub home_id: u32,
    pub away_id: u32,
    /// Damage dealt by the home side
    pub k_home: u32,
    /// Damage dealt by the away side
    pub k_away: u32,
    /// Team id of the winner, `None` on a draw
    pub winner: Option<u32>,
    /// Combat turns taken (0 when the result was entered by hand)
    #[serde(default)]
    pub turns: u32,
}

impl MatchResult {
    pub fn new(home_id: u32, away_id: u32, k_home: u32, k_away: u32, winner: Option<u32>) -> Self {
        Self { home_id, away_id, k_home, k_away, winner, turns: 0 }
    }

    /// Winner decided by who dealt more damage. Used for hand-entered scores.
    pub fn from_scores(home_id: u32, away_id: u32, k_home: u32, k_away: u32) -> Self {
        let winner = match k_home.cmp(&k_away) {
            std::cmp::Ordering::Greater => Some(home_id),
            std::cmp::Ordering::Less => Some(away_id),
            std::cmp::Ordering::Equal => None,
        };
        Self::new(home_id, away_id, k_home, k_away, winner)
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }

    /// `None` when the team did not take part.
    pub fn outcome_for(&self, team_id: u32) -> Option<Outcome> {
        if team_id != self.home_id && team_id != self.away_id {
            return None;
        }
        Some(match self.winner {
            None => Outcome::Draw,
            Some(w) if w == team_id => Outcome::Win,
            Some(_) => Outcome::Loss,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.home_id == self.away_id {
            return Err(CareerError::SimulationInvariant(format!(
                "team {} cannot play itself",
                self.home_id
            )));
        }
        match self.winner {
            Some(w) if w != self.home_id && w != self.away_id => {
                Err(CareerError::SimulationInvariant(format!(
                    "winner {} is neither {} nor {}",
                    w, self.home_id, self.away_id
                )))
            }
            _ => Ok(()),
        }
    }
}
