use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::match_result::{MatchResult, Outcome};
use crate::error::{CareerError, Result};

/// Competition a fixture belongs to. Only the league exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum CompKind {
    #[default]
    League,
}

impl CompKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompKind::League => "league",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "league" => Some(CompKind::League),
            _ => None,
        }
    }
}

/// One scheduled match between two teams in a given week.
///
/// Scores are damage dealt; `home_goals`/`away_goals` carry the same
/// quantity as `MatchResult::k_home`/`k_away`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: String,
    /// 1-based
    pub week: u32,
    pub home_id: u32,
    pub away_id: u32,
    pub home_goals: u32,
    pub away_goals: u32,
    pub played: bool,
    pub winner: Option<u32>,
    #[serde(default)]
    pub comp_kind: CompKind,
}

impl Fixture {
    pub fn new(week: u32, home_id: u32, away_id: u32) -> Self {
        Self {
            id: Self::stable_id(week, home_id, away_id),
            week,
            home_id,
            away_id,
            home_goals: 0,
            away_goals: 0,
            played: false,
            winner: None,
            comp_kind: CompKind::League,
        }
    }

    /// First 12 hex chars of SHA-256 over week and pairing.
    pub fn stable_id(week: u32, home_id: u32, away_id: u32) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("W{}-H{}-A{}", week, home_id, away_id).as_bytes());
        let digest = hasher.finalize();
        digest.iter().take(6).map(|b| format!("{:02x}", b)).collect()
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.home_id == team_id || self.away_id == team_id
    }

    /// `None` while unplayed or when the team is not involved.
    pub fn outcome_for(&self, team_id: u32) -> Option<Outcome> {
        if !self.played || !self.involves(team_id) {
            return None;
        }
        Some(match self.winner {
            None => Outcome::Draw,
            Some(w) if w == team_id => Outcome::Win,
            Some(_) => Outcome::Loss,
        })
    }

    /// Scores of `team_id` and its opponent, in that order.
    pub fn scores_for(&self, team_id: u32) -> Option<(u32, u32)> {
        if team_id == self.home_id {
            Some((self.home_goals, self.away_goals))
        } else if team_id == self.away_id {
            Some((self.away_goals, self.home_goals))
        } else {
            None
        }
    }

    /// Finalizes the fixture. A played fixture is immutable.
    pub fn record(&mut self, result: &MatchResult) -> Result<()> {
        if self.played {
            return Err(CareerError::FixtureAlreadyPlayed(self.id.clone()));
        }
        if result.home_id != self.home_id || result.away_id != self.away_id {
            return Err(CareerError::SimulationInvariant(format!(
                "result {}v{} does not belong to fixture {} ({}v{})",
                result.home_id, result.away_id, self.id, self.home_id, self.away_id
            )));
        }
        result.validate()?;

        self.home_goals = result.k_home;
        self.away_goals = result.k_away;
        self.winner = result.winner;
        self.played = true;
        Ok(())
    }
}
