//! # League Configuration
//!
//! Every tuning constant of a career lives here so that balance changes
//! never touch the engine code.
//!
//! ## Usage
//! ```rust
//! use al_core::config::LeagueConfig;
//!
//! let config = LeagueConfig::default();
//! let home_and_away = LeagueConfig::double_round_robin();
//! assert_eq!(home_and_away.rounds, 2);
//! # assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CareerError, Result};

/// Fighters per generated roster.
pub const DEFAULT_TEAM_SIZE: usize = 4;
/// Safety cap on combat turns before a match is declared a draw.
pub const DEFAULT_TURN_LIMIT: u32 = 3000;
/// League size used by the CLI when none is given.
pub const LEAGUE_TEAMS: usize = 20;
/// Largest damage die a league may use (d100).
pub const MAX_DAMAGE_DIE: u32 = 100;
/// Most damage dice rolled on one critical hit.
pub const MAX_CRIT_MULTIPLIER: u32 = 10;
/// Largest attack bonus in either direction.
pub const MAX_PROFICIENCY_BONUS: i32 = 20;

/// Full career ruleset. Stored inside the career document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    /// Fighters generated per team at career creation
    pub team_size: usize,
    /// 1 = single round-robin, 2 = home and away, ...
    pub rounds: u32,
    /// Combat resolution settings
    pub combat: CombatConfig,
    /// Standings points per outcome
    pub points: PointsSystem,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            team_size: DEFAULT_TEAM_SIZE,
            rounds: 1,
            combat: CombatConfig::default(),
            points: PointsSystem::default(),
        }
    }
}

impl LeagueConfig {
    pub fn single_round_robin() -> Self {
        Self::default()
    }

    /// Every pairing played twice, home and away swapped in the second half.
    pub fn double_round_robin() -> Self {
        Self { rounds: 2, ..Self::default() }
    }

    /// Small rosters and a short turn cap. Used by tests and quick previews.
    pub fn quick() -> Self {
        let mut cfg = Self::default();
        cfg.team_size = 2;
        cfg.combat.turn_limit = 200;
        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.team_size == 0 {
            return Err(CareerError::InvalidConfig("team_size must be at least 1".into()));
        }
        if self.rounds == 0 {
            return Err(CareerError::InvalidConfig("rounds must be at least 1".into()));
        }
        self.combat.validate()
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CareerError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&text)
    }
}

/// D20 combat settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub turn_limit: u32,
    /// Sides of the damage die (1dN per hit)
    pub damage_die: u32,
    pub proficiency_bonus: i32,
    /// Natural roll at or above which a hit is critical
    pub crit_threshold: u32,
    /// Damage dice rolled on a critical hit
    pub crit_multiplier: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            turn_limit: DEFAULT_TURN_LIMIT,
            damage_die: 6,
            proficiency_bonus: 2,
            crit_threshold: 20,
            crit_multiplier: 2,
        }
    }
}

impl CombatConfig {
    pub fn validate(&self) -> Result<()> {
        if self.turn_limit == 0 {
            return Err(CareerError::InvalidConfig("combat.turn_limit must be at least 1".into()));
        }
        if !(1..=MAX_DAMAGE_DIE).contains(&self.damage_die) {
            return Err(CareerError::InvalidConfig(format!(
                "combat.damage_die must be within 1..={}, got {}",
                MAX_DAMAGE_DIE, self.damage_die
            )));
        }
        if !(-MAX_PROFICIENCY_BONUS..=MAX_PROFICIENCY_BONUS).contains(&self.proficiency_bonus) {
            return Err(CareerError::InvalidConfig(format!(
                "combat.proficiency_bonus must be within -{}..={}, got {}",
                MAX_PROFICIENCY_BONUS, MAX_PROFICIENCY_BONUS, self.proficiency_bonus
            )));
        }
        if !(2..=20).contains(&self.crit_threshold) {
            return Err(CareerError::InvalidConfig(format!(
                "combat.crit_threshold must be within 2..=20, got {}",
                self.crit_threshold
            )));
        }
        if !(1..=MAX_CRIT_MULTIPLIER).contains(&self.crit_multiplier) {
            return Err(CareerError::InvalidConfig(format!(
                "combat.crit_multiplier must be within 1..={}, got {}",
                MAX_CRIT_MULTIPLIER, self.crit_multiplier
            )));
        }
        Ok(())
    }
}

/// Win/draw/loss scoring. Standard football scoring by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsSystem {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl Default for PointsSystem {
    fn default() -> Self {
        Self { win: 3, draw: 1, loss: 0 }
    }
}

impl PointsSystem {
    pub fn points_for(&self, wins: u32, draws: u32, losses: u32) -> u32 {
        self.win * wins + self.draw * draws + self.loss * losses
    }
}
