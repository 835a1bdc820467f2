//! Combat Resolver: turn-based D20 duel between two rosters.
//!
//! ## Turn structure
//! Each side fights with its first living fighter (the *active* fighter).
//! Every turn both active fighters strike once; initiative alternates,
//! home first on odd turns. When a fighter drops, the next living fighter
//! in roster order steps in.
//!
//! ## Strike
//! - roll 1d20; a natural 1 always misses
//! - a roll at or above `crit_threshold` always hits and multiplies the damage dice
//! - otherwise `roll + proficiency + STR mod >= defender.ac` hits
//! - damage is `1d(damage_die) + STR mod`, at least 1, capped at the defender's hp
//!
//! ## End
//! A side with no living fighters loses. Reaching `turn_limit` is a draw.
//! The score of each side is the total damage it dealt.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;
use crate::error::{CareerError, Result};
use crate::models::{Fighter, MatchResult};

/// Why a combat stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Elimination,
    DoubleElimination,
    TurnLimit,
}

/// Typed combat log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    Round {
        round: u32,
    },
    Hit {
        name: String,
        target: String,
        roll: u32,
        dmg: u32,
        critical: bool,
    },
    Miss {
        name: String,
        target: String,
        roll: u32,
    },
    Down {
        name: String,
        team_id: u32,
    },
    End {
        winner: Option<u32>,
        reason: EndReason,
    },
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Home,
    Away,
}

pub struct CombatResolver<'a> {
    config: &'a CombatConfig,
    rng: ChaCha8Rng,
    events: Option<Vec<CombatEvent>>,
}

impl<'a> CombatResolver<'a> {
    pub fn new(config: &'a CombatConfig, seed: u64) -> Self {
        Self::from_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_rng(config: &'a CombatConfig, rng: ChaCha8Rng) -> Self {
        Self { config, rng, events: None }
    }

    /// Record a typed event log while resolving.
    pub fn with_log(mut self) -> Self {
        self.events = Some(Vec::new());
        self
    }

    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        self.events.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Fights `home` against `away` in place. Both rosters must be non-empty.
    pub fn resolve(
        &mut self,
        home_id: u32,
        home: &mut [Fighter],
        away_id: u32,
        away: &mut [Fighter],
    ) -> Result<MatchResult> {
        if home.is_empty() || away.is_empty() {
            return Err(CareerError::SimulationInvariant(format!(
                "combat {}v{} needs two non-empty rosters ({} vs {} fighters)",
                home_id,
                away_id,
                home.len(),
                away.len()
            )));
        }

        let mut k_home = 0u32;
        let mut k_away = 0u32;
        let mut turn = 0u32;

        let (winner, reason) = loop {
            match (active(home).is_some(), active(away).is_some()) {
                (true, false) => break (Some(home_id), EndReason::Elimination),
                (false, true) => break (Some(away_id), EndReason::Elimination),
                (false, false) => break (None, EndReason::DoubleElimination),
                (true, true) => {}
            }
            if turn >= self.config.turn_limit {
                break (None, EndReason::TurnLimit);
            }

            turn += 1;
            self.emit(CombatEvent::Round { round: turn });

            let order = if turn % 2 == 1 {
                [Side::Home, Side::Away]
            } else {
                [Side::Away, Side::Home]
            };
            for side in order {
                match side {
                    Side::Home => {
                        if let (Some(a), Some(d)) = (active(home), active(away)) {
                            k_home += self.strike(&home[a], &mut away[d]);
                        }
                    }
                    Side::Away => {
                        if let (Some(a), Some(d)) = (active(away), active(home)) {
                            k_away += self.strike(&away[a], &mut home[d]);
                        }
                    }
                }
            }
        };

        self.emit(CombatEvent::End { winner, reason });

        let result = MatchResult { home_id, away_id, k_home, k_away, winner, turns: turn };
        result.validate()?;
        Ok(result)
    }

    /// One attack. Returns hp removed from the defender.
    fn strike(&mut self, attacker: &Fighter, defender: &mut Fighter) -> u32 {
        let roll: u32 = self.rng.gen_range(1..=20);
        let modifier = attacker.ability_mod("STR");
        let critical = roll >= self.config.crit_threshold;
        let hit = roll != 1
            && (critical || roll as i32 + self.config.proficiency_bonus + modifier >= defender.ac);

        if !hit {
            self.emit(CombatEvent::Miss {
                name: attacker.name.clone(),
                target: defender.name.clone(),
                roll,
            });
            return 0;
        }

        let dice = if critical { self.config.crit_multiplier } else { 1 };
        let rolled: i32 = (0..dice)
            .map(|_| self.rng.gen_range(1..=self.config.damage_die) as i32)
            .sum();
        let damage = (rolled + modifier).max(1) as u32;
        let dealt = defender.take_damage(damage);

        self.emit(CombatEvent::Hit {
            name: attacker.name.clone(),
            target: defender.name.clone(),
            roll,
            dmg: dealt,
            critical,
        });
        if !defender.alive {
            self.emit(CombatEvent::Down {
                name: defender.name.clone(),
                team_id: defender.team_id,
            });
        }
        dealt
    }

    fn emit(&mut self, event: CombatEvent) {
        if let Some(events) = self.events.as_mut() {
            events.push(event);
        }
    }
}

fn active(roster: &[Fighter]) -> Option<usize> {
    roster.iter().position(|f| f.alive)
}

/// Resolves one combat from a seed.
pub fn resolve_combat(
    home_id: u32,
    home: &mut [Fighter],
    away_id: u32,
    away: &mut [Fighter],
    config: &CombatConfig,
    seed: u64,
) -> Result<MatchResult> {
    CombatResolver::new(config, seed).resolve(home_id, home, away_id, away)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(team_id: u32, size: u32, hp: u32, ac: i32) -> Vec<Fighter> {
        (0..size)
            .map(|pid| Fighter::new(pid, team_id, format!("T{}-{}", team_id, pid), hp, ac))
            .collect()
    }

    #[test]
    fn test_determinism() {
        let cfg = CombatConfig::default();
        let base_home = roster(0, 4, 12, 12);
        let base_away = roster(1, 4, 11, 13);

        let mut h1 = base_home.clone();
        let mut a1 = base_away.clone();
        let r1 = resolve_combat(0, &mut h1, 1, &mut a1, &cfg, 42).unwrap();

        let mut h2 = base_home.clone();
        let mut a2 = base_away.clone();
        let r2 = resolve_combat(0, &mut h2, 1, &mut a2, &cfg, 42).unwrap();

        assert_eq!(r1, r2, "Same seed should produce same result");
        assert_eq!(h1, h2);
        assert_eq!(a1, a2);
    }

    #[test]
    fn test_elimination_winner_and_scores() {
        let cfg = CombatConfig::default();
        let mut home = roster(3, 3, 10, 10);
        let mut away = roster(8, 3, 10, 10);

        let r = resolve_combat(3, &mut home, 8, &mut away, &cfg, 7).unwrap();

        let home_dead = home.iter().all(|f| !f.alive);
        let away_dead = away.iter().all(|f| !f.alive);
        match r.winner {
            Some(3) => assert!(away_dead && !home_dead),
            Some(8) => assert!(home_dead && !away_dead),
            other => panic!("expected an elimination, got {:?}", other),
        }

        // Scores are exactly the hp each side removed
        let removed_from_away: u32 = away.iter().map(|f| f.max_hp - f.hp).sum();
        let removed_from_home: u32 = home.iter().map(|f| f.max_hp - f.hp).sum();
        assert_eq!(r.k_home, removed_from_away);
        assert_eq!(r.k_away, removed_from_home);
        assert!(home.iter().chain(away.iter()).all(|f| f.is_consistent()));
    }

    #[test]
    fn test_turn_limit_is_a_draw() {
        let mut cfg = CombatConfig::default();
        cfg.turn_limit = 5;
        // Only a natural 20 can land against these
        let mut home = roster(0, 2, 500, 40);
        let mut away = roster(1, 2, 500, 40);

        let r = resolve_combat(0, &mut home, 1, &mut away, &cfg, 1).unwrap();
        assert_eq!(r.winner, None);
        assert_eq!(r.turns, 5);
    }

    #[test]
    fn test_extreme_ability_scores_resolve() {
        let cfg = CombatConfig::default();
        let mut home: Vec<Fighter> =
            roster(0, 2, 10, 10).into_iter().map(|f| f.with_stat("STR", i64::MIN)).collect();
        let mut away: Vec<Fighter> =
            roster(1, 2, 10, 10).into_iter().map(|f| f.with_stat("STR", i64::MAX)).collect();

        let r = resolve_combat(0, &mut home, 1, &mut away, &cfg, 11).unwrap();
        assert!(r.turns > 0);
        assert!(home.iter().chain(away.iter()).all(|f| f.is_consistent()));
    }

    #[test]
    fn test_side_without_living_fighters_loses_immediately() {
        let cfg = CombatConfig::default();
        let mut home = roster(0, 2, 10, 10);
        let mut away = roster(1, 2, 10, 10);
        for f in away.iter_mut() {
            f.take_damage(10);
        }

        let r = resolve_combat(0, &mut home, 1, &mut away, &cfg, 3).unwrap();
        assert_eq!(r.winner, Some(0));
        assert_eq!(r.turns, 0);
        assert_eq!((r.k_home, r.k_away), (0, 0));
    }

    #[test]
    fn test_empty_roster_rejected() {
        let cfg = CombatConfig::default();
        let mut home = roster(0, 2, 10, 10);
        let mut away: Vec<Fighter> = Vec::new();
        let err = resolve_combat(0, &mut home, 1, &mut away, &cfg, 3).unwrap_err();
        assert!(matches!(err, CareerError::SimulationInvariant(_)));
    }

    #[test]
    fn test_event_log_shape() {
        let cfg = CombatConfig::default();
        let mut home = roster(0, 2, 3, 8);
        let mut away = roster(1, 2, 3, 8);

        let mut resolver = CombatResolver::new(&cfg, 42).with_log();
        let r = resolver.resolve(0, &mut home, 1, &mut away).unwrap();
        let events = resolver.take_events();

        assert_eq!(events.first(), Some(&CombatEvent::Round { round: 1 }));
        match events.last() {
            Some(CombatEvent::End { winner, .. }) => assert_eq!(*winner, r.winner),
            other => panic!("last event should be End, got {:?}", other),
        }
        let downs = events.iter().filter(|e| matches!(e, CombatEvent::Down { .. })).count();
        let dead = home.iter().chain(away.iter()).filter(|f| !f.alive).count();
        assert_eq!(downs, dead);

        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["type"], "round");
    }

    #[test]
    fn test_no_log_by_default() {
        let cfg = CombatConfig::default();
        let mut home = roster(0, 1, 5, 10);
        let mut away = roster(1, 1, 5, 10);
        let mut resolver = CombatResolver::new(&cfg, 9);
        resolver.resolve(0, &mut home, 1, &mut away).unwrap();
        assert!(resolver.take_events().is_empty());
    }
}
