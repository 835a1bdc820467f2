use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Ability scores that take part in combat math.
pub const ABILITY_SCORE_RANGE: RangeInclusive<i64> = 1..=30;

/// One combat unit on a team roster.
///
/// `alive` always mirrors `hp > 0`; every mutation goes through
/// [`Fighter::take_damage`] or [`Fighter::restore`] to keep it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    /// Unique within the roster
    pub pid: u32,
    pub team_id: u32,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    /// Armor class: a roll must reach this to hit
    pub ac: i32,
    pub alive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Upper-case ability scores (STR, DEX, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stats: BTreeMap<String, i64>,
}

impl Fighter {
    pub fn new(pid: u32, team_id: u32, name: impl Into<String>, max_hp: u32, ac: i32) -> Self {
        Self {
            pid,
            team_id,
            name: name.into(),
            hp: max_hp,
            max_hp,
            ac,
            alive: max_hp > 0,
            role: None,
            stats: BTreeMap::new(),
        }
    }

    pub fn with_stat(mut self, key: &str, value: i64) -> Self {
        self.stats.insert(key.to_string(), value);
        self
    }

    pub fn stat(&self, key: &str) -> Option<i64> {
        self.stats.get(key).copied()
    }

    /// D20 ability modifier, floor((score - 10) / 2). Missing scores count as 10;
    /// scores outside [`ABILITY_SCORE_RANGE`] are clamped into it.
    pub fn ability_mod(&self, key: &str) -> i32 {
        let score = self
            .stat(key)
            .unwrap_or(10)
            .clamp(*ABILITY_SCORE_RANGE.start(), *ABILITY_SCORE_RANGE.end()) as i32;
        (score - 10).div_euclid(2)
    }

    /// Applies damage and returns how much hp was actually removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        self.alive = self.hp > 0;
        dealt
    }

    pub fn restore(&mut self) {
        self.hp = self.max_hp;
        self.alive = self.hp > 0;
    }

    pub fn is_consistent(&self) -> bool {
        self.max_hp > 0 && self.hp <= self.max_hp && self.alive == (self.hp > 0)
    }
}
