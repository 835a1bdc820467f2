//! Career: the season aggregate.
//!
//! A `Career` owns every roster, fixture and table row. Team ids are the
//! indices into `team_names` (`0..team_count`).

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::LeagueConfig;
use crate::engine::rng::child_rng;
use crate::error::{CareerError, Result};
use crate::models::{Fighter, Fixture, MatchResult, Table, TableRow};
use crate::schedule::generate_schedule;
use crate::standings::{apply_result, new_table, rebuild_table, sorted_standings};

pub type Rgb = (u8, u8, u8);

pub const TEAM_NAMES: [&str; 24] = [
    "Alderfall Dragons",
    "Blackridge Wolves",
    "Stormbreak Griffins",
    "Titan's Gate",
    "Nightveil Phantoms",
    "Ironcrest Knights",
    "Ashmar Rangers",
    "Silvercoil Serpents",
    "Ravenmere",
    "Stoneheart Golems",
    "Starhaven Magi",
    "Shadowfen Stalkers",
    "Frostpeak Yetis",
    "Sunspire Paladins",
    "Redwater Raiders",
    "Moonveil Oracles",
    "Thornbarb Vipers",
    "Eaglecrest Sentinels",
    "Direbrook Bears",
    "Mirewatch Leeches",
    "Cinderforge Hammers",
    "Whisperwind Sylphs",
    "Grimhold Reapers",
    "Highspire Wardens",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Career {
    pub seed: u64,
    /// Next week to simulate, 1-based
    pub week: u32,
    pub team_names: Vec<String>,
    pub team_colors: Vec<Rgb>,
    pub rosters: BTreeMap<u32, Vec<Fighter>>,
    pub fixtures: Vec<Fixture>,
    pub table: Table,
    #[serde(default)]
    pub user_team_id: Option<u32>,
    #[serde(default)]
    pub config: LeagueConfig,
}

/// Season initialization with the default league configuration.
pub fn new_career(seed: u64, team_count: usize) -> Result<Career> {
    Career::new(seed, team_count, LeagueConfig::default())
}

impl Career {
    /// Builds a fresh season. Nothing is constructed unless the team count
    /// and the configuration are both valid.
    pub fn new(seed: u64, team_count: usize, config: LeagueConfig) -> Result<Self> {
        if team_count < 2 {
            return Err(CareerError::InvalidTeamCount { found: team_count });
        }
        config.validate()?;

        let team_ids: Vec<u32> = (0..team_count as u32).collect();
        let team_names: Vec<String> = (0..team_count).map(default_team_name).collect();
        let team_colors = team_ids.iter().map(|&tid| team_color(seed, tid)).collect();
        let rosters = team_ids
            .iter()
            .map(|&tid| {
                let roster = generate_roster(seed, tid, &team_names[tid as usize], config.team_size);
                (tid, roster)
            })
            .collect();
        let fixtures = generate_schedule(&team_ids, config.rounds, seed)?;
        let table = new_table(&team_names);

        info!(
            seed,
            teams = team_count,
            fixtures = fixtures.len(),
            rounds = config.rounds,
            "New career created"
        );

        Ok(Self {
            seed,
            week: 1,
            team_names,
            team_colors,
            rosters,
            fixtures,
            table,
            user_team_id: None,
            config,
        })
    }

    pub fn team_count(&self) -> usize {
        self.team_names.len()
    }

    pub fn team_name(&self, team_id: u32) -> Option<&str> {
        self.team_names.get(team_id as usize).map(String::as_str)
    }

    pub fn roster(&self, team_id: u32) -> Option<&[Fighter]> {
        self.rosters.get(&team_id).map(Vec::as_slice)
    }

    /// Last scheduled week, 0 without fixtures.
    pub fn total_weeks(&self) -> u32 {
        self.fixtures.iter().map(|f| f.week).max().unwrap_or(0)
    }

    pub fn is_season_finished(&self) -> bool {
        self.week > self.total_weeks()
    }

    pub fn fixtures_in_week(&self, week: u32) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter().filter(move |f| f.week == week)
    }

    pub fn remaining_in_week(&self, week: u32) -> usize {
        self.fixtures_in_week(week).filter(|f| !f.played).count()
    }

    pub fn is_week_done(&self, week: u32) -> bool {
        self.remaining_in_week(week) == 0
    }

    pub fn find_fixture(&self, fixture_id: &str) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.id == fixture_id)
    }

    pub fn set_user_team(&mut self, team_id: Option<u32>) -> Result<()> {
        if let Some(tid) = team_id {
            if tid as usize >= self.team_count() {
                return Err(CareerError::InvalidConfig(format!("no team with id {}", tid)));
            }
        }
        self.user_team_id = team_id;
        Ok(())
    }

    /// The user team's unplayed fixture in the current week, if any.
    pub fn user_fixture_this_week(&self) -> Option<&Fixture> {
        let tid = self.user_team_id?;
        self.fixtures_in_week(self.week)
            .find(|f| !f.played && f.involves(tid))
    }

    /// Records a result decided outside the AI simulator.
    ///
    /// Either both the fixture and the table are updated or neither is.
    pub fn record_result(&mut self, fixture_id: &str, result: &MatchResult) -> Result<()> {
        let index = self
            .fixtures
            .iter()
            .position(|f| f.id == fixture_id)
            .ok_or_else(|| CareerError::FixtureNotFound(fixture_id.to_string()))?;

        let mut updated = self.fixtures[index].clone();
        updated.record(result)?;
        apply_result(&mut self.table, result, &self.config.points)?;
        self.fixtures[index] = updated;
        Ok(())
    }

    /// Moves to the next week once every fixture of the current one is played.
    pub fn advance_week_if_done(&mut self) -> bool {
        if self.is_season_finished() || !self.is_week_done(self.week) {
            return false;
        }
        self.week += 1;
        true
    }

    /// Table rows in standings order.
    pub fn standings(&self) -> Vec<&TableRow> {
        sorted_standings(&self.table, &self.fixtures, &self.config.points)
    }

    /// Installs a new roster for `team_id`.
    pub fn replace_roster(&mut self, team_id: u32, roster: Vec<Fighter>) -> Result<()> {
        if team_id as usize >= self.team_count() {
            return Err(CareerError::MalformedData(format!("no team with id {}", team_id)));
        }
        check_roster(team_id, &roster)?;
        info!(team_id, fighters = roster.len(), "Roster replaced");
        self.rosters.insert(team_id, roster);
        Ok(())
    }

    /// Recomputes the table from played fixtures.
    pub fn rebuild_table(&mut self) -> Result<()> {
        self.table = rebuild_table(&self.team_names, &self.fixtures, &self.config.points)?;
        Ok(())
    }

    /// Structural checks for a decoded career. Failures are `MalformedData`.
    pub fn validate(&self) -> Result<()> {
        let n = self.team_count();
        let bad = |msg: String| Err(CareerError::MalformedData(msg));

        if n < 2 {
            return bad(format!("career has {} teams", n));
        }
        if self.week == 0 {
            return bad("week must be at least 1".into());
        }
        if self.team_colors.len() != n {
            return bad(format!("{} team colors for {} teams", self.team_colors.len(), n));
        }
        if let Err(e) = self.config.validate() {
            return bad(e.to_string());
        }
        if let Some(tid) = self.user_team_id {
            if tid as usize >= n {
                return bad(format!("user team {} does not exist", tid));
            }
        }

        let expected: BTreeSet<u32> = (0..n as u32).collect();
        if self.table.keys().copied().collect::<BTreeSet<_>>() != expected {
            return bad("table must hold exactly one row per team".into());
        }
        if self.rosters.keys().copied().collect::<BTreeSet<_>>() != expected {
            return bad("rosters must hold exactly one roster per team".into());
        }
        for (tid, row) in &self.table {
            if row.team_id != *tid {
                return bad(format!("table row keyed {} claims team {}", tid, row.team_id));
            }
        }
        for (tid, roster) in &self.rosters {
            check_roster(*tid, roster)?;
        }

        let mut ids = BTreeSet::new();
        for fx in &self.fixtures {
            if !ids.insert(fx.id.as_str()) {
                return bad(format!("duplicate fixture id {}", fx.id));
            }
            if fx.week == 0 {
                return bad(format!("fixture {} has week 0", fx.id));
            }
            if fx.home_id == fx.away_id
                || fx.home_id as usize >= n
                || fx.away_id as usize >= n
            {
                return bad(format!(
                    "fixture {} pairs unknown or identical teams {}v{}",
                    fx.id, fx.home_id, fx.away_id
                ));
            }
            if let Some(w) = fx.winner {
                if !fx.involves(w) {
                    return bad(format!("fixture {} winner {} did not play", fx.id, w));
                }
            }
        }
        Ok(())
    }

    /// Consistency between fixtures and table. A failure is a defect.
    pub fn check_invariants(&self) -> Result<()> {
        let points = &self.config.points;

        if let Some(fx) = self
            .fixtures
            .iter()
            .find(|f| !f.played && (f.home_goals != 0 || f.away_goals != 0 || f.winner.is_some()))
        {
            return Err(CareerError::SimulationInvariant(format!(
                "unplayed fixture {} carries a score",
                fx.id
            )));
        }

        for row in self.table.values() {
            if let Some(msg) = row.inconsistency(points) {
                return Err(CareerError::SimulationInvariant(msg));
            }
        }

        // The table must be exactly what the played fixtures add up to
        let expected = rebuild_table(&self.team_names, &self.fixtures, points)?;
        for (tid, row) in &self.table {
            match expected.get(tid) {
                Some(want) if want == row => {}
                Some(want) => {
                    return Err(CareerError::SimulationInvariant(format!(
                        "team {}: table row {}P {}W {}D {}L {}-{} disagrees with played fixtures ({}P {}W {}D {}L {}-{})",
                        tid,
                        row.played,
                        row.wins,
                        row.draws,
                        row.losses,
                        row.goals_for,
                        row.goals_against,
                        want.played,
                        want.wins,
                        want.draws,
                        want.losses,
                        want.goals_for,
                        want.goals_against
                    )))
                }
                None => {
                    return Err(CareerError::SimulationInvariant(format!(
                        "table row for unknown team {}",
                        tid
                    )))
                }
            }
        }
        Ok(())
    }

    pub fn to_document(&self) -> Result<String> {
        crate::save::encode(self)
    }

    pub fn from_document(document: &str) -> Result<Self> {
        crate::save::decode(document)
    }

    /// Plays every unplayed fixture of the current week and advances it.
    pub fn simulate_week_ai(&mut self) -> Result<()> {
        crate::engine::week::simulate_week_ai(self)
    }
}

fn check_roster(team_id: u32, roster: &[Fighter]) -> Result<()> {
    if roster.is_empty() {
        return Err(CareerError::MalformedData(format!("team {} has an empty roster", team_id)));
    }
    let mut pids = BTreeSet::new();
    for f in roster {
        if f.team_id != team_id {
            return Err(CareerError::MalformedData(format!(
                "fighter {} on team {}'s roster belongs to team {}",
                f.pid, team_id, f.team_id
            )));
        }
        if !f.is_consistent() {
            return Err(CareerError::MalformedData(format!(
                "fighter {} on team {}: hp {}/{} alive={}",
                f.pid, team_id, f.hp, f.max_hp, f.alive
            )));
        }
        if !pids.insert(f.pid) {
            return Err(CareerError::MalformedData(format!(
                "team {} repeats pid {}",
                team_id, f.pid
            )));
        }
    }
    Ok(())
}

/// Name for team `index`; names repeat with a numeral past the fixed list.
pub fn default_team_name(index: usize) -> String {
    let base = TEAM_NAMES[index % TEAM_NAMES.len()];
    match index / TEAM_NAMES.len() {
        0 => base.to_string(),
        lap => format!("{} {}", base, lap + 1),
    }
}

pub(crate) fn team_color(seed: u64, team_id: u32) -> Rgb {
    let mut rng = child_rng(seed, &["color", team_id.to_string().as_str()]);
    (
        rng.gen_range(40..=230),
        rng.gen_range(40..=230),
        rng.gen_range(40..=230),
    )
}

/// Deterministic starting roster for one team.
pub(crate) fn generate_roster(seed: u64, team_id: u32, team_name: &str, size: usize) -> Vec<Fighter> {
    let mut rng = child_rng(seed, &["roster", team_id.to_string().as_str()]);
    (0..size)
        .map(|slot| {
            let max_hp = rng.gen_range(8..=14);
            let ac = rng.gen_range(10..=15);
            let strength = rng.gen_range(8..=16);
            let dexterity = rng.gen_range(8..=16);
            Fighter::new(slot as u32, team_id, format!("{} #{}", team_name, slot + 1), max_hp, ac)
                .with_stat("STR", strength)
                .with_stat("DEX", dexterity)
        })
        .collect()
}
