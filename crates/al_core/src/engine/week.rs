//! Week Simulator.
//!
//! Plays every unplayed fixture of `career.week`, writes the scores into
//! the fixtures, folds them into the table, then moves the week pointer.
//! Each fixture fights with fresh copies of both rosters and its own RNG
//! stream (`derive_seed(career.seed, ["match", fixture.id])`), so the
//! outcome of a fixture does not depend on the order fixtures are played.

use serde::Serialize;
use tracing::{debug, info};

use super::combat::CombatResolver;
use super::rng::derive_seed;
use crate::career::Career;
use crate::error::{CareerError, Result};
use crate::models::{Fighter, Fixture, MatchResult};

/// What one call to [`simulate_week`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekReport {
    pub week: u32,
    /// (fixture id, result) in fixture order
    pub results: Vec<(String, MatchResult)>,
    /// Fixture left for the user, if it was still unplayed
    pub skipped: Option<String>,
    pub advanced: bool,
}

/// Plays the whole current week and moves to the next one.
pub fn simulate_week_ai(career: &mut Career) -> Result<()> {
    simulate_week(career, None).map(|_| ())
}

/// Plays the current week except `fixture_id`, which is left for the user.
/// The week only advances once that fixture has been recorded too.
pub fn simulate_week_except(career: &mut Career, fixture_id: &str) -> Result<WeekReport> {
    simulate_week(career, Some(fixture_id))
}

/// Plays on a copy and only writes it back once every fixture has been
/// recorded and the table checks out, so an error leaves `career` as it was.
pub fn simulate_week(career: &mut Career, except: Option<&str>) -> Result<WeekReport> {
    career.check_invariants()?;

    let mut next = career.clone();
    let report = play_week(&mut next, except)?;
    next.check_invariants()?;

    *career = next;
    info!(
        week = report.week,
        played = report.results.len(),
        skipped = report.skipped.is_some(),
        next_week = career.week,
        "Week simulated"
    );
    Ok(report)
}

fn play_week(career: &mut Career, except: Option<&str>) -> Result<WeekReport> {
    let week = career.week;
    let pending: Vec<Fixture> = career
        .fixtures_in_week(week)
        .filter(|f| !f.played && Some(f.id.as_str()) != except)
        .cloned()
        .collect();

    let mut results = Vec::with_capacity(pending.len());
    for fixture in &pending {
        let result = resolve_fixture(career, fixture)?;
        debug!(
            week,
            fixture = %fixture.id,
            home = fixture.home_id,
            away = fixture.away_id,
            k_home = result.k_home,
            k_away = result.k_away,
            winner = ?result.winner,
            turns = result.turns,
            "Fixture resolved"
        );
        career.record_result(&fixture.id, &result)?;
        results.push((fixture.id.clone(), result));
    }

    let skipped = except
        .filter(|id| career.find_fixture(id).is_some_and(|f| f.week == week && !f.played))
        .map(str::to_string);

    let advanced = match except {
        None => {
            career.week += 1;
            true
        }
        Some(_) => career.advance_week_if_done(),
    };

    Ok(WeekReport { week, results, skipped, advanced })
}

/// Resolves one fixture without touching the career.
pub fn resolve_fixture(career: &Career, fixture: &Fixture) -> Result<MatchResult> {
    let mut home = fresh_roster(career, fixture.home_id)?;
    let mut away = fresh_roster(career, fixture.away_id)?;
    let seed = derive_seed(career.seed, &["match", fixture.id.as_str()]);

    CombatResolver::new(&career.config.combat, seed).resolve(
        fixture.home_id,
        &mut home,
        fixture.away_id,
        &mut away,
    )
}

fn fresh_roster(career: &Career, team_id: u32) -> Result<Vec<Fighter>> {
    let mut roster = career
        .roster(team_id)
        .ok_or_else(|| CareerError::SimulationInvariant(format!("team {} has no roster", team_id)))?
        .to_vec();
    for fighter in roster.iter_mut() {
        fighter.restore();
    }
    Ok(roster)
}
