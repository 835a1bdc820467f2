//! Arena League CLI library
//!
//! Career documents on disk and plain-text views of a career.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use al_core::adapters::roster_from_records;
use al_core::{Career, LeagueConfig, WeekReport};

/// Writes the career document next to `path` and renames it into place,
/// so a crash never leaves a half-written career behind.
pub fn save_career(path: &Path, career: &Career) -> Result<()> {
    let document = career.to_document().context("Failed to encode career")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, document.as_bytes())
        .with_context(|| format!("Failed to write career file: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} into place", tmp.display()))?;

    tracing::debug!(path = %path.display(), bytes = document.len(), "Career saved");
    Ok(())
}

pub fn load_career(path: &Path) -> Result<Career> {
    let document = fs::read_to_string(path)
        .with_context(|| format!("Failed to read career file: {}", path.display()))?;
    let career = Career::from_document(&document)
        .with_context(|| format!("Failed to decode career file: {}", path.display()))?;
    tracing::debug!(path = %path.display(), week = career.week, "Career loaded");
    Ok(career)
}

/// League settings from a preset name and/or a YAML file. The file wins.
pub fn league_config(preset: Option<&str>, yaml: Option<&Path>) -> Result<LeagueConfig> {
    if let Some(path) = yaml {
        return LeagueConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load league config: {}", path.display()));
    }
    Ok(match preset.unwrap_or("single") {
        "single" => LeagueConfig::single_round_robin(),
        "double" => LeagueConfig::double_round_robin(),
        "quick" => LeagueConfig::quick(),
        other => bail!("Unknown preset '{}' (expected single, double or quick)", other),
    })
}

/// Replaces a team's roster with the fighters in a JSON file.
///
/// The file holds either a list of fighter records or an object with a
/// `roster`/`fighters`/`players` list. Returns the roster size.
pub fn import_roster(career: &mut Career, team_id: u32, path: &Path) -> Result<usize> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&text).context("Failed to parse roster JSON")?;

    let records = match &value {
        Value::Array(items) => items.clone(),
        Value::Object(obj) => ["roster", "fighters", "players"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_array))
            .cloned()
            .context("Roster object has no roster/fighters/players list")?,
        _ => bail!("Roster file must hold a list or an object"),
    };

    let roster = roster_from_records(&records, team_id)
        .with_context(|| format!("Invalid roster in {}", path.display()))?;
    let size = roster.len();
    career.replace_roster(team_id, roster)?;
    Ok(size)
}

pub fn render_table(career: &Career) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>5} {:>5} {:>5} {:>4}",
        "#", "Team", "P", "W", "D", "L", "F", "A", "GD", "Pts"
    );
    for (pos, row) in career.standings().iter().enumerate() {
        let marker = if career.user_team_id == Some(row.team_id) { "*" } else { " " };
        let _ = writeln!(
            out,
            "{:>3}{} {:<24} {:>3} {:>3} {:>3} {:>3} {:>5} {:>5} {:>+5} {:>4}",
            pos + 1,
            marker,
            row.name,
            row.played,
            row.wins,
            row.draws,
            row.losses,
            row.goals_for,
            row.goals_against,
            row.goal_diff(),
            row.points
        );
    }
    out
}

pub fn render_fixtures(career: &Career, week: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Week {} of {}", week, career.total_weeks());
    for fx in career.fixtures_in_week(week) {
        let home = career.team_name(fx.home_id).unwrap_or("?");
        let away = career.team_name(fx.away_id).unwrap_or("?");
        let score = if fx.played {
            format!("{:>3} - {:<3}", fx.home_goals, fx.away_goals)
        } else {
            "  vs     ".to_string()
        };
        let _ = writeln!(out, "  [{}] {:>24} {} {}", fx.id, home, score, away);
    }
    out
}

pub fn render_week_report(career: &Career, report: &WeekReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Week {}: {} fixtures played", report.week, report.results.len());
    for (_, result) in &report.results {
        let home = career.team_name(result.home_id).unwrap_or("?");
        let away = career.team_name(result.away_id).unwrap_or("?");
        let verdict = match result.winner {
            Some(w) => format!("{} win", career.team_name(w).unwrap_or("?")),
            None => "draw".to_string(),
        };
        let _ = writeln!(
            out,
            "  {} {}-{} {} ({}, {} turns)",
            home, result.k_home, result.k_away, away, verdict, result.turns
        );
    }
    if let Some(id) = &report.skipped {
        let _ = writeln!(out, "  Fixture {} is waiting for your result", id);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use al_core::{new_career, simulate_week_ai};
    use tempfile::tempdir;

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saves").join("career.json");

        let mut career = new_career(7, 6).unwrap();
        simulate_week_ai(&mut career).unwrap();
        save_career(&path, &career).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(load_career(&path).unwrap(), career);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let dir = tempdir().unwrap();
        let err = load_career(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read career file"));
    }

    #[test]
    fn test_load_garbage_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"schema_version\": 1, \"career\": 5}").unwrap();
        let err = load_career(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to decode"));
    }

    #[test]
    fn test_import_roster_from_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roster.json");
        fs::write(
            &path,
            r#"{"fighters": [{"name": "Ada", "HP": 12, "AC": 14, "STR": 15}, {"name": "Bo", "hp": 9}]}"#,
        )
        .unwrap();

        let mut career = new_career(1, 4).unwrap();
        assert_eq!(import_roster(&mut career, 2, &path).unwrap(), 2);
        let roster = career.roster(2).unwrap();
        assert_eq!(roster[0].name, "Ada");
        assert_eq!(roster[0].stat("STR"), Some(15));
        assert!(roster.iter().all(|f| f.team_id == 2));
    }

    #[test]
    fn test_import_roster_rejects_bad_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roster.json");
        fs::write(&path, r#"[{"name": "No hp"}]"#).unwrap();

        let mut career = new_career(1, 4).unwrap();
        let before = career.roster(0).unwrap().to_vec();
        assert!(import_roster(&mut career, 0, &path).is_err());
        assert_eq!(career.roster(0).unwrap(), before.as_slice());
    }

    #[test]
    fn test_league_config_presets() {
        assert_eq!(league_config(None, None).unwrap(), LeagueConfig::default());
        assert_eq!(league_config(Some("double"), None).unwrap().rounds, 2);
        assert!(league_config(Some("cup"), None).is_err());

        let dir = tempdir().unwrap();
        let path = dir.path().join("league.yaml");
        fs::write(&path, "team_size: 3\ncombat:\n  turn_limit: 50\n").unwrap();
        let cfg = league_config(Some("double"), Some(&path)).unwrap();
        assert_eq!(cfg.team_size, 3);
        assert_eq!(cfg.combat.turn_limit, 50);
        assert_eq!(cfg.rounds, 1);
    }

    #[test]
    fn test_render_views() {
        let mut career = new_career(7, 4).unwrap();
        career.set_user_team(Some(1)).unwrap();
        simulate_week_ai(&mut career).unwrap();

        let table = render_table(&career);
        assert_eq!(table.lines().count(), 5);
        assert!(table.contains("Alderfall Dragons"));
        assert!(table.lines().any(|l| l.contains('*') && l.contains("Blackridge Wolves")));

        let fixtures = render_fixtures(&career, 1);
        assert!(fixtures.starts_with("Week 1 of 3"));
        assert_eq!(fixtures.lines().count(), 3);
        assert!(!fixtures.contains(" vs "));
    }
}
