use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Map, Value};

use super::SAVE_VERSION;
use crate::adapters::{as_fixture, roster_from_records};
use crate::career::{default_team_name, generate_roster, team_color, Career, Rgb};
use crate::config::LeagueConfig;
use crate::error::{CareerError, Result};
use crate::models::Fighter;
use crate::standings::rebuild_table;

/// Version of a raw document. Documents without `schema_version` are v0.
pub fn document_version(doc: &Value) -> Result<u32> {
    match doc.get("schema_version") {
        None | Some(Value::Null) => Ok(0),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| CareerError::MalformedData(format!("schema_version: {}", v))),
    }
}

pub fn needs_migration(doc: &Value) -> bool {
    matches!(document_version(doc), Ok(v) if v < SAVE_VERSION)
}

/// Brings a raw document up to the current shape.
pub fn migrate_document(doc: Value) -> Result<Value> {
    if !doc.is_object() {
        return Err(CareerError::MalformedData("career document must be an object".into()));
    }
    let original_version = document_version(&doc)?;

    let mut doc = match original_version {
        0 => migrate_v0_to_v1(doc)?,
        1 => doc,
        v if v > SAVE_VERSION => {
            // Future version - decode what we understand
            log::warn!("Loading career document from future version {} (current: {})", v, SAVE_VERSION);
            doc
        }
        v => {
            return Err(CareerError::MalformedData(format!(
                "unsupported schema_version {} (expected {})",
                v, SAVE_VERSION
            )))
        }
    };

    if let Some(obj) = doc.as_object_mut() {
        obj.insert("schema_version".into(), json!(SAVE_VERSION));
    }

    if original_version != SAVE_VERSION {
        log::info!("Migrated career document from version {} to {}", original_version, SAVE_VERSION);
    }
    Ok(doc)
}

/// v0: a bare (or `career`-wrapped) object with a `teams` list, legacy
/// fixture keys and a table that may disagree with the fixtures.
fn migrate_v0_to_v1(doc: Value) -> Result<Value> {
    log::info!("Migrating career document from version 0 to 1");

    let mut obj = match doc {
        Value::Object(mut map) => match map.remove("career") {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                return Err(CareerError::MalformedData(format!("career: expected an object, got {}", other)))
            }
            None => map,
        },
        _ => return Err(CareerError::MalformedData("career document must be an object".into())),
    };

    let seed = match obj.get("seed") {
        Some(v) => v
            .as_u64()
            .ok_or_else(|| CareerError::MalformedData(format!("seed: {}", v)))?,
        None => {
            log::warn!("v0 career has no seed, using 0");
            0
        }
    };

    // Legacy saves start counting at week 0
    let week = match obj.get("week") {
        None | Some(Value::Null) => 1,
        Some(v) => match v.as_u64() {
            Some(0) => 1,
            Some(w) => u32::try_from(w).map_err(|_| CareerError::MalformedData(format!("week: {}", w)))?,
            None => return Err(CareerError::MalformedData(format!("week: expected a number, got {}", v))),
        },
    };

    let mut config: LeagueConfig = match obj.remove("config") {
        Some(v) => serde_json::from_value(v)?,
        None => LeagueConfig::default(),
    };

    let teams = legacy_teams(&mut obj)?;
    let team_count = teams.len();
    if team_count < 2 {
        return Err(CareerError::InvalidTeamCount { found: team_count });
    }

    let mut team_names = Vec::with_capacity(team_count);
    let mut team_colors: Vec<Rgb> = Vec::with_capacity(team_count);
    let mut rosters: BTreeMap<u32, Vec<Fighter>> = BTreeMap::new();
    for (tid, team) in teams.iter().enumerate() {
        let tid = tid as u32;
        let name = team
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| default_team_name(tid as usize));

        let color = match team.get("color").or_else(|| team.get("colour")) {
            Some(v) => parse_color(v)?,
            None => team_color(seed, tid),
        };

        let records = ["roster", "fighters", "players"]
            .iter()
            .find_map(|k| team.get(*k).and_then(Value::as_array))
            .cloned()
            .unwrap_or_default();
        let roster = if records.is_empty() {
            log::warn!("Team {} ('{}') has no roster, generating one", tid, name);
            generate_roster(seed, tid, &name, config.team_size)
        } else {
            roster_from_records(&records, tid)?
        };

        team_names.push(name);
        team_colors.push(color);
        rosters.insert(tid, roster);
    }

    let fixtures = match obj.get("fixtures") {
        Some(Value::Array(items)) => items.iter().map(as_fixture).collect::<Result<Vec<_>>>()?,
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            return Err(CareerError::MalformedData(format!("fixtures: expected a list, got {}", other)))
        }
    };
    if let Some(f) = fixtures
        .iter()
        .find(|f| f.home_id as usize >= team_count || f.away_id as usize >= team_count)
    {
        return Err(CareerError::MalformedData(format!(
            "fixture {} names a team outside 0..{}",
            f.id, team_count
        )));
    }
    // A legacy second half means the season was a double round-robin
    let pairings: BTreeSet<(u32, u32)> = fixtures.iter().map(|f| (f.home_id, f.away_id)).collect();
    if pairings.iter().any(|&(h, a)| pairings.contains(&(a, h))) {
        config.rounds = config.rounds.max(2);
    }

    if obj.contains_key("table") {
        log::info!("Discarding v0 table, rebuilding from fixtures");
    }
    let table = rebuild_table(&team_names, &fixtures, &config.points)?;

    let user_team_id = obj
        .get("user_team_id")
        .and_then(Value::as_u64)
        .and_then(|t| u32::try_from(t).ok())
        .filter(|&t| (t as usize) < team_count);

    let career = Career {
        seed,
        week,
        team_names,
        team_colors,
        rosters,
        fixtures,
        table,
        user_team_id,
        config,
    };
    let body = serde_json::to_value(&career)?;
    Ok(json!({ "schema_version": 1, "career": body }))
}

/// Team records ordered by team id. Accepts a `teams` list or, failing
/// that, a bare `team_names` list.
fn legacy_teams(obj: &mut Map<String, Value>) -> Result<Vec<Map<String, Value>>> {
    if let Some(Value::Array(items)) = obj.remove("teams") {
        let mut teams: Vec<(u32, Map<String, Value>)> = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let team = match item {
                Value::Object(map) => map,
                other => {
                    return Err(CareerError::MalformedData(format!("teams[{}]: {}", index, other)))
                }
            };
            let tid = ["tid", "id", "team_id"]
                .iter()
                .find_map(|k| team.get(*k).and_then(Value::as_u64))
                .unwrap_or(index as u64) as u32;
            teams.push((tid, team));
        }
        teams.sort_by_key(|(tid, _)| *tid);
        if teams.iter().enumerate().any(|(i, (tid, _))| *tid != i as u32) {
            return Err(CareerError::MalformedData(
                "teams: ids must run 0..n without gaps".into(),
            ));
        }
        return Ok(teams.into_iter().map(|(_, t)| t).collect());
    }

    match obj.get("team_names") {
        Some(Value::Array(names)) => Ok(names
            .iter()
            .map(|n| {
                let mut team = Map::new();
                team.insert("name".into(), n.clone());
                team
            })
            .collect()),
        _ => Err(CareerError::MalformedData("v0 career has neither teams nor team_names".into())),
    }
}

fn parse_color(v: &Value) -> Result<Rgb> {
    let parts: Option<Vec<u8>> = v
        .as_array()
        .filter(|a| a.len() == 3)
        .map(|a| a.iter().filter_map(|c| c.as_u64().and_then(|c| u8::try_from(c).ok())).collect());
    match parts.as_deref() {
        Some(&[r, g, b]) => Ok((r, g, b)),
        _ => Err(CareerError::MalformedData(format!("color: expected [r, g, b], got {}", v))),
    }
}
