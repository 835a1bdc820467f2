//! Input Normalizer: loosely-shaped records in, canonical records out.
//!
//! Upstream sources (legacy saves, hand-written roster files, other tools)
//! spell the same field many ways. Everything downstream of this module
//! only sees [`Fighter`], [`Fixture`] and [`MatchResult`].
//!
//! Each adapter builds a canonical JSON object, checks it against the
//! required-key set for its entity, and only then decodes it into the
//! typed record.
//!
//! Key lookup tries every synonym exactly first, then case-insensitively.
//! A `null` value counts as absent.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::error::{CareerError, Result};
use crate::models::{CompKind, Fighter, Fixture, MatchResult};

/// Keys every normalized fighter record carries.
pub const FIGHTER_KEYS_REQ: &[&str] = &["pid", "team_id", "name", "hp", "max_hp", "ac", "alive"];

/// Keys every normalized fixture record carries.
pub const FIXTURE_KEYS_REQ: &[&str] = &[
    "id",
    "week",
    "home_id",
    "away_id",
    "home_goals",
    "away_goals",
    "played",
    "winner",
    "comp_kind",
];

/// Keys every normalized result record carries.
pub const RESULT_KEYS_REQ: &[&str] = &["home_id", "away_id", "k_home", "k_away", "winner"];

const PID_KEYS: &[&str] = &["pid", "id", "index"];
const TEAM_KEYS: &[&str] = &["team_id", "tid", "team"];
const NAME_KEYS: &[&str] = &["name", "n"];
const HP_KEYS: &[&str] = &["hp", "hit_points", "health"];
const MAX_HP_KEYS: &[&str] = &["max_hp", "hp_max", "maxhp"];
const AC_KEYS: &[&str] = &["ac", "armor_class", "armour_class"];
const ALIVE_KEYS: &[&str] = &["alive", "is_alive"];
const ROLE_KEYS: &[&str] = &["role", "position"];

const HOME_KEYS: &[&str] = &["home_id", "home_tid", "home", "a"];
const AWAY_KEYS: &[&str] = &["away_id", "away_tid", "away", "b"];
const HOME_SCORE_KEYS: &[&str] = &["home_goals", "k_home", "kills_home", "score_home"];
const AWAY_SCORE_KEYS: &[&str] = &["away_goals", "k_away", "kills_away", "score_away"];
const WINNER_KEYS: &[&str] = &["winner", "winner_tid", "winner_id"];
const COMP_KEYS: &[&str] = &["comp_kind", "competition"];

const DEFAULT_AC: i64 = 10;

/// Normalizes one raw fighter record.
///
/// `pid` and `team_id` fall back to the given defaults; `hp` is required.
/// `max_hp` defaults to `hp`, `ac` to 10 and `name` to `U{pid}`. Upper-case
/// numeric keys that are not otherwise consumed (STR, DEX, ...) become stats.
pub fn as_fighter(raw: &Value, default_team_id: u32, default_pid: u32) -> Result<Fighter> {
    let obj = as_object(raw, "fighter")?;
    let mut consumed = BTreeSet::new();

    let pid = match lookup(obj, PID_KEYS, &mut consumed) {
        Some(v) => to_u32(v, "fighter.pid")?,
        None => default_pid,
    };
    let team_id = match lookup(obj, TEAM_KEYS, &mut consumed) {
        Some(v) => to_u32(v, "fighter.team_id")?,
        None => default_team_id,
    };
    let name = match lookup(obj, NAME_KEYS, &mut consumed) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => format!("U{}", pid),
    };

    let mut hp = match lookup(obj, HP_KEYS, &mut consumed) {
        Some(v) => to_i64(v, "fighter.hp")?.max(0),
        None => return Err(CareerError::MissingField { entity: "fighter", field: "hp" }),
    };
    let max_hp = match lookup(obj, MAX_HP_KEYS, &mut consumed) {
        Some(v) => to_i64(v, "fighter.max_hp")?,
        None => hp.max(1),
    };
    if max_hp <= 0 {
        return Err(CareerError::MalformedData(format!(
            "fighter {}: max_hp must be positive, got {}",
            pid, max_hp
        )));
    }
    hp = hp.min(max_hp);

    let ac = match lookup(obj, AC_KEYS, &mut consumed) {
        Some(v) => to_i64(v, "fighter.ac")?,
        None => DEFAULT_AC,
    };

    // An explicit `alive: false` wins over a positive hp
    let alive_flag = match lookup(obj, ALIVE_KEYS, &mut consumed) {
        Some(v) => to_bool(v, "fighter.alive")?,
        None => true,
    };
    if !alive_flag {
        hp = 0;
    }

    let role = lookup(obj, ROLE_KEYS, &mut consumed).and_then(|v| v.as_str().map(str::to_string));

    let mut record = Map::new();
    record.insert("pid".into(), json!(pid));
    record.insert("team_id".into(), json!(team_id));
    record.insert("name".into(), json!(name));
    record.insert("hp".into(), json!(hp));
    record.insert("max_hp".into(), json!(max_hp));
    record.insert("ac".into(), json!(ac));
    record.insert("alive".into(), json!(hp > 0));
    if let Some(role) = role {
        record.insert("role".into(), json!(role));
    }

    let stats: Map<String, Value> = obj
        .iter()
        .filter(|(k, _)| !consumed.contains(k.as_str()) && is_stat_key(k))
        .filter_map(|(k, v)| integral(v).map(|n| (k.clone(), json!(n))))
        .collect();
    if !stats.is_empty() {
        record.insert("stats".into(), Value::Object(stats));
    }

    finish("fighter", record, FIGHTER_KEYS_REQ)
}

/// Normalizes one raw fixture record.
///
/// `home_id`/`away_id` are required. `week` defaults to 1 (a `week_index`
/// is read as 0-based), scores to 0, `played` to false and `comp_kind` to
/// league. An unplayed fixture carries no scores and no winner.
pub fn as_fixture(raw: &Value) -> Result<Fixture> {
    let obj = as_object(raw, "fixture")?;
    let mut consumed = BTreeSet::new();

    let (home_id, away_id) = pairing(obj, "fixture", &mut consumed)?;

    let week = match lookup(obj, &["week"], &mut consumed) {
        Some(v) => to_u32(v, "fixture.week")?,
        None => match lookup(obj, &["week_index"], &mut consumed) {
            Some(v) => to_u32(v, "fixture.week_index")? + 1,
            None => 1,
        },
    };
    if week == 0 {
        return Err(CareerError::MalformedData("fixture.week must be at least 1".into()));
    }

    let played = match lookup(obj, &["played"], &mut consumed) {
        Some(v) => to_bool(v, "fixture.played")?,
        None => false,
    };

    let (mut home_goals, mut away_goals, mut winner) = (0, 0, None);
    if played {
        home_goals = optional_u32(obj, HOME_SCORE_KEYS, "fixture.home_goals", &mut consumed)?;
        away_goals = optional_u32(obj, AWAY_SCORE_KEYS, "fixture.away_goals", &mut consumed)?;
        winner = match lookup(obj, WINNER_KEYS, &mut consumed) {
            Some(v) => resolve_winner(v, home_id, away_id)?,
            None => None,
        };
    }

    let comp_kind = match lookup(obj, COMP_KEYS, &mut consumed) {
        Some(Value::String(s)) => CompKind::parse(s).ok_or_else(|| {
            CareerError::MalformedData(format!("fixture.comp_kind: unknown competition '{}'", s))
        })?,
        Some(other) => {
            return Err(CareerError::MalformedData(format!(
                "fixture.comp_kind: expected a string, got {}",
                other
            )))
        }
        None => CompKind::League,
    };

    let id = match lookup(obj, &["id"], &mut consumed) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => Fixture::stable_id(week, home_id, away_id),
    };

    let mut record = Map::new();
    record.insert("id".into(), json!(id));
    record.insert("week".into(), json!(week));
    record.insert("home_id".into(), json!(home_id));
    record.insert("away_id".into(), json!(away_id));
    record.insert("home_goals".into(), json!(home_goals));
    record.insert("away_goals".into(), json!(away_goals));
    record.insert("played".into(), json!(played));
    record.insert("winner".into(), json!(winner));
    record.insert("comp_kind".into(), json!(comp_kind.as_str()));

    finish("fixture", record, FIXTURE_KEYS_REQ)
}

/// Normalizes one raw match result.
///
/// Team ids, both scores and the winner are read through the same synonyms
/// as fixtures (`A`/`B`, `k_home`/`k_away`, ...). A `null` or absent
/// winner means a draw. The winner may be given as a team id, as
/// `"home"`/`"away"`, or as a legacy side index (0 = home, 1 = away).
pub fn as_result(raw: &Value) -> Result<MatchResult> {
    let obj = as_object(raw, "result")?;
    let mut consumed = BTreeSet::new();

    let (home_id, away_id) = pairing(obj, "result", &mut consumed)?;
    let k_home = match lookup(obj, HOME_SCORE_KEYS, &mut consumed) {
        Some(v) => to_u32(v, "result.k_home")?,
        None => return Err(CareerError::MissingField { entity: "result", field: "k_home" }),
    };
    let k_away = match lookup(obj, AWAY_SCORE_KEYS, &mut consumed) {
        Some(v) => to_u32(v, "result.k_away")?,
        None => return Err(CareerError::MissingField { entity: "result", field: "k_away" }),
    };
    let winner = match lookup(obj, WINNER_KEYS, &mut consumed) {
        Some(v) => resolve_winner(v, home_id, away_id)?,
        None => None,
    };

    let mut record = Map::new();
    record.insert("home_id".into(), json!(home_id));
    record.insert("away_id".into(), json!(away_id));
    record.insert("k_home".into(), json!(k_home));
    record.insert("k_away".into(), json!(k_away));
    record.insert("winner".into(), json!(winner));

    let result: MatchResult = finish("result", record, RESULT_KEYS_REQ)?;
    result.validate()?;
    Ok(result)
}

/// Normalizes a whole roster for `team_id`.
///
/// Every fighter is forced onto `team_id`; records without an identity
/// get their list index as pid. Duplicate pids are rejected.
pub fn roster_from_records(records: &[Value], team_id: u32) -> Result<Vec<Fighter>> {
    let mut seen = BTreeSet::new();
    let mut roster = Vec::with_capacity(records.len());
    for (index, raw) in records.iter().enumerate() {
        let mut fighter = as_fighter(raw, team_id, index as u32)?;
        fighter.team_id = team_id;
        if !seen.insert(fighter.pid) {
            return Err(CareerError::MalformedData(format!(
                "roster for team {} repeats pid {}",
                team_id, fighter.pid
            )));
        }
        roster.push(fighter);
    }
    Ok(roster)
}

/// Fails with `MissingField` on the first required key absent from `record`.
pub fn check_required(
    entity: &'static str,
    record: &Map<String, Value>,
    required: &[&'static str],
) -> Result<()> {
    match required.iter().find(|k| !record.contains_key(**k)) {
        Some(&field) => Err(CareerError::MissingField { entity, field }),
        None => Ok(()),
    }
}

fn finish<T: DeserializeOwned>(
    entity: &'static str,
    record: Map<String, Value>,
    required: &[&'static str],
) -> Result<T> {
    check_required(entity, &record, required)?;
    serde_json::from_value(Value::Object(record))
        .map_err(|e| CareerError::MalformedData(format!("{}: {}", entity, e)))
}

fn as_object<'a>(raw: &'a Value, entity: &str) -> Result<&'a Map<String, Value>> {
    raw.as_object().ok_or_else(|| {
        CareerError::MalformedData(format!("{} record must be an object, got {}", entity, raw))
    })
}

fn pairing(
    obj: &Map<String, Value>,
    entity: &'static str,
    consumed: &mut BTreeSet<String>,
) -> Result<(u32, u32)> {
    let home_id = match lookup(obj, HOME_KEYS, consumed) {
        Some(v) => to_u32(v, "home_id")?,
        None => return Err(CareerError::MissingField { entity, field: "home_id" }),
    };
    let away_id = match lookup(obj, AWAY_KEYS, consumed) {
        Some(v) => to_u32(v, "away_id")?,
        None => return Err(CareerError::MissingField { entity, field: "away_id" }),
    };
    if home_id == away_id {
        return Err(CareerError::MalformedData(format!(
            "{}: team {} cannot play itself",
            entity, home_id
        )));
    }
    Ok((home_id, away_id))
}

/// First non-null value under any of `keys`; exact spelling beats case-folded.
fn lookup<'a>(
    obj: &'a Map<String, Value>,
    keys: &[&str],
    consumed: &mut BTreeSet<String>,
) -> Option<&'a Value> {
    for key in keys {
        if let Some(v) = obj.get(*key) {
            if !v.is_null() {
                consumed.insert((*key).to_string());
                return Some(v);
            }
        }
    }
    for key in keys {
        if let Some((k, v)) = obj
            .iter()
            .find(|(k, v)| k.eq_ignore_ascii_case(key) && !v.is_null())
        {
            consumed.insert(k.clone());
            return Some(v);
        }
    }
    None
}

fn optional_u32(
    obj: &Map<String, Value>,
    keys: &[&str],
    what: &str,
    consumed: &mut BTreeSet<String>,
) -> Result<u32> {
    match lookup(obj, keys, consumed) {
        Some(v) => to_u32(v, what),
        None => Ok(0),
    }
}

fn resolve_winner(v: &Value, home_id: u32, away_id: u32) -> Result<Option<u32>> {
    if let Some(s) = v.as_str() {
        return match s.trim().to_ascii_lowercase().as_str() {
            "" | "draw" | "none" => Ok(None),
            "home" => Ok(Some(home_id)),
            "away" => Ok(Some(away_id)),
            other => match other.parse::<i64>() {
                Ok(n) => winner_from_number(n, home_id, away_id),
                Err(_) => Err(CareerError::MalformedData(format!("winner: unrecognized '{}'", s))),
            },
        };
    }
    match integral(v) {
        Some(n) => winner_from_number(n, home_id, away_id),
        None => Err(CareerError::MalformedData(format!("winner: unrecognized {}", v))),
    }
}

fn winner_from_number(n: i64, home_id: u32, away_id: u32) -> Result<Option<u32>> {
    if n < 0 {
        return Ok(None);
    }
    if n == home_id as i64 || n == away_id as i64 {
        return Ok(Some(n as u32));
    }
    match n {
        0 => Ok(Some(home_id)),
        1 => Ok(Some(away_id)),
        _ => Err(CareerError::MalformedData(format!(
            "winner {} is neither {} nor {}",
            n, home_id, away_id
        ))),
    }
}

fn is_stat_key(k: &str) -> bool {
    k.chars().any(|c| c.is_ascii_uppercase())
        && k.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Integer view of a JSON number or numeric string; integral floats allowed.
fn integral(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_i64(v: &Value, what: &str) -> Result<i64> {
    integral(v).ok_or_else(|| CareerError::MalformedData(format!("{}: expected an integer, got {}", what, v)))
}

fn to_u32(v: &Value, what: &str) -> Result<u32> {
    let n = to_i64(v, what)?;
    u32::try_from(n).map_err(|_| CareerError::MalformedData(format!("{}: {} is out of range", what, n)))
}

fn to_bool(v: &Value, what: &str) -> Result<bool> {
    match v {
        Value::Bool(b) => Ok(*b),
        Value::Number(_) => integral(v)
            .map(|n| n != 0)
            .ok_or_else(|| CareerError::MalformedData(format!("{}: expected a boolean, got {}", what, v))),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(CareerError::MalformedData(format!("{}: expected a boolean, got {}", what, v))),
        },
        _ => Err(CareerError::MalformedData(format!("{}: expected a boolean, got {}", what, v))),
    }
}
