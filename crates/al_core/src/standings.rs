//! Standings: folding results into the table and ordering it.
//!
//! Ordering:
//! 1. points (desc)
//! 2. goal difference (desc)
//! 3. head-to-head points inside the tied cluster (desc)
//! 4. goals for (desc)
//! 5. team id (asc)

use std::collections::BTreeMap;

use crate::config::PointsSystem;
use crate::error::{CareerError, Result};
use crate::models::{Fixture, MatchResult, Outcome, Table, TableRow};

pub fn new_table(team_names: &[String]) -> Table {
    team_names
        .iter()
        .enumerate()
        .map(|(tid, name)| (tid as u32, TableRow::new(tid as u32, name.clone())))
        .collect()
}

/// Folds one result into both teams' rows.
pub fn apply_result(table: &mut Table, result: &MatchResult, points: &PointsSystem) -> Result<()> {
    result.validate()?;
    for team_id in [result.home_id, result.away_id] {
        if !table.contains_key(&team_id) {
            return Err(CareerError::SimulationInvariant(format!(
                "no table row for team {}",
                team_id
            )));
        }
    }

    // outcome_for is Some for both participants
    let home_outcome = result.outcome_for(result.home_id).unwrap_or(Outcome::Draw);
    let away_outcome = result.outcome_for(result.away_id).unwrap_or(Outcome::Draw);

    if let Some(row) = table.get_mut(&result.home_id) {
        row.record(result.k_home, result.k_away, home_outcome, points);
    }
    if let Some(row) = table.get_mut(&result.away_id) {
        row.record(result.k_away, result.k_home, away_outcome, points);
    }
    Ok(())
}

/// Fresh table replayed from every played fixture.
pub fn rebuild_table(
    team_names: &[String],
    fixtures: &[Fixture],
    points: &PointsSystem,
) -> Result<Table> {
    let mut table = new_table(team_names);
    for fx in fixtures.iter().filter(|f| f.played) {
        let result = MatchResult::new(fx.home_id, fx.away_id, fx.home_goals, fx.away_goals, fx.winner);
        apply_result(&mut table, &result, points)?;
    }
    Ok(table)
}

/// Rows in standings order.
pub fn sorted_standings<'a>(
    table: &'a Table,
    fixtures: &[Fixture],
    points: &PointsSystem,
) -> Vec<&'a TableRow> {
    let mut rows: Vec<&TableRow> = table.values().collect();
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_diff().cmp(&a.goal_diff()))
            .then(b.goals_for.cmp(&a.goals_for))
            .then(a.team_id.cmp(&b.team_id))
    });

    let mut out = Vec::with_capacity(rows.len());
    let mut i = 0;
    while i < rows.len() {
        let mut j = i + 1;
        while j < rows.len()
            && rows[j].points == rows[i].points
            && rows[j].goal_diff() == rows[i].goal_diff()
        {
            j += 1;
        }

        let mut cluster = rows[i..j].to_vec();
        if cluster.len() > 1 {
            let ids: Vec<u32> = cluster.iter().map(|r| r.team_id).collect();
            let h2h = head_to_head_points(&ids, fixtures, points);
            cluster.sort_by(|a, b| {
                let ha = h2h.get(&a.team_id).copied().unwrap_or(0);
                let hb = h2h.get(&b.team_id).copied().unwrap_or(0);
                hb.cmp(&ha)
                    .then(b.goals_for.cmp(&a.goals_for))
                    .then(a.team_id.cmp(&b.team_id))
            });
        }
        out.extend(cluster);
        i = j;
    }
    out
}

/// Points each team earned in played fixtures against other members of `group`.
pub fn head_to_head_points(
    group: &[u32],
    fixtures: &[Fixture],
    points: &PointsSystem,
) -> BTreeMap<u32, u32> {
    let mut scores: BTreeMap<u32, u32> = group.iter().map(|&t| (t, 0)).collect();
    for fx in fixtures
        .iter()
        .filter(|f| f.played && group.contains(&f.home_id) && group.contains(&f.away_id))
    {
        for team in [fx.home_id, fx.away_id] {
            let earned = match fx.outcome_for(team) {
                Some(Outcome::Win) => points.win,
                Some(Outcome::Draw) => points.draw,
                Some(Outcome::Loss) => points.loss,
                None => 0,
            };
            *scores.entry(team).or_default() += earned;
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Team {}", i)).collect()
    }

    fn played(week: u32, home: u32, away: u32, kh: u32, ka: u32) -> Fixture {
        let mut fx = Fixture::new(week, home, away);
        fx.record(&MatchResult::from_scores(home, away, kh, ka)).unwrap();
        fx
    }

    #[test]
    fn test_draw_updates_both_rows() {
        let pts = PointsSystem::default();
        let mut table = new_table(&names(10));
        apply_result(&mut table, &MatchResult::new(1, 9, 2, 2, None), &pts).unwrap();

        for tid in [1, 9] {
            let row = &table[&tid];
            assert_eq!((row.played, row.wins, row.draws, row.losses), (1, 0, 1, 0));
            assert_eq!(row.points, 1);
            assert_eq!((row.goals_for, row.goals_against), (2, 2));
        }
        assert_eq!(table[&0].played, 0);
    }

    #[test]
    fn test_winner_decides_outcome_not_damage() {
        // Eliminating the other side wins even when it dealt less damage
        let pts = PointsSystem::default();
        let mut table = new_table(&names(2));
        apply_result(&mut table, &MatchResult::new(0, 1, 9, 15, Some(0)), &pts).unwrap();
        assert_eq!(table[&0].wins, 1);
        assert_eq!(table[&0].points, 3);
        assert_eq!(table[&1].losses, 1);
        assert_eq!(table[&1].goals_for, 15);
    }

    #[test]
    fn test_unknown_team_is_invariant_error() {
        let pts = PointsSystem::default();
        let mut table = new_table(&names(2));
        let err = apply_result(&mut table, &MatchResult::new(0, 5, 1, 0, Some(0)), &pts).unwrap_err();
        assert!(matches!(err, CareerError::SimulationInvariant(_)));
        assert_eq!(table[&0].played, 0, "no partial update");
    }

    #[test]
    fn test_circular_tie_falls_back_to_goals_for_then_id() {
        let pts = PointsSystem::default();
        let fixtures = vec![
            played(1, 1, 2, 2, 0),
            played(2, 2, 3, 2, 0),
            played(3, 3, 1, 2, 0),
        ];
        let table = rebuild_table(&names(4), &fixtures, &pts).unwrap();
        let order: Vec<u32> = sorted_standings(&table, &fixtures, &pts)
            .iter()
            .map(|r| r.team_id)
            .collect();
        assert_eq!(order, vec![1, 2, 3, 0]);
        let total: u32 = table.values().map(|r| r.points).sum();
        assert_eq!(total, 9);
    }

    #[test]
    fn test_head_to_head_beats_goals_for() {
        let pts = PointsSystem::default();
        // 0 and 1 finish level on points and goal difference. 0 scored
        // more overall but 1 won the direct meeting.
        let fixtures = vec![
            played(1, 0, 1, 3, 4),
            played(2, 0, 2, 3, 2),
            played(3, 1, 3, 0, 1),
        ];
        let table = rebuild_table(&names(4), &fixtures, &pts).unwrap();
        assert_eq!(table[&0].points, table[&1].points);
        assert_eq!(table[&0].goal_diff(), table[&1].goal_diff());
        assert!(table[&0].goals_for > table[&1].goals_for);

        let order: Vec<u32> = sorted_standings(&table, &fixtures, &pts)
            .iter()
            .map(|r| r.team_id)
            .collect();
        assert_eq!(order, vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_rebuild_matches_incremental() {
        let pts = PointsSystem::default();
        let fixtures = vec![played(1, 0, 1, 5, 5), played(1, 2, 3, 7, 1)];
        let rebuilt = rebuild_table(&names(4), &fixtures, &pts).unwrap();

        let mut incremental = new_table(&names(4));
        apply_result(&mut incremental, &MatchResult::from_scores(0, 1, 5, 5), &pts).unwrap();
        apply_result(&mut incremental, &MatchResult::from_scores(2, 3, 7, 1), &pts).unwrap();
        assert_eq!(rebuilt, incremental);
    }
}
