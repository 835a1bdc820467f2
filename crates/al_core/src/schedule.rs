//! Schedule Generator: round-robin fixtures by the circle method.
//!
//! One team stays fixed while the others rotate one slot per week, so a
//! round of `n` slots takes `n - 1` weeks and pairs every slot with every
//! other slot exactly once. An odd team count adds an empty slot (the bye)
//! and whoever draws it sits the week out.
//!
//! The seed only shuffles the initial slot order. Completeness does not
//! depend on it.

use rand::seq::SliceRandom;

use crate::engine::rng::child_rng;
use crate::error::{CareerError, Result};
use crate::models::Fixture;

/// Single round-robin for teams `0..team_count`.
pub fn generate_round_robin(team_count: usize, seed: u64) -> Result<Vec<Fixture>> {
    let team_ids: Vec<u32> = (0..team_count as u32).collect();
    generate_schedule(&team_ids, 1, seed)
}

/// `rounds` consecutive round-robins; odd rounds swap home and away.
///
/// Weeks are 1-based and fixtures come back sorted by (week, home, away).
pub fn generate_schedule(team_ids: &[u32], rounds: u32, seed: u64) -> Result<Vec<Fixture>> {
    if team_ids.len() < 2 {
        return Err(CareerError::InvalidTeamCount { found: team_ids.len() });
    }
    if rounds == 0 {
        return Err(CareerError::InvalidConfig("rounds must be at least 1".into()));
    }

    let mut slots: Vec<Option<u32>> = team_ids.iter().copied().map(Some).collect();
    let mut rng = child_rng(seed, &["schedule"]);
    slots.shuffle(&mut rng);
    if slots.len() % 2 == 1 {
        slots.push(None);
    }

    let weeks = circle_pairings(&slots);
    let weeks_per_round = weeks.len() as u32;

    let mut fixtures = Vec::with_capacity(weeks.len() * slots.len() / 2 * rounds as usize);
    for round in 0..rounds {
        for (w, pairs) in weeks.iter().enumerate() {
            let week = round * weeks_per_round + w as u32 + 1;
            for &(a, b) in pairs {
                let (home, away) = if round % 2 == 0 { (a, b) } else { (b, a) };
                fixtures.push(Fixture::new(week, home, away));
            }
        }
    }

    fixtures.sort_by_key(|f| (f.week, f.home_id, f.away_id));
    Ok(fixtures)
}

/// Per week, the real pairings (bye pairings dropped) as (home, away).
fn circle_pairings(slots: &[Option<u32>]) -> Vec<Vec<(u32, u32)>> {
    let n = slots.len();
    let half = n / 2;
    let fixed = slots[0];
    let mut rot: Vec<Option<u32>> = slots[1..].to_vec();

    let mut weeks = Vec::with_capacity(n - 1);
    for w in 0..n - 1 {
        let mut arr = Vec::with_capacity(n);
        arr.push(fixed);
        arr.extend_from_slice(&rot);

        let mut pairs = Vec::with_capacity(half);
        for i in 0..half {
            if let (Some(a), Some(b)) = (arr[i], arr[n - 1 - i]) {
                // Alternate venue by week so nobody is stuck at home
                if (w + i) % 2 == 0 {
                    pairs.push((a, b));
                } else {
                    pairs.push((b, a));
                }
            }
        }
        weeks.push(pairs);
        rot.rotate_right(1);
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn unordered(f: &Fixture) -> (u32, u32) {
        (f.home_id.min(f.away_id), f.home_id.max(f.away_id))
    }

    #[test]
    fn test_twenty_teams() {
        let fixtures = generate_round_robin(20, 7).unwrap();
        assert_eq!(fixtures.len(), 20 * 19 / 2);
        assert_eq!(fixtures.iter().map(|f| f.week).max(), Some(19));

        let pairs: BTreeSet<_> = fixtures.iter().map(unordered).collect();
        assert_eq!(pairs.len(), fixtures.len(), "no pairing repeats");
        assert!(fixtures.iter().all(|f| !f.played && f.week >= 1));
    }

    #[test]
    fn test_two_teams() {
        let fixtures = generate_round_robin(2, 0).unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].week, 1);
        assert_eq!(unordered(&fixtures[0]), (0, 1));
    }

    #[test]
    fn test_invalid_team_count() {
        assert!(matches!(
            generate_round_robin(1, 0),
            Err(CareerError::InvalidTeamCount { found: 1 })
        ));
        assert!(matches!(
            generate_round_robin(0, 0),
            Err(CareerError::InvalidTeamCount { found: 0 })
        ));
    }

    #[test]
    fn test_odd_count_uses_bye() {
        let fixtures = generate_round_robin(5, 11).unwrap();
        assert_eq!(fixtures.len(), 10);
        assert_eq!(fixtures.iter().map(|f| f.week).max(), Some(5));

        let mut idle_weeks: BTreeMap<u32, u32> = BTreeMap::new();
        for week in 1..=5u32 {
            let playing: BTreeSet<u32> = fixtures
                .iter()
                .filter(|f| f.week == week)
                .flat_map(|f| [f.home_id, f.away_id])
                .collect();
            assert_eq!(playing.len(), 4, "exactly one team rests in week {}", week);
            for t in (0..5).filter(|t| !playing.contains(t)) {
                *idle_weeks.entry(t).or_default() += 1;
            }
        }
        // Every team gets exactly one bye
        assert_eq!(idle_weeks.len(), 5);
        assert!(idle_weeks.values().all(|&n| n == 1));
    }

    #[test]
    fn test_double_round_robin_swaps_venues() {
        let ids: Vec<u32> = (0..6).collect();
        let fixtures = generate_schedule(&ids, 2, 3).unwrap();
        assert_eq!(fixtures.len(), 30);
        assert_eq!(fixtures.iter().map(|f| f.week).max(), Some(10));

        let ordered: BTreeSet<(u32, u32)> =
            fixtures.iter().map(|f| (f.home_id, f.away_id)).collect();
        assert_eq!(ordered.len(), 30, "each ordered pairing appears once");
    }

    #[test]
    fn test_seed_changes_order_not_completeness() {
        let a = generate_round_robin(8, 1).unwrap();
        let b = generate_round_robin(8, 2).unwrap();
        assert_ne!(a, b);

        let pa: BTreeSet<_> = a.iter().map(unordered).collect();
        let pb: BTreeSet<_> = b.iter().map(unordered).collect();
        assert_eq!(pa, pb);

        assert_eq!(a, generate_round_robin(8, 1).unwrap());
    }

    #[test]
    fn test_fixture_ids_unique() {
        let fixtures = generate_round_robin(12, 5).unwrap();
        let ids: BTreeSet<&str> = fixtures.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), fixtures.len());
    }

    proptest! {
        #[test]
        fn prop_even_schedule_complete(half in 1usize..13, seed in any::<u64>()) {
            let n = half * 2;
            let fixtures = generate_round_robin(n, seed).unwrap();

            // One fixture per unordered pair
            let pairs: BTreeSet<_> = fixtures.iter().map(unordered).collect();
            prop_assert_eq!(fixtures.len(), n * (n - 1) / 2);
            prop_assert_eq!(pairs.len(), fixtures.len());
            prop_assert!(fixtures.iter().all(|f| f.home_id != f.away_id));

            // Every team exactly once per week
            for week in 1..=(n as u32 - 1) {
                let mut seen = BTreeSet::new();
                for f in fixtures.iter().filter(|f| f.week == week) {
                    prop_assert!(seen.insert(f.home_id));
                    prop_assert!(seen.insert(f.away_id));
                }
                prop_assert_eq!(seen.len(), n);
            }
        }

        #[test]
        fn prop_odd_schedule_complete(k in 1usize..12, seed in any::<u64>()) {
            let n = k * 2 + 1;
            let fixtures = generate_round_robin(n, seed).unwrap();
            let pairs: BTreeSet<_> = fixtures.iter().map(unordered).collect();
            prop_assert_eq!(pairs.len(), n * (n - 1) / 2);
            prop_assert_eq!(fixtures.len(), pairs.len());
        }
    }
}
