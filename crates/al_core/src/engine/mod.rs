pub mod combat;
pub mod rng;
pub mod week; // Week Simulator: fixtures -> combat -> table

pub use combat::{resolve_combat, CombatEvent, CombatResolver, EndReason};
pub use rng::{child_rng, derive_seed};
pub use week::{simulate_week, simulate_week_ai, simulate_week_except, WeekReport};
