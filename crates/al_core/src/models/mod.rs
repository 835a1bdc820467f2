pub mod fighter;
pub mod fixture;
pub mod match_result;
pub mod table;

pub use fighter::{Fighter, ABILITY_SCORE_RANGE};
pub use fixture::{CompKind, Fixture};
pub use match_result::{MatchResult, Outcome};
pub use table::{Table, TableRow};
