//! Trophy rule normalization and matching.

mod matcher;
mod types;

pub use matcher::{TrophyMatcher, normalize_rule_key};
pub use types::{RuleOp, TrophyDef};
