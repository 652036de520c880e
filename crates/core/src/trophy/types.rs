//! Trophy catalog types.

use serde::{Deserialize, Serialize};

/// Comparison operator for trophy rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOp {
    /// Counter >= threshold.
    Gte,
    /// Counter == threshold.
    Eq,
    /// Counter <= threshold.
    Lte,
}

impl RuleOp {
    /// Parses an operator string, defaulting to `Gte` when unrecognized.
    ///
    /// Rule authors write free text; an unknown operator is treated as the
    /// common "at least" case rather than rejected.
    #[must_use]
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "eq" => Self::Eq,
            "lte" => Self::Lte,
            _ => Self::Gte,
        }
    }

    /// Evaluates `counter OP threshold`.
    #[must_use]
    pub const fn evaluate(self, counter: i64, threshold: i64) -> bool {
        match self {
            Self::Gte => counter >= threshold,
            Self::Eq => counter == threshold,
            Self::Lte => counter <= threshold,
        }
    }
}

/// A trophy rule definition from the static catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrophyDef {
    /// Trophy identifier.
    pub id: String,
    /// Display tier for the trophy.
    pub tier: String,
    /// XP awarded when earned.
    pub xp: u32,
    /// Free-text counter key the rule reads.
    pub rule_key: String,
    /// Comparison operator.
    pub rule_op: RuleOp,
    /// Threshold value.
    pub rule_value: i64,
}
