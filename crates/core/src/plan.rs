//! Subscription plan entitlements.

use serde::{Deserialize, Serialize};

/// Subscription plan.
///
/// Parsed case-insensitively from the stored plan string; anything
/// unrecognized falls back to `Base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Entry plan.
    Base,
    /// Advanced plan.
    Advanced,
    /// Pro plan.
    Pro,
}

impl Plan {
    /// Parses a plan string with `Base` fallback.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "advanced" => Self::Advanced,
            "pro" => Self::Pro,
            _ => Self::Base,
        }
    }

    /// Plan string as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Advanced => "advanced",
            Self::Pro => "pro",
        }
    }

    /// Maximum trading accounts a user on this plan may hold.
    #[must_use]
    pub const fn max_trading_accounts(self) -> usize {
        match self {
            Self::Base => 1,
            Self::Advanced | Self::Pro => 2,
        }
    }

    /// Whether the plan includes options-flow analysis.
    ///
    /// Base users can still gain access through the purchased addon flag on
    /// their user row.
    #[must_use]
    pub const fn includes_option_flow(self) -> bool {
        matches!(self, Self::Advanced | Self::Pro)
    }
}

/// Whether a user may use options-flow analysis.
#[must_use]
pub const fn option_flow_entitled(plan: Plan, addon_purchased: bool) -> bool {
    plan.includes_option_flow() || addon_purchased
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("base", Plan::Base)]
    #[case("Advanced", Plan::Advanced)]
    #[case("PRO", Plan::Pro)]
    #[case("enterprise", Plan::Base)]
    #[case("", Plan::Base)]
    fn test_parse_with_base_fallback(#[case] raw: &str, #[case] expected: Plan) {
        assert_eq!(Plan::parse(raw), expected);
    }

    #[test]
    fn test_account_limits() {
        assert_eq!(Plan::Base.max_trading_accounts(), 1);
        assert_eq!(Plan::Advanced.max_trading_accounts(), 2);
        assert_eq!(Plan::Pro.max_trading_accounts(), 2);
    }

    #[test]
    fn test_option_flow_entitlement() {
        assert!(option_flow_entitled(Plan::Pro, false));
        assert!(option_flow_entitled(Plan::Advanced, false));
        assert!(!option_flow_entitled(Plan::Base, false));
        assert!(option_flow_entitled(Plan::Base, true));
    }

    #[test]
    fn test_round_trip_strings() {
        for plan in [Plan::Base, Plan::Advanced, Plan::Pro] {
            assert_eq!(Plan::parse(plan.as_str()), plan);
        }
    }
}
