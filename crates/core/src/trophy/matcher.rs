//! Trophy rule evaluation against user counters.

use std::collections::{HashMap, HashSet};

use super::types::TrophyDef;

/// Normalizes a free-text rule key to a counter-map key.
///
/// Lowercases, collapses whitespace and hyphens to single underscores, and
/// strips anything outside `[a-z0-9_]`, so that "Green Days", "green-days"
/// and "green_days" all address the same counter.
#[must_use]
pub fn normalize_rule_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_sep = false;

    for ch in raw.trim().chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_sep = false;
        } else if (ch.is_ascii_whitespace() || ch == '-' || ch == '_') && !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
        // anything else is dropped
    }

    // a trailing separator from e.g. "green days " is noise
    if out.ends_with('_') {
        out.pop();
    }
    out
}

/// Evaluates trophy rules against a counters map.
pub struct TrophyMatcher;

impl TrophyMatcher {
    /// Returns the catalog entries newly satisfied by `counters`.
    ///
    /// Rules already present in `earned` are skipped, which makes a repeated
    /// sync with unchanged counters a no-op. A rule whose key has no counter
    /// reads as 0.
    #[must_use]
    pub fn match_rules<'a>(
        catalog: &'a [TrophyDef],
        counters: &HashMap<String, i64>,
        earned: &HashSet<String>,
    ) -> Vec<&'a TrophyDef> {
        catalog
            .iter()
            .filter(|def| !earned.contains(&def.id))
            .filter(|def| {
                let key = normalize_rule_key(&def.rule_key);
                let counter = counters.get(&key).copied().unwrap_or(0);
                def.rule_op.evaluate(counter, def.rule_value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trophy::RuleOp;
    use rstest::rstest;

    fn def(id: &str, key: &str, op: RuleOp, value: i64) -> TrophyDef {
        TrophyDef {
            id: id.to_string(),
            tier: "bronze".to_string(),
            xp: 100,
            rule_key: key.to_string(),
            rule_op: op,
            rule_value: value,
        }
    }

    #[rstest]
    #[case("Green Days", "green_days")]
    #[case("green-days", "green_days")]
    #[case("  Total   P&L wins ", "total_pl_wins")]
    #[case("journal_entries", "journal_entries")]
    #[case("Émotions!", "motions")]
    fn test_normalize_rule_key(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_rule_key(raw), expected);
    }

    #[test]
    fn test_op_parse_defaults_to_gte() {
        assert_eq!(RuleOp::parse_or_default("eq"), RuleOp::Eq);
        assert_eq!(RuleOp::parse_or_default("LTE"), RuleOp::Lte);
        assert_eq!(RuleOp::parse_or_default("gte"), RuleOp::Gte);
        assert_eq!(RuleOp::parse_or_default("between"), RuleOp::Gte);
    }

    #[test]
    fn test_match_skips_earned() {
        let catalog = vec![
            def("t1", "journal_entries", RuleOp::Gte, 10),
            def("t2", "journal_entries", RuleOp::Gte, 50),
        ];
        let counters = HashMap::from([("journal_entries".to_string(), 60)]);
        let earned = HashSet::from(["t1".to_string()]);

        let matched = TrophyMatcher::match_rules(&catalog, &counters, &earned);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "t2");
    }

    #[test]
    fn test_match_is_idempotent_once_earned() {
        let catalog = vec![def("t1", "green days", RuleOp::Gte, 7)];
        let counters = HashMap::from([("green_days".to_string(), 9)]);

        let first = TrophyMatcher::match_rules(&catalog, &counters, &HashSet::new());
        assert_eq!(first.len(), 1);

        // second run with the first batch recorded as earned
        let earned: HashSet<String> = first.iter().map(|d| d.id.clone()).collect();
        let second = TrophyMatcher::match_rules(&catalog, &counters, &earned);
        assert!(second.is_empty());
    }

    #[test]
    fn test_missing_counter_reads_zero() {
        let catalog = vec![
            def("gte", "absent", RuleOp::Gte, 1),
            def("lte", "absent", RuleOp::Lte, 1),
            def("eq", "absent", RuleOp::Eq, 0),
        ];
        let matched = TrophyMatcher::match_rules(&catalog, &HashMap::new(), &HashSet::new());
        let ids: Vec<&str> = matched.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["lte", "eq"]);
    }

    #[rstest]
    #[case(RuleOp::Gte, 10, 10, true)]
    #[case(RuleOp::Gte, 9, 10, false)]
    #[case(RuleOp::Eq, 10, 10, true)]
    #[case(RuleOp::Eq, 11, 10, false)]
    #[case(RuleOp::Lte, 10, 10, true)]
    #[case(RuleOp::Lte, 11, 10, false)]
    fn test_op_evaluation(
        #[case] op: RuleOp,
        #[case] counter: i64,
        #[case] threshold: i64,
        #[case] expected: bool,
    ) {
        assert_eq!(op.evaluate(counter, threshold), expected);
    }
}
