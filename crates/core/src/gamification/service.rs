//! Gamification aggregation logic.

use std::collections::BTreeSet;

use super::types::{ChallengeProgress, ChallengeStatus, GamificationSummary, Tier};

/// Static challenge catalog: (challenge id, badge label).
///
/// Seeded challenges known to the product; anything else gets a generic
/// badge label derived from its id.
const CHALLENGE_CATALOG: &[(&str, &str)] = &[
    ("first-trade", "First Trade"),
    ("journal-week", "Journal Week"),
    ("risk-discipline", "Risk Discipline"),
    ("green-month", "Green Month"),
    ("plan-follower", "Plan Follower"),
];

/// Streak badge thresholds on per-challenge green process days.
const STREAK_BADGES: &[(u32, &str)] = &[
    (7, "7-Day Process Streak"),
    (15, "15-Day Process Streak"),
    (30, "30-Day Process Streak"),
];

/// Returns the badge label for a completed challenge.
#[must_use]
pub fn badge_for_challenge(challenge_id: &str) -> String {
    CHALLENGE_CATALOG
        .iter()
        .find(|(id, _)| *id == challenge_id)
        .map_or_else(
            || format!("Challenge: {challenge_id}"),
            |(_, label)| (*label).to_string(),
        )
}

/// Gamification aggregation service.
pub struct GamificationService;

impl GamificationService {
    /// Total XP across completed challenge records.
    ///
    /// Only `Completed` records count: completed rows are immutable, which
    /// keeps cumulative XP monotonically non-decreasing.
    #[must_use]
    pub fn total_xp(records: &[ChallengeProgress]) -> u32 {
        records
            .iter()
            .filter(|r| r.status == ChallengeStatus::Completed)
            .map(|r| r.xp_earned)
            .sum()
    }

    /// Level as a step function of cumulative XP.
    ///
    /// Boundaries are inclusive at the step: 1000 XP is level 2,
    /// 7000 XP is level 4.
    #[must_use]
    pub const fn level_for_xp(xp: u32) -> u8 {
        match xp {
            0..=999 => 1,
            1000..=2999 => 2,
            3000..=6999 => 3,
            _ => 4,
        }
    }

    /// Tier for a level. Levels outside 1..=4 clamp to the nearest tier.
    #[must_use]
    pub const fn tier_for_level(level: u8) -> Tier {
        match level {
            0 | 1 => Tier::Bronze,
            2 => Tier::Silver,
            3 => Tier::Gold,
            _ => Tier::Elite,
        }
    }

    /// Badges earned from challenge progress.
    ///
    /// One badge per distinct completed challenge plus streak badges at
    /// fixed green-day thresholds, evaluated independently per record.
    #[must_use]
    pub fn badges(records: &[ChallengeProgress]) -> BTreeSet<String> {
        let mut badges = BTreeSet::new();

        for record in records {
            if record.status == ChallengeStatus::Completed {
                badges.insert(badge_for_challenge(&record.challenge_id));
            }
            for (threshold, label) in STREAK_BADGES {
                if record.process_green_days >= *threshold {
                    badges.insert((*label).to_string());
                }
            }
        }

        badges
    }

    /// Full summary for a set of progress records.
    #[must_use]
    pub fn summarize(records: &[ChallengeProgress]) -> GamificationSummary {
        let xp = Self::total_xp(records);
        let level = Self::level_for_xp(xp);
        GamificationSummary {
            xp,
            level,
            tier: Self::tier_for_level(level),
            badges: Self::badges(records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn completed(id: &str, xp: u32, green: u32) -> ChallengeProgress {
        ChallengeProgress {
            challenge_id: id.to_string(),
            status: ChallengeStatus::Completed,
            xp_earned: xp,
            process_green_days: green,
        }
    }

    fn active(id: &str, xp: u32, green: u32) -> ChallengeProgress {
        ChallengeProgress {
            challenge_id: id.to_string(),
            status: ChallengeStatus::Active,
            xp_earned: xp,
            process_green_days: green,
        }
    }

    #[rstest]
    #[case(0, 1, Tier::Bronze)]
    #[case(999, 1, Tier::Bronze)]
    #[case(1000, 2, Tier::Silver)]
    #[case(2999, 2, Tier::Silver)]
    #[case(3000, 3, Tier::Gold)]
    #[case(6999, 3, Tier::Gold)]
    #[case(7000, 4, Tier::Elite)]
    #[case(50_000, 4, Tier::Elite)]
    fn test_level_and_tier_boundaries(#[case] xp: u32, #[case] level: u8, #[case] tier: Tier) {
        assert_eq!(GamificationService::level_for_xp(xp), level);
        assert_eq!(GamificationService::tier_for_level(level), tier);
    }

    #[test]
    fn test_xp_counts_completed_only() {
        let records = [
            completed("first-trade", 500, 0),
            active("journal-week", 300, 0),
            completed("risk-discipline", 700, 0),
        ];
        assert_eq!(GamificationService::total_xp(&records), 1200);
    }

    #[test]
    fn test_badges_for_completed_challenges() {
        let records = [
            completed("first-trade", 100, 0),
            completed("unlisted-challenge", 100, 0),
            active("journal-week", 0, 0),
        ];
        let badges = GamificationService::badges(&records);
        assert!(badges.contains("First Trade"));
        assert!(badges.contains("Challenge: unlisted-challenge"));
        assert!(!badges.iter().any(|b| b.contains("Journal Week")));
    }

    #[test]
    fn test_streak_badges_at_thresholds() {
        let records = [active("journal-week", 0, 16)];
        let badges = GamificationService::badges(&records);
        assert!(badges.contains("7-Day Process Streak"));
        assert!(badges.contains("15-Day Process Streak"));
        assert!(!badges.contains("30-Day Process Streak"));
    }

    #[test]
    fn test_badges_deduplicated_across_records() {
        let records = [
            active("a", 0, 8),
            active("b", 0, 9),
            completed("first-trade", 10, 0),
            completed("first-trade", 10, 0),
        ];
        let badges = GamificationService::badges(&records);
        // One streak badge and one challenge badge, regardless of how many
        // records crossed the threshold.
        assert_eq!(
            badges.iter().filter(|b| b.contains("7-Day")).count(),
            1
        );
        assert_eq!(badges.iter().filter(|b| *b == "First Trade").count(), 1);
    }

    #[test]
    fn test_summary_shape() {
        let records = [completed("green-month", 1000, 7)];
        let summary = GamificationService::summarize(&records);
        assert_eq!(summary.xp, 1000);
        assert_eq!(summary.level, 2);
        assert_eq!(summary.tier, Tier::Silver);
        assert!(summary.badges.contains("Green Month"));
        assert!(summary.badges.contains("7-Day Process Streak"));
    }
}
