//! Gamification domain types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Status of a challenge progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    /// Challenge in progress.
    Active,
    /// Challenge completed; XP and counters are frozen.
    Completed,
}

/// Per-challenge progress as read from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeProgress {
    /// Challenge identifier (catalog key).
    pub challenge_id: String,
    /// Current status.
    pub status: ChallengeStatus,
    /// XP earned so far.
    pub xp_earned: u32,
    /// Count of "green process days" accumulated for this challenge.
    pub process_green_days: u32,
}

/// Discrete gamification rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// Level 1.
    Bronze,
    /// Level 2.
    Silver,
    /// Level 3.
    Gold,
    /// Level 4.
    Elite,
}

impl Tier {
    /// Tier label as shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Elite => "Elite",
        }
    }
}

/// Aggregated gamification state for a user.
#[derive(Debug, Clone, Serialize)]
pub struct GamificationSummary {
    /// Total XP from completed challenges.
    pub xp: u32,
    /// Level derived from XP (1..=4).
    pub level: u8,
    /// Tier derived from level.
    pub tier: Tier,
    /// Earned badges. A set: output is order-independent and deduplicated.
    pub badges: BTreeSet<String>,
}
