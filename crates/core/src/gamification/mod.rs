//! Gamification: XP aggregation, levels, tiers, and badges.

mod service;
mod types;

pub use service::{GamificationService, badge_for_challenge};
pub use types::{ChallengeProgress, ChallengeStatus, GamificationSummary, Tier};
