//! Alert domain types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery channel for an alert event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Silent in-app notification; delivered in bulk on fetch.
    Inapp,
    /// Blocking modal shown one at a time.
    Popup,
    /// Popup plus a best-effort speech utterance.
    Voice,
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational.
    Info,
    /// Needs attention.
    Warning,
    /// Urgent.
    Critical,
}

/// Lifecycle status of an alert event.
///
/// `created -> (undelivered) -> delivered -> dismissed | snoozed`; a snoozed
/// event re-enters as undelivered once its timer lapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Live; eligible for delivery.
    Active,
    /// Closed by the user.
    Dismissed,
    /// Deferred until `snoozed_until`.
    Snoozed,
}

/// How the user closed the currently presented alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Dismiss permanently.
    Dismiss,
    /// Defer for the given duration.
    Snooze(Duration),
    /// Explicitly resolved (acted upon).
    Resolve,
}

impl Resolution {
    /// Status the event transitions to after this resolution.
    #[must_use]
    pub const fn next_status(self) -> AlertStatus {
        match self {
            Self::Dismiss | Self::Resolve => AlertStatus::Dismissed,
            Self::Snooze(_) => AlertStatus::Snoozed,
        }
    }
}

/// An alert event as held by the delivery queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedAlert {
    /// Event id.
    pub id: Uuid,
    /// Message to present.
    pub message: String,
    /// Severity.
    pub severity: Severity,
    /// Channels the event targets.
    pub channels: Vec<Channel>,
    /// Creation time; newest events are presented first.
    pub created_at: DateTime<Utc>,
}

impl QueuedAlert {
    /// Whether the event needs blocking presentation (popup or voice).
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.channels
            .iter()
            .any(|c| matches!(c, Channel::Popup | Channel::Voice))
    }

    /// Best-effort speech text for voice-channel events.
    ///
    /// Returns `None` for non-voice events; callers ignore playback failure.
    #[must_use]
    pub fn utterance(&self) -> Option<String> {
        self.channels
            .contains(&Channel::Voice)
            .then(|| self.message.clone())
    }
}

/// Whether a snoozed event's timer has lapsed and it should re-enter
/// delivery as undelivered.
#[must_use]
pub fn snooze_lapsed(snoozed_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    snoozed_until.is_some_and(|until| until <= now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_transitions() {
        assert_eq!(Resolution::Dismiss.next_status(), AlertStatus::Dismissed);
        assert_eq!(Resolution::Resolve.next_status(), AlertStatus::Dismissed);
        assert_eq!(
            Resolution::Snooze(Duration::minutes(10)).next_status(),
            AlertStatus::Snoozed
        );
    }

    #[test]
    fn test_snooze_lapse() {
        let now = Utc::now();
        assert!(!snooze_lapsed(None, now));
        assert!(!snooze_lapsed(Some(now + Duration::minutes(5)), now));
        assert!(snooze_lapsed(Some(now - Duration::seconds(1)), now));
    }

    #[test]
    fn test_utterance_only_for_voice() {
        let mut alert = QueuedAlert {
            id: Uuid::new_v4(),
            message: "SPY broke 500".to_string(),
            severity: Severity::Warning,
            channels: vec![Channel::Popup],
            created_at: Utc::now(),
        };
        assert!(alert.utterance().is_none());

        alert.channels.push(Channel::Voice);
        assert_eq!(alert.utterance().as_deref(), Some("SPY broke 500"));
    }
}
