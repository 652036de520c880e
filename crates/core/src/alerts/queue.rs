//! One-at-a-time alert delivery queue.
//!
//! Holds events discovered by polling or realtime push for a single session.
//! Blocking (popup/voice) events are presented one at a time; pure in-app
//! events are acknowledged in bulk as soon as they are merged.

use std::collections::{HashSet, VecDeque};

use uuid::Uuid;

use super::types::{QueuedAlert, Resolution};

/// Result of merging a batch of fetched events.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// In-app event ids to mark delivered immediately.
    pub delivered_inapp: Vec<Uuid>,
    /// Number of blocking events newly queued.
    pub queued: usize,
}

/// Session-scoped delivery queue with a single-permit poll guard.
#[derive(Debug, Default)]
pub struct DeliveryQueue {
    /// Event currently presented, if any. Never displaced by a merge.
    current: Option<QueuedAlert>,
    /// Pending blocking events, newest-first.
    pending: VecDeque<QueuedAlert>,
    /// Ids of every event ever merged; dedupes re-fetched rows.
    seen: HashSet<Uuid>,
    /// Reentrancy guard for the async refresh cycle.
    poll_in_flight: bool,
}

impl DeliveryQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to start a poll cycle.
    ///
    /// Returns `false` when a cycle is already in flight; the caller must
    /// skip the refresh entirely in that case.
    pub fn begin_poll(&mut self) -> bool {
        if self.poll_in_flight {
            return false;
        }
        self.poll_in_flight = true;
        true
    }

    /// Ends the current poll cycle.
    pub fn end_poll(&mut self) {
        self.poll_in_flight = false;
    }

    /// Merges fetched events into the queue.
    ///
    /// Duplicates (by event id) are dropped. Pure in-app events are returned
    /// for bulk delivery acknowledgement; blocking events are inserted ahead
    /// of older pending ones (newest-first) without disturbing the currently
    /// presented event.
    pub fn merge(&mut self, events: Vec<QueuedAlert>) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        let mut fresh: Vec<QueuedAlert> = events
            .into_iter()
            .filter(|e| self.seen.insert(e.id))
            .collect();
        fresh.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        for event in fresh {
            if event.is_blocking() {
                // newest batch goes ahead of whatever was already waiting
                self.pending.insert(outcome.queued, event);
                outcome.queued += 1;
            } else {
                outcome.delivered_inapp.push(event.id);
            }
        }

        outcome
    }

    /// The event to present, promoting the next pending one if needed.
    pub fn current(&mut self) -> Option<&QueuedAlert> {
        if self.current.is_none() {
            self.current = self.pending.pop_front();
        }
        self.current.as_ref()
    }

    /// Resolves the currently presented event and advances.
    ///
    /// Returns the resolved event so the caller can persist the transition.
    /// No-op when nothing is presented.
    pub fn resolve_current(&mut self, resolution: Resolution) -> Option<(QueuedAlert, Resolution)> {
        let event = self.current.take()?;
        if matches!(resolution, Resolution::Snooze(_)) {
            // a snoozed event may legitimately reappear once its timer lapses
            self.seen.remove(&event.id);
        }
        Some((event, resolution))
    }

    /// Number of pending blocking events (excluding the presented one).
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{Channel, Severity};
    use chrono::{Duration, Utc};

    fn alert(channels: Vec<Channel>, age_secs: i64) -> QueuedAlert {
        QueuedAlert {
            id: Uuid::new_v4(),
            message: "alert".to_string(),
            severity: Severity::Info,
            channels,
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn test_inapp_delivered_in_bulk_popups_queued() {
        let mut queue = DeliveryQueue::new();
        let popup_old = alert(vec![Channel::Popup], 60);
        let popup_new = alert(vec![Channel::Popup], 10);
        let inapp = alert(vec![Channel::Inapp], 30);

        let outcome = queue.merge(vec![popup_old.clone(), inapp.clone(), popup_new.clone()]);

        assert_eq!(outcome.delivered_inapp, vec![inapp.id]);
        assert_eq!(outcome.queued, 2);

        // newest-first: exactly one popup shown at a time
        assert_eq!(queue.current().unwrap().id, popup_new.id);
        assert_eq!(queue.pending_len(), 1);

        queue.resolve_current(Resolution::Dismiss).unwrap();
        assert_eq!(queue.current().unwrap().id, popup_old.id);
        assert!(queue.resolve_current(Resolution::Dismiss).is_some());
        assert!(queue.current().is_none());
    }

    #[test]
    fn test_merge_dedupes_by_id() {
        let mut queue = DeliveryQueue::new();
        let event = alert(vec![Channel::Popup], 0);

        assert_eq!(queue.merge(vec![event.clone()]).queued, 1);
        assert_eq!(queue.merge(vec![event]).queued, 0);
        assert_eq!(queue.pending_len(), 1);
    }

    #[test]
    fn test_merge_does_not_displace_current() {
        let mut queue = DeliveryQueue::new();
        let first = alert(vec![Channel::Popup], 120);
        queue.merge(vec![first.clone()]);
        assert_eq!(queue.current().unwrap().id, first.id);

        // newer event arrives mid-presentation
        let newer = alert(vec![Channel::Voice], 0);
        queue.merge(vec![newer.clone()]);

        assert_eq!(queue.current().unwrap().id, first.id);
        queue.resolve_current(Resolution::Resolve).unwrap();
        assert_eq!(queue.current().unwrap().id, newer.id);
    }

    #[test]
    fn test_newer_batch_goes_ahead_of_older_pending() {
        let mut queue = DeliveryQueue::new();
        let a = alert(vec![Channel::Popup], 300);
        let b = alert(vec![Channel::Popup], 200);
        queue.merge(vec![a.clone(), b.clone()]);
        // b is newer, so it presents first; a waits
        assert_eq!(queue.current().unwrap().id, b.id);

        let c = alert(vec![Channel::Popup], 0);
        queue.merge(vec![c.clone()]);
        queue.resolve_current(Resolution::Dismiss).unwrap();
        // c (newest) jumps ahead of a
        assert_eq!(queue.current().unwrap().id, c.id);
    }

    #[test]
    fn test_poll_guard_is_single_permit() {
        let mut queue = DeliveryQueue::new();
        assert!(queue.begin_poll());
        assert!(!queue.begin_poll());
        queue.end_poll();
        assert!(queue.begin_poll());
    }

    #[test]
    fn test_snoozed_event_may_reenter() {
        let mut queue = DeliveryQueue::new();
        let event = alert(vec![Channel::Popup], 0);
        queue.merge(vec![event.clone()]);
        queue.current();
        queue
            .resolve_current(Resolution::Snooze(Duration::minutes(15)))
            .unwrap();

        // after the snooze lapses the poller fetches the same row again
        assert_eq!(queue.merge(vec![event]).queued, 1);
    }

    #[test]
    fn test_resolve_without_current_is_noop() {
        let mut queue = DeliveryQueue::new();
        assert!(queue.resolve_current(Resolution::Dismiss).is_none());
    }
}
