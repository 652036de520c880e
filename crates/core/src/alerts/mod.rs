//! Alert event state machine and one-at-a-time delivery queue.

mod queue;
mod types;

pub use queue::{DeliveryQueue, MergeOutcome};
pub use types::{AlertStatus, Channel, QueuedAlert, Resolution, Severity};
