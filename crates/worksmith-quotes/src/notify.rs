//! Lifecycle notification events.
//!
//! Every successful lifecycle transition produces one event for
//! downstream delivery (email/SMS/in-app). Delivery is somebody
//! else's problem: publishing is fire-and-forget and must never roll
//! back or fail the transition that produced it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use worksmith_core::lifecycle::QuoteStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventKind {
    Submitted,
    InformationRequested,
    Quoted,
    UnderDiscussion,
    Approved,
    Declined,
    Converted,
    /// Reserved for a validity-window sweeper; the engine itself never
    /// emits it.
    Expiring,
    Expired,
}

impl EventKind {
    /// The event a transition *into* `status` produces, if any
    /// (entering `Draft` is silent).
    pub fn for_status(status: QuoteStatus) -> Option<EventKind> {
        match status {
            QuoteStatus::Draft => None,
            QuoteStatus::Submitted => Some(EventKind::Submitted),
            QuoteStatus::InformationRequested => Some(EventKind::InformationRequested),
            QuoteStatus::Quoted => Some(EventKind::Quoted),
            QuoteStatus::UnderDiscussion => Some(EventKind::UnderDiscussion),
            QuoteStatus::Approved => Some(EventKind::Approved),
            QuoteStatus::Declined => Some(EventKind::Declined),
            QuoteStatus::Expired => Some(EventKind::Expired),
            QuoteStatus::Converted => Some(EventKind::Converted),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub tenant_id: Uuid,
    pub quote_id: Uuid,
    pub kind: EventKind,
}

/// Destination for lifecycle notification events.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: NotificationEvent);
}

/// Default sink: a structured `tracing` event.
#[derive(Debug, Clone, Default)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn publish(&self, event: NotificationEvent) {
        tracing::info!(
            tenant_id = %event.tenant_id,
            quote_id = %event.quote_id,
            kind = ?event.kind,
            "quote lifecycle notification"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_is_silent() {
        assert_eq!(EventKind::for_status(QuoteStatus::Draft), None);
    }

    #[test]
    fn every_other_status_maps_to_an_event() {
        use worksmith_core::lifecycle::ALL_STATUSES;
        for status in ALL_STATUSES {
            if status != QuoteStatus::Draft {
                assert!(EventKind::for_status(status).is_some(), "{status:?}");
            }
        }
    }
}
