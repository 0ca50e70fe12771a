//! Worksmith Quotes — the quote lifecycle engine.
//!
//! Scoped quote access, table-driven status transitions with lazy
//! expiry gating, exactly-once conversion to work orders, and
//! lifecycle notification events.

pub mod notify;
pub mod service;

pub use notify::{EventKind, NotificationEvent, NotificationSink, TracingNotificationSink};
pub use service::QuoteService;
