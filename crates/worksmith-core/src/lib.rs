//! Worksmith Core — domain models, error taxonomy, repository traits,
//! and the two pure decision tables at the heart of the system: tenant
//! scope enforcement and the quote lifecycle state machine.
//!
//! This crate performs no I/O. Persistence, credential mechanics, and
//! delivery are implemented against the traits defined here.

pub mod context;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod scope;

pub use context::{AuditSink, AuthorizationContext, ContextSwitchEvent, TracingAuditSink};
pub use error::{WorksmithError, WorksmithResult};
pub use lifecycle::QuoteStatus;
pub use scope::{ResourceScope, TenantFilter};
