//! Quote lifecycle state machine.
//!
//! The transition table here is the single source of truth for which
//! status changes are legal. No caller may special-case a transition
//! outside this table; adding a state means touching this module, not
//! N call sites.
//!
//! Expiry is not a table-driven transition: a quote's effective state
//! for approval is computed lazily from `quote_valid_until` at decision
//! time (see [`check_approval`]). A sweeper that flips stale quotes to
//! `Expired` for notification purposes would be cosmetic and lives
//! outside this module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{WorksmithError, WorksmithResult};
use crate::models::quote::Quote;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QuoteStatus {
    Draft,
    Submitted,
    InformationRequested,
    Quoted,
    UnderDiscussion,
    Approved,
    Declined,
    Expired,
    Converted,
}

/// All status values, for exhaustive table checks.
pub const ALL_STATUSES: [QuoteStatus; 9] = [
    QuoteStatus::Draft,
    QuoteStatus::Submitted,
    QuoteStatus::InformationRequested,
    QuoteStatus::Quoted,
    QuoteStatus::UnderDiscussion,
    QuoteStatus::Approved,
    QuoteStatus::Declined,
    QuoteStatus::Expired,
    QuoteStatus::Converted,
];

impl QuoteStatus {
    /// Legal transition targets from this status.
    pub fn allowed_targets(&self) -> &'static [QuoteStatus] {
        use QuoteStatus::*;
        match self {
            Draft => &[Submitted],
            Submitted => &[InformationRequested, Quoted, Declined],
            InformationRequested => &[Submitted],
            Quoted => &[Approved, Declined, UnderDiscussion, Expired],
            UnderDiscussion => &[Quoted],
            // Renewal: an expired quote can be re-quoted.
            Expired => &[Quoted],
            Approved => &[Converted],
            // Terminal.
            Declined | Converted => &[],
        }
    }

    pub fn can_transition_to(&self, target: QuoteStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "Draft",
            QuoteStatus::Submitted => "Submitted",
            QuoteStatus::InformationRequested => "InformationRequested",
            QuoteStatus::Quoted => "Quoted",
            QuoteStatus::UnderDiscussion => "UnderDiscussion",
            QuoteStatus::Approved => "Approved",
            QuoteStatus::Declined => "Declined",
            QuoteStatus::Expired => "Expired",
            QuoteStatus::Converted => "Converted",
        }
    }
}

/// Check that `from -> to` appears in the transition table.
pub fn check_transition(from: QuoteStatus, to: QuoteStatus) -> WorksmithResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(WorksmithError::InvalidTransition {
            from: from.as_str().into(),
            to: to.as_str().into(),
        })
    }
}

/// Approval precondition: `Quoted` status and a validity window that
/// has not passed.
///
/// A lapsed window yields [`WorksmithError::QuoteExpired`] rather than
/// the generic `InvalidTransition`, because the caller-visible remedy
/// differs (request a renewal vs. fix a bad request).
pub fn check_approval(quote: &Quote, now: DateTime<Utc>) -> WorksmithResult<()> {
    check_transition(quote.status, QuoteStatus::Approved)?;
    if quote.is_past_validity(now) {
        return Err(WorksmithError::QuoteExpired);
    }
    Ok(())
}

/// Conversion precondition: `Approved` status and no work order yet.
///
/// A quote that already holds a work-order id reports
/// [`WorksmithError::AlreadyConverted`] regardless of status, so a
/// repeated conversion is never mistaken for a state error.
pub fn check_conversion(quote: &Quote) -> WorksmithResult<()> {
    if quote.converted_to_work_order_id.is_some() {
        return Err(WorksmithError::AlreadyConverted);
    }
    check_transition(quote.status, QuoteStatus::Converted)
}
