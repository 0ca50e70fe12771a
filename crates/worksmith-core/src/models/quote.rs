//! Quote domain model.
//!
//! A quote moves through the lifecycle defined in
//! [`crate::lifecycle`]; its `tenant_id` and `quote_number` are set at
//! creation and never change, and `converted_to_work_order_id` goes
//! from `None` to `Some` exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::lifecycle::QuoteStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    /// Globally unique, immutable, format `QTE-<year>-<seq>`.
    pub quote_number: String,
    /// Owning tenant. Immutable.
    pub tenant_id: Uuid,
    pub status: QuoteStatus,
    /// Email of the requesting contact. Used as the owner-email for
    /// `Client`-role scoping; stored lowercased.
    pub contact_email: String,
    pub contact_name: String,
    pub property_address: String,
    pub description: String,
    pub estimated_cost: Option<f64>,
    /// Approval is refused past this instant (checked lazily at
    /// decision time, not by a background sweep).
    pub quote_valid_until: Option<DateTime<Utc>>,
    /// Set atomically with the transition to `Converted`.
    pub converted_to_work_order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a quote.
///
/// Note the absence of `tenant_id`: the owning tenant is always
/// stamped from the caller's authorization context, never taken from
/// the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuote {
    pub contact_email: String,
    pub contact_name: String,
    pub property_address: String,
    pub description: String,
    pub estimated_cost: Option<f64>,
    pub quote_valid_until: Option<DateTime<Utc>>,
}

/// Mutable descriptive fields. Status is never updated through this
/// path — only through lifecycle transitions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateQuote {
    pub contact_name: Option<String>,
    pub property_address: Option<String>,
    pub description: Option<String>,
    pub estimated_cost: Option<f64>,
    pub quote_valid_until: Option<Option<DateTime<Utc>>>,
}

impl Quote {
    /// Whether the validity window (if any) has passed at `now`.
    pub fn is_past_validity(&self, now: DateTime<Utc>) -> bool {
        match self.quote_valid_until {
            Some(until) => until < now,
            None => false,
        }
    }
}
