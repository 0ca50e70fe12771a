//! Work-order domain model.
//!
//! Only the fields this core needs are modeled. A work order created
//! by quote conversion always inherits the quote's `tenant_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Job number, unique within the tenant (format `WO-<seq>`).
    pub job_no: String,
    /// The quote this work order was converted from, if any.
    pub quote_id: Option<Uuid>,
    /// Email of the party authorized to view this work order (used for
    /// `Client`-role scoping); stored lowercased.
    pub authorized_email: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
