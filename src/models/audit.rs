use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Application-level audit entry, one per service action.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditEntry {
    pub id: String,
    pub action: String,
    pub user_id: Option<String>,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Audit entry scoped to a single bill, kept alongside the bill in storage.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BillAudit {
    pub id: String,
    pub bill_id: String,
    pub action: String,
    pub user_id: Option<String>,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}
