use async_trait::async_trait;

use crate::error::LedgerError;
use crate::models::AuditEntry;

/// Application-level audit sink: one entry per service action, with a
/// structured JSON payload.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), LedgerError>;
    async fn get_entries(&self) -> Result<Vec<AuditEntry>, LedgerError>;
}

pub mod in_memory;
