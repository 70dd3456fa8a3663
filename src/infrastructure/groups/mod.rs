use async_trait::async_trait;

use crate::error::LedgerError;

/// Read-only view of the external group-membership service. The ledger only
/// ever asks two questions; roles and membership management live elsewhere.
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn group_exists(&self, group_id: &str) -> Result<bool, LedgerError>;
    async fn is_active_member(&self, group_id: &str, user_id: &str) -> Result<bool, LedgerError>;
}

pub mod in_memory;
