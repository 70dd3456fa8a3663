use async_trait::async_trait;

use crate::error::LedgerError;
use crate::models::{BillAudit, SplitBill};

/// A bill together with its storage version, for optimistic writes.
#[derive(Clone, Debug)]
pub struct VersionedBill {
    pub bill: SplitBill,
    pub version: u64,
}

/// Document store for ledger entities. Implementations must reject
/// `update_bill` with [`LedgerError::WriteConflict`] when the expected
/// version no longer matches, which is what the service's retry loop keys on.
#[async_trait]
pub trait BillStore: Send + Sync {
    async fn insert_bill(&self, bill: SplitBill) -> Result<(), LedgerError>;
    async fn get_bill(&self, bill_id: &str) -> Result<Option<VersionedBill>, LedgerError>;
    /// Returns the new version on success.
    async fn update_bill(&self, bill: SplitBill, expected_version: u64)
        -> Result<u64, LedgerError>;
    /// Unsettled, uncancelled bills owned by the group.
    async fn list_open_bills_by_group(&self, group_id: &str)
        -> Result<Vec<SplitBill>, LedgerError>;

    async fn save_bill_audit(&self, audit: BillAudit) -> Result<(), LedgerError>;
    async fn get_bill_audits(&self, bill_id: &str) -> Result<Vec<BillAudit>, LedgerError>;
}

pub mod in_memory;
