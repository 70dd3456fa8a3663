use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::LedgerError;
use crate::infrastructure::storage::{BillStore, VersionedBill};
use crate::models::{BillAudit, SplitBill};

/// In-memory bill store with per-document version counters. Used by the
/// tests and the demo server; a production deployment swaps in a
/// document-database-backed implementation of the same trait.
#[derive(Clone)]
pub struct InMemoryBillStore {
    bills: Arc<Mutex<HashMap<String, VersionedBill>>>,
    audits: Arc<Mutex<HashMap<String, Vec<BillAudit>>>>,
}

impl InMemoryBillStore {
    pub fn new() -> Self {
        InMemoryBillStore {
            bills: Arc::new(Mutex::new(HashMap::new())),
            audits: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryBillStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BillStore for InMemoryBillStore {
    async fn insert_bill(&self, bill: SplitBill) -> Result<(), LedgerError> {
        let mut bills = self.bills.lock().await;
        if bills.contains_key(&bill.id) {
            return Err(LedgerError::StorageError(format!(
                "bill {} already exists",
                bill.id
            )));
        }
        bills.insert(bill.id.clone(), VersionedBill { bill, version: 1 });
        Ok(())
    }

    async fn get_bill(&self, bill_id: &str) -> Result<Option<VersionedBill>, LedgerError> {
        Ok(self.bills.lock().await.get(bill_id).cloned())
    }

    async fn update_bill(
        &self,
        bill: SplitBill,
        expected_version: u64,
    ) -> Result<u64, LedgerError> {
        let mut bills = self.bills.lock().await;
        let entry = bills
            .get_mut(&bill.id)
            .ok_or_else(|| LedgerError::BillNotFound(bill.id.clone()))?;
        if entry.version != expected_version {
            return Err(LedgerError::WriteConflict(bill.id));
        }
        entry.version += 1;
        entry.bill = bill;
        Ok(entry.version)
    }

    async fn list_open_bills_by_group(
        &self,
        group_id: &str,
    ) -> Result<Vec<SplitBill>, LedgerError> {
        let bills = self.bills.lock().await;
        let mut open: Vec<SplitBill> = bills
            .values()
            .filter(|v| {
                v.bill.group_id.as_deref() == Some(group_id)
                    && !v.bill.is_settled
                    && !v.bill.is_cancelled
            })
            .map(|v| v.bill.clone())
            .collect();
        // Stable output for callers that display the list.
        open.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(open)
    }

    async fn save_bill_audit(&self, audit: BillAudit) -> Result<(), LedgerError> {
        let mut audits = self.audits.lock().await;
        audits.entry(audit.bill_id.clone()).or_default().push(audit);
        Ok(())
    }

    async fn get_bill_audits(&self, bill_id: &str) -> Result<Vec<BillAudit>, LedgerError> {
        Ok(self
            .audits
            .lock()
            .await
            .get(bill_id)
            .cloned()
            .unwrap_or_default())
    }
}
