use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::infrastructure::groups::in_memory::InMemoryGroupDirectory;
use crate::infrastructure::logging::in_memory::InMemoryAuditSink;
use crate::infrastructure::notify::in_memory::InMemoryNotifier;
use crate::infrastructure::storage::in_memory::InMemoryBillStore;
use crate::infrastructure::storage::{BillStore, VersionedBill};
use crate::models::{BillAudit, PaymentMethod, SplitBill, SplitType};
use crate::service::LedgerService;
use crate::split::ShareSpec;
use crate::tests::create_test_context;

#[tokio::test]
async fn distinct_participants_can_pay_concurrently() {
    let ctx = create_test_context();
    let bill_id = ctx
        .service
        .create_split_bill(
            "u1",
            "Dinner".to_string(),
            90.0,
            None,
            vec![
                ShareSpec::user("u1"),
                ShareSpec::user("u2"),
                ShareSpec::user("u3"),
            ],
            SplitType::Equal,
            None,
            None,
        )
        .await
        .unwrap()
        .id;

    let service = Arc::new(ctx.service);
    let (a, b) = futures::join!(
        service.mark_participant_paid(&bill_id, "u2", "u2", PaymentMethod::Upi, None),
        service.mark_participant_paid(&bill_id, "u3", "u3", PaymentMethod::Cash, None),
    );
    assert!(a.is_ok());
    assert!(b.is_ok());

    let bill = service.get_bill(&bill_id, "u1").await.unwrap();
    assert!(bill.is_settled);
    assert_eq!(bill.payments.len(), 2);
}

#[tokio::test]
async fn racing_the_same_share_pays_exactly_once() {
    let ctx = create_test_context();
    let bill_id = ctx
        .service
        .create_split_bill(
            "u1",
            "Dinner".to_string(),
            100.0,
            None,
            vec![ShareSpec::user("u1"), ShareSpec::user("u2")],
            SplitType::Equal,
            None,
            None,
        )
        .await
        .unwrap()
        .id;

    let service = Arc::new(ctx.service);
    let (a, b) = futures::join!(
        service.mark_participant_paid(&bill_id, "u2", "u2", PaymentMethod::Upi, None),
        service.mark_participant_paid(&bill_id, "u2", "u2", PaymentMethod::Upi, None),
    );

    let oks = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(oks, 1, "exactly one of the racing calls may win");
    let loser = if a.is_err() { a } else { b };
    assert!(matches!(
        loser.unwrap_err(),
        LedgerError::AlreadyPaid(ref id) if id == "u2"
    ));

    let bill = service.get_bill(&bill_id, "u1").await.unwrap();
    assert_eq!(bill.payments.len(), 1);
}

#[tokio::test]
async fn stale_version_writes_are_rejected_by_the_store() {
    let store = InMemoryBillStore::new();
    let ctx = create_test_context();
    let bill = ctx
        .service
        .create_split_bill(
            "u1",
            "Dinner".to_string(),
            100.0,
            None,
            vec![ShareSpec::user("u1"), ShareSpec::user("u2")],
            SplitType::Equal,
            None,
            None,
        )
        .await
        .unwrap();
    store.insert_bill(bill.clone()).await.unwrap();

    let VersionedBill { bill, version } = store.get_bill(&bill.id).await.unwrap().unwrap();
    let new_version = store.update_bill(bill.clone(), version).await.unwrap();
    assert_eq!(new_version, version + 1);

    // Writing with the version we already consumed must fail.
    let err = store.update_bill(bill, version).await.unwrap_err();
    assert!(matches!(err, LedgerError::WriteConflict(_)));
}

/// Store whose versioned writes always lose the race, to drive the retry
/// loop to exhaustion.
#[derive(Clone)]
struct ContendedStore {
    inner: InMemoryBillStore,
}

#[async_trait]
impl BillStore for ContendedStore {
    async fn insert_bill(&self, bill: SplitBill) -> Result<(), LedgerError> {
        self.inner.insert_bill(bill).await
    }

    async fn get_bill(&self, bill_id: &str) -> Result<Option<VersionedBill>, LedgerError> {
        self.inner.get_bill(bill_id).await
    }

    async fn update_bill(
        &self,
        bill: SplitBill,
        _expected_version: u64,
    ) -> Result<u64, LedgerError> {
        Err(LedgerError::WriteConflict(bill.id))
    }

    async fn list_open_bills_by_group(
        &self,
        group_id: &str,
    ) -> Result<Vec<SplitBill>, LedgerError> {
        self.inner.list_open_bills_by_group(group_id).await
    }

    async fn save_bill_audit(&self, audit: BillAudit) -> Result<(), LedgerError> {
        self.inner.save_bill_audit(audit).await
    }

    async fn get_bill_audits(&self, bill_id: &str) -> Result<Vec<BillAudit>, LedgerError> {
        self.inner.get_bill_audits(bill_id).await
    }
}

#[tokio::test]
async fn retry_exhaustion_surfaces_as_a_conflict_error() {
    let store = ContendedStore {
        inner: InMemoryBillStore::new(),
    };
    let service = LedgerService::new(
        store,
        InMemoryAuditSink::new(),
        InMemoryGroupDirectory::new(),
        InMemoryNotifier::new(),
    );

    let bill = service
        .create_split_bill(
            "u1",
            "Dinner".to_string(),
            100.0,
            None,
            vec![ShareSpec::user("u1"), ShareSpec::user("u2")],
            SplitType::Equal,
            None,
            None,
        )
        .await
        .unwrap();

    let err = service
        .mark_participant_paid(&bill.id, "u2", "u2", PaymentMethod::Upi, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ConflictRetryExhausted(_)));
}
