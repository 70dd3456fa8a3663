mod concurrency_tests;
mod payment_tests;

use crate::infrastructure::groups::in_memory::InMemoryGroupDirectory;
use crate::infrastructure::logging::in_memory::InMemoryAuditSink;
use crate::infrastructure::notify::in_memory::InMemoryNotifier;
use crate::infrastructure::storage::in_memory::InMemoryBillStore;
use crate::service::LedgerService;

pub type TestService =
    LedgerService<InMemoryAuditSink, InMemoryBillStore, InMemoryGroupDirectory, InMemoryNotifier>;

/// Service wired to in-memory infrastructure, with handles kept so tests can
/// seed groups and inspect events and audits.
pub struct TestContext {
    pub service: TestService,
    pub storage: InMemoryBillStore,
    pub groups: InMemoryGroupDirectory,
    pub notifier: InMemoryNotifier,
    pub audit: InMemoryAuditSink,
}

pub fn create_test_context() -> TestContext {
    let storage = InMemoryBillStore::new();
    let audit = InMemoryAuditSink::new();
    let groups = InMemoryGroupDirectory::new();
    let notifier = InMemoryNotifier::new();
    let service = LedgerService::new(
        storage.clone(),
        audit.clone(),
        groups.clone(),
        notifier.clone(),
    );
    TestContext {
        service,
        storage,
        groups,
        notifier,
        audit,
    }
}

impl TestContext {
    pub async fn seed_group(&self, group_id: &str, members: &[&str]) {
        self.groups.add_group(group_id).await;
        for member in members {
            self.groups.add_member(group_id, member).await;
        }
    }
}
