use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::LedgerError;
use crate::infrastructure::notify::{LedgerEvent, Notifier};

/// Records published events so tests can assert on delivery.
#[derive(Clone)]
pub struct InMemoryNotifier {
    events: Arc<RwLock<Vec<LedgerEvent>>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        InMemoryNotifier {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn events(&self) -> Vec<LedgerEvent> {
        self.events.read().await.clone()
    }
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn publish(&self, event: LedgerEvent) -> Result<(), LedgerError> {
        self.events.write().await.push(event);
        Ok(())
    }
}
