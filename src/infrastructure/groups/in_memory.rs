use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::LedgerError;
use crate::infrastructure::groups::GroupDirectory;

/// In-memory stand-in for the membership service. The mutators are not part
/// of the [`GroupDirectory`] trait; tests and the demo server use them to
/// seed state.
#[derive(Clone)]
pub struct InMemoryGroupDirectory {
    groups: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

impl InMemoryGroupDirectory {
    pub fn new() -> Self {
        InMemoryGroupDirectory {
            groups: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn add_group(&self, group_id: &str) {
        self.groups
            .write()
            .await
            .entry(group_id.to_string())
            .or_default();
    }

    pub async fn add_member(&self, group_id: &str, user_id: &str) {
        self.groups
            .write()
            .await
            .entry(group_id.to_string())
            .or_default()
            .insert(user_id.to_string());
    }

    pub async fn remove_member(&self, group_id: &str, user_id: &str) {
        if let Some(members) = self.groups.write().await.get_mut(group_id) {
            members.remove(user_id);
        }
    }
}

impl Default for InMemoryGroupDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GroupDirectory for InMemoryGroupDirectory {
    async fn group_exists(&self, group_id: &str) -> Result<bool, LedgerError> {
        Ok(self.groups.read().await.contains_key(group_id))
    }

    async fn is_active_member(&self, group_id: &str, user_id: &str) -> Result<bool, LedgerError> {
        Ok(self
            .groups
            .read()
            .await
            .get(group_id)
            .map(|members| members.contains(user_id))
            .unwrap_or(false))
    }
}
