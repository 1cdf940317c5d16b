// # Memory Instance Store
//
// In-memory implementation of InstanceStore.
//
// ## Purpose
//
// Tracks workflow instances for the lifetime of the process so that the
// trigger endpoint can report their status. Nothing is written to disk:
// DNS state lives only at the provider.
//
// ## Crash Behavior
//
// - All instance records are lost on restart/crash
// - An instance interrupted by a crash is simply re-triggered by the
//   caller; the reconciliation itself is idempotent

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use async_trait::async_trait;

use crate::traits::instance_store::{InstanceRecord, InstanceStore};
use crate::Error;

/// In-memory instance store implementation
///
/// This implementation stores all instances in a HashMap protected by a RwLock.
/// Clones share the same underlying map.
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::state::MemoryInstanceStore;
/// use ddns_core::traits::InstanceStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryInstanceStore::new();
///     assert!(store.get("missing").await?.is_none());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryInstanceStore {
    inner: Arc<RwLock<HashMap<String, InstanceRecord>>>,
}

impl MemoryInstanceStore {
    /// Create a new empty memory instance store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of instances in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl Default for MemoryInstanceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstanceStore for MemoryInstanceStore {
    async fn create(&self, record: InstanceRecord) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        if guard.contains_key(&record.id) {
            return Err(Error::Other(format!("instance {} already exists", record.id)));
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<InstanceRecord>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(id).cloned())
    }

    async fn save(&self, record: &InstanceRecord) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ReconciliationInput, ResultKind};
    use crate::traits::{Credentials, InstanceStatus};

    fn record(id: &str) -> InstanceRecord {
        let input = ReconciliationInput::new(
            "example.com",
            "www",
            "192.0.2.1",
            300,
            "https://identity.example",
            Credentials::new("user", "pass", None),
        )
        .unwrap();
        InstanceRecord::pending(id, &input)
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryInstanceStore::new();

        // Initially empty
        assert!(store.is_empty().await);

        store.create(record("a")).await.unwrap();
        assert_eq!(store.len().await, 1);

        let retrieved = store.get("a").await.unwrap().unwrap();
        assert_eq!(retrieved.full_name, "www.example.com");
        assert_eq!(retrieved.status, InstanceStatus::Pending);
        assert_eq!(retrieved.value, "192.0.2.1");
    }

    #[tokio::test]
    async fn test_memory_store_rejects_duplicate_id() {
        let store = MemoryInstanceStore::new();

        store.create(record("a")).await.unwrap();
        assert!(store.create(record("a")).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store_save_and_list() {
        let store = MemoryInstanceStore::new();
        store.create(record("a")).await.unwrap();
        store.create(record("b")).await.unwrap();

        let mut done = store.get("a").await.unwrap().unwrap();
        done.transition(InstanceStatus::Completed);
        done.result = Some(ResultKind::Unchanged);
        store.save(&done).await.unwrap();

        assert_eq!(
            store.get("a").await.unwrap().unwrap().result,
            Some(ResultKind::Unchanged)
        );

        let mut ids = store.list().await.unwrap();
        ids.sort();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
