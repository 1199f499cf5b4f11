use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::errors::StoreError;
use crate::core::traits::persistent_store::{PersistentStore, StoreEntries};

/// In-process store that keeps entries in insertion order.
///
/// Clones share the same contents, so a store handed to one manager can be
/// inspected or reused by another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<StoreEntries>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries(entries: StoreEntries) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Snapshot of the current contents.
    pub async fn snapshot(&self) -> StoreEntries {
        self.entries.lock().await.clone()
    }
}

impl PersistentStore for MemoryStore {
    async fn get(&self) -> Result<StoreEntries, StoreError> {
        Ok(self.entries.lock().await.clone())
    }

    async fn set(&self, entries: StoreEntries) -> Result<(), StoreError> {
        let mut current = self.entries.lock().await;
        current.extend(entries);
        Ok(())
    }

    async fn delete(&self, keys: Vec<String>) -> Result<(), StoreError> {
        let mut current = self.entries.lock().await;
        current.retain(|k, _| !keys.contains(k));
        Ok(())
    }
}
