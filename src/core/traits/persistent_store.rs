use std::future::Future;

use crate::core::errors::StoreError;

/// Contents of a store: opaque JSON records keyed by string, in the order
/// the backend chooses to expose them.
pub type StoreEntries = serde_json::Map<String, serde_json::Value>;

/// Port for the durable key-value store that holds key configuration.
///
/// Entries must be independently addressable: `set` merges and `delete`
/// removes only the named keys, so writers of distinct keys never clobber
/// each other.
pub trait PersistentStore: Send + Sync {
    /// Return the full current contents.
    fn get(&self) -> impl Future<Output = Result<StoreEntries, StoreError>> + Send;

    /// Merge `entries` into the store, leaving untouched keys in place.
    fn set(&self, entries: StoreEntries) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove the named keys. Absent keys are not an error.
    fn delete(&self, keys: Vec<String>) -> impl Future<Output = Result<(), StoreError>> + Send;
}
