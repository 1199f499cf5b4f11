use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use crate::core::errors::StoreError;
use crate::core::traits::persistent_store::{PersistentStore, StoreEntries};

/// File-backed store that keeps all entries in one JSON object.
///
/// Example `keys.json`:
/// ```text
/// {
///   "key:0b6f...": { "id": "0b6f...", "name": "github", "pemPrivateKey": "..." },
///   "ui.theme": "dark"
/// }
/// ```
///
/// Mutations rewrite the whole file through a temporary sibling and a
/// rename. The internal lock serializes them, so concurrent `set`s of
/// distinct keys within one process are all kept.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store backed by the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Return the file path this store reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<StoreEntries, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoreEntries::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(StoreEntries::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write(&self, entries: &StoreEntries) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(entries).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content + "\n").await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), entries = entries.len(), "store: wrote file");
        Ok(())
    }
}

impl PersistentStore for JsonFileStore {
    async fn get(&self) -> Result<StoreEntries, StoreError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn set(&self, entries: StoreEntries) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut current = self.read().await?;
        current.extend(entries);
        self.write(&current).await
    }

    async fn delete(&self, keys: Vec<String>) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut current = self.read().await?;
        let before = current.len();
        current.retain(|k, _| !keys.contains(k));
        if current.len() == before {
            return Ok(());
        }
        self.write(&current).await
    }
}
