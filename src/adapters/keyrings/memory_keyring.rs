//! In-memory keyring.
//!
//! Holds decrypted identities for the lifetime of the process, the way an
//! `ssh-agent` does. Nothing here is ever written to disk.
//!
//! Thread safety: all mutations go through `Arc<RwLock<…>>`.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::core::errors::KeyringError;
use crate::core::models::live_identity::LiveIdentity;
use crate::core::traits::keyring::Keyring;

/// Shared, thread-safe keyring. Clones share the same identities.
///
/// Adding key material that is already held (same fingerprint) replaces the
/// existing identity, matching agent semantics where a key is listed once.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyring {
    identities: Arc<RwLock<Vec<LiveIdentity>>>,
}

impl MemoryKeyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an identity by its comment.
    pub async fn get(&self, comment: &str) -> Option<LiveIdentity> {
        self.identities
            .read()
            .await
            .iter()
            .find(|i| i.comment == comment)
            .cloned()
    }

    /// Number of live identities.
    pub async fn len(&self) -> usize {
        self.identities.read().await.len()
    }

    /// True if no identities are live.
    pub async fn is_empty(&self) -> bool {
        self.identities.read().await.is_empty()
    }

    /// Drop every identity, as happens when the agent restarts.
    pub async fn clear(&self) {
        self.identities.write().await.clear();
    }
}

impl Keyring for MemoryKeyring {
    async fn add_identity(&self, identity: LiveIdentity) -> Result<(), KeyringError> {
        let mut identities = self.identities.write().await;
        identities.retain(|i| i.fingerprint != identity.fingerprint);
        debug!(
            fingerprint = %identity.fingerprint,
            comment = %identity.comment,
            "keyring: adding key"
        );
        identities.push(identity);
        Ok(())
    }

    async fn remove_identity(&self, comment: &str) -> Result<(), KeyringError> {
        let mut identities = self.identities.write().await;
        let before = identities.len();
        identities.retain(|i| i.comment != comment);
        if identities.len() == before {
            return Err(KeyringError::NotFound);
        }
        debug!(comment = %comment, "keyring: removed key");
        Ok(())
    }

    async fn list_identities(&self) -> Result<Vec<String>, KeyringError> {
        Ok(self
            .identities
            .read()
            .await
            .iter()
            .map(|i| i.comment.clone())
            .collect())
    }
}
