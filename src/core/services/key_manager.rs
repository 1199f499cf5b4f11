use std::sync::Arc;

use chrono::Utc;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::adapters::decoders::openssh_decoder::OpenSshDecoder;
use crate::config::manager_config::ManagerConfig;
use crate::core::errors::{DecodeError, ManagerError, Result};
use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::{ConfiguredKey, KeyRecord};
use crate::core::models::live_identity::LiveIdentity;
use crate::core::models::record_schema::RecordSchema;
use crate::core::traits::key_decoder::KeyDecoder;
use crate::core::traits::keyring::Keyring;
use crate::core::traits::persistent_store::PersistentStore;

/// Reconciles configured keys in a `PersistentStore` with live identities
/// in a `Keyring`.
///
/// Each record is written and deleted under its own storage key; the manager
/// never rewrites the whole store, so concurrent operations on distinct keys
/// do not lose each other's updates. Loading is one-directional: records are
/// materialized into the keyring on demand, never the other way around.
pub struct KeyManager<S, K, D = OpenSshDecoder> {
    store: S,
    keyring: K,
    decoder: Arc<D>,
    schema: RecordSchema,
    comment_prefix: String,
}

impl<S: PersistentStore, K: Keyring> KeyManager<S, K, OpenSshDecoder> {
    /// Create a manager with default configuration.
    pub fn new(keyring: K, store: S) -> Self {
        Self::with_config(keyring, store, &ManagerConfig::default())
    }

    /// Create a manager using the prefixes from `config`.
    pub fn with_config(keyring: K, store: S, config: &ManagerConfig) -> Self {
        Self {
            store,
            keyring,
            decoder: Arc::new(OpenSshDecoder),
            schema: RecordSchema::new(config.storage.key_prefix.clone()),
            comment_prefix: config.agent.comment_prefix.clone(),
        }
    }
}

impl<S, K, D> KeyManager<S, K, D>
where
    S: PersistentStore,
    K: Keyring,
    D: KeyDecoder + 'static,
{
    /// Replace the decoder used by `load`.
    pub fn with_decoder<D2: KeyDecoder + 'static>(self, decoder: D2) -> KeyManager<S, K, D2> {
        KeyManager {
            store: self.store,
            keyring: self.keyring,
            decoder: Arc::new(decoder),
            schema: self.schema,
            comment_prefix: self.comment_prefix,
        }
    }

    /// Configure a new key. The key is not usable for signing until loaded.
    ///
    /// Storage write failures are returned exactly as the store reported them.
    pub async fn add(&self, name: &str, pem_private_key: &str) -> Result<KeyId> {
        if name.is_empty() {
            return Err(ManagerError::invalid_argument("name must not be empty"));
        }

        let record = KeyRecord {
            id: KeyId::generate(),
            name: name.to_string(),
            pem_private_key: pem_private_key.to_string(),
            added_at: Some(Utc::now()),
        };

        let entries = self.schema.encode(&record)?;
        self.store.set(entries).await?;

        info!(id = %record.id, name = %record.name, "added key");
        Ok(record.id.clone())
    }

    /// Remove a configured key and evict it from the keyring if loaded.
    ///
    /// Removing an ID that is not configured succeeds without changes.
    /// Eviction is best effort and never fails the call.
    pub async fn remove(&self, id: &KeyId) -> Result<()> {
        let records = self
            .read_records()
            .await
            .map_err(|e| ManagerError::EnumerateKeys(Box::new(e)))?;

        if !records.iter().any(|r| &r.id == id) {
            debug!(id = %id, "remove: no configured key with this ID");
            return Ok(());
        }

        self.store
            .delete(vec![self.schema.storage_key(id)])
            .await
            .map_err(ManagerError::DeleteKeys)?;
        info!(id = %id, "removed key");

        if let Err(e) = self.unload(id).await {
            warn!(id = %id, error = %e, "remove: failed to evict key from agent");
        }
        Ok(())
    }

    /// Enumerate configured keys in store order.
    pub async fn configured(&self) -> Result<Vec<ConfiguredKey>> {
        let records = self
            .read_records()
            .await
            .map_err(|e| ManagerError::ReadKeys(Box::new(e)))?;
        Ok(records.iter().map(KeyRecord::to_configured).collect())
    }

    /// Decrypt a configured key and install it in the keyring.
    ///
    /// Loading an already-loaded key only verifies the passphrase; the live
    /// identity is left untouched.
    pub async fn load(&self, id: &KeyId, passphrase: SecretString) -> Result<()> {
        let records = self
            .read_records()
            .await
            .map_err(|e| ManagerError::ReadKeys(Box::new(e)))?;

        let record = records
            .into_iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| ManagerError::KeyNotFound { id: id.clone() })?;

        let decoder = Arc::clone(&self.decoder);
        let decoded = tokio::task::spawn_blocking(move || {
            decoder.decode(&record.pem_private_key, &passphrase)
        })
        .await
        .map_err(ManagerError::DecodeTask)?;

        let private_key = decoded.map_err(|e| match e {
            DecodeError::IncorrectPassphrase => ManagerError::IncorrectPassphrase { id: id.clone() },
            DecodeError::Malformed(detail) => ManagerError::InvalidKey {
                id: id.clone(),
                detail,
            },
        })?;

        let comment = self.comment_for(id);
        if self.is_live(&comment).await? {
            debug!(id = %id, "load: key is already live");
            return Ok(());
        }

        let identity = LiveIdentity::new(comment, private_key);
        let fingerprint = identity.fingerprint.clone();
        self.keyring
            .add_identity(identity)
            .await
            .map_err(|e| ManagerError::keyring("add key to agent", e))?;

        info!(id = %id, fingerprint = %fingerprint, "loaded key");
        Ok(())
    }

    /// Evict a key from the keyring, leaving its configuration in place.
    ///
    /// Succeeds if the key was not loaded.
    pub async fn unload(&self, id: &KeyId) -> Result<()> {
        let comment = self.comment_for(id);
        if !self.is_live(&comment).await? {
            return Ok(());
        }

        self.keyring
            .remove_identity(&comment)
            .await
            .map_err(|e| ManagerError::keyring("remove key from agent", e))?;
        debug!(id = %id, "unloaded key");
        Ok(())
    }

    /// Configured keys that are currently live in the keyring.
    pub async fn loaded(&self) -> Result<Vec<ConfiguredKey>> {
        let live: Vec<KeyId> = self
            .keyring
            .list_identities()
            .await
            .map_err(|e| ManagerError::keyring("list agent keys", e))?
            .iter()
            .map(|comment| self.loaded_id(comment))
            .filter(KeyId::is_valid)
            .collect();

        let configured = self.configured().await?;
        Ok(configured
            .into_iter()
            .filter(|k| live.contains(&k.id))
            .collect())
    }

    /// ID a keyring identity was loaded under, or `KeyId::INVALID` if the
    /// identity was not installed by this manager.
    pub fn loaded_id(&self, comment: &str) -> KeyId {
        match comment.strip_prefix(self.comment_prefix.as_str()) {
            Some(id) if !id.is_empty() => KeyId::from(id),
            _ => KeyId::INVALID,
        }
    }

    fn comment_for(&self, id: &KeyId) -> String {
        format!("{}{}", self.comment_prefix, id)
    }

    async fn is_live(&self, comment: &str) -> Result<bool> {
        let comments = self
            .keyring
            .list_identities()
            .await
            .map_err(|e| ManagerError::keyring("list agent keys", e))?;
        Ok(comments.iter().any(|c| c == comment))
    }

    async fn read_records(&self) -> Result<Vec<KeyRecord>> {
        let entries = self.store.get().await.map_err(ManagerError::StorageRead)?;
        Ok(self.schema.decode_all(&entries))
    }
}

impl<S, K, D> std::fmt::Debug for KeyManager<S, K, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("key_prefix", &self.schema.prefix())
            .field("comment_prefix", &self.comment_prefix)
            .finish_non_exhaustive()
    }
}
