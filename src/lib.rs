//! Durable SSH key configuration reconciled with a live signing agent.
//!
//! A [`KeyManager`] keeps named private keys in a [`PersistentStore`] so
//! they survive restarts, and materializes them on demand into a
//! [`Keyring`] (an SSH-agent style identity store that only lives in
//! memory).
//!
//! ```text
//!  add / remove / configured           load / unload / loaded
//!            │                                  │
//!            ▼                                  ▼
//!   PersistentStore  ───── records ─────►   Keyring
//!   (durable, shared)      (one way)     (volatile, shared)
//! ```
//!
//! ```rust,ignore
//! use agentkeys::{KeyManager, MemoryKeyring, MemoryStore};
//! use secrecy::SecretString;
//!
//! let manager = KeyManager::new(MemoryKeyring::new(), MemoryStore::new());
//! let id = manager.add("github", pem).await?;
//! manager.load(&id, SecretString::from(passphrase)).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod core;

pub use crate::adapters::decoders::openssh_decoder::OpenSshDecoder;
pub use crate::adapters::keyrings::memory_keyring::MemoryKeyring;
pub use crate::adapters::stores::json_file_store::JsonFileStore;
pub use crate::adapters::stores::memory_store::MemoryStore;
pub use crate::config::manager_config::ManagerConfig;
pub use crate::core::errors::{
    DecodeError, ErrorKind, KeyringError, ManagerError, Result, StoreError,
};
pub use crate::core::models::key_id::KeyId;
pub use crate::core::models::key_record::{ConfiguredKey, KeyRecord};
pub use crate::core::models::live_identity::LiveIdentity;
pub use crate::core::services::callbacks::CallbackManager;
pub use crate::core::services::key_manager::KeyManager;
pub use crate::core::traits::key_decoder::KeyDecoder;
pub use crate::core::traits::keyring::Keyring;
pub use crate::core::traits::persistent_store::{PersistentStore, StoreEntries};
