use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::core::models::key_id::KeyId;

/// The persisted unit: one configured private key.
///
/// `pem_private_key` may be passphrase-encrypted. It is wiped when the
/// record is dropped and never printed by `Debug`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    pub id: KeyId,
    pub name: String,
    pub pem_private_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl KeyRecord {
    /// Project to the public, non-secret view.
    pub fn to_configured(&self) -> ConfiguredKey {
        ConfiguredKey {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

impl std::fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("added_at", &self.added_at)
            .finish_non_exhaustive()
    }
}

impl Drop for KeyRecord {
    fn drop(&mut self) {
        self.pem_private_key.zeroize();
    }
}

/// A configured key as returned by enumeration: ID and name only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConfiguredKey {
    pub id: KeyId,
    pub name: String,
}
