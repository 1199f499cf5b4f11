use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::core::errors::{ManagerError, Result};
use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::KeyRecord;
use crate::core::traits::persistent_store::StoreEntries;

/// Default storage key prefix for key records.
pub const DEFAULT_KEY_PREFIX: &str = "key:";

/// Maps key records to and from storage entries.
///
/// The storage namespace may be shared with unrelated writers, so decoding
/// is a classification: an entry is either one of our records or foreign.
/// Foreign entries are skipped, never reported as errors.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    prefix: String,
}

impl RecordSchema {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Storage key under which the record for `id` lives.
    pub fn storage_key(&self, id: &KeyId) -> String {
        format!("{}{}", self.prefix, id)
    }

    /// Encode a record as a single storage entry.
    pub fn encode(&self, record: &KeyRecord) -> Result<StoreEntries> {
        let value = serde_json::to_value(record).map_err(ManagerError::Encode)?;
        let mut entries = StoreEntries::new();
        entries.insert(self.storage_key(&record.id), value);
        Ok(entries)
    }

    /// Decode one entry, returning `None` if it is not one of our records.
    pub fn decode(&self, key: &str, value: &Value) -> Option<KeyRecord> {
        let suffix = key.strip_prefix(&self.prefix)?;
        let record = KeyRecord::deserialize(value).ok()?;
        if !record.id.is_valid() || record.id.as_str() != suffix || record.name.is_empty() {
            return None;
        }
        Some(record)
    }

    /// Decode every recognized record, preserving store order.
    pub fn decode_all(&self, entries: &StoreEntries) -> Vec<KeyRecord> {
        entries
            .iter()
            .filter_map(|(key, value)| {
                let record = self.decode(key, value);
                if record.is_none() {
                    debug!(key = %key, "skipping foreign storage entry");
                }
                record
            })
            .collect()
    }
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}
