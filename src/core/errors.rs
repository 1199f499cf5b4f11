use std::path::PathBuf;

use crate::core::models::key_id::KeyId;

/// Errors reported by a `PersistentStore` backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failure reported verbatim by the backend.
    #[error("{0}")]
    Backend(String),

    #[error("malformed storage file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Errors reported by a `Keyring` backend.
#[derive(Debug, thiserror::Error)]
pub enum KeyringError {
    #[error("agent: key not found")]
    NotFound,

    #[error("agent: {0}")]
    Agent(String),
}

/// Outcome of a failed `KeyDecoder::decode`.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("incorrect passphrase")]
    IncorrectPassphrase,

    #[error("{0}")]
    Malformed(String),
}

/// Coarse classification of a [`ManagerError`], for callers that need to
/// react differently (re-prompt for a passphrase, report corrupt config, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    StorageRead,
    StorageWrite,
    StorageDelete,
    NotFound,
    IncorrectPassphrase,
    Parse,
    Keyring,
    Config,
    Internal,
}

/// All errors surfaced by the key manager.
///
/// Display texts of the storage variants are layered: each wrapper prefixes
/// its own context to the inner message, so a read failure during `remove`
/// renders as `failed to enumerate keys: failed to read from storage: <cause>`.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("{detail}")]
    InvalidArgument { detail: String },

    /// Raw storage failure, surfaced without added context.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to read from storage: {0}")]
    StorageRead(#[source] StoreError),

    #[error("failed to read keys: {0}")]
    ReadKeys(#[source] Box<ManagerError>),

    #[error("failed to enumerate keys: {0}")]
    EnumerateKeys(#[source] Box<ManagerError>),

    #[error("failed to delete keys: {0}")]
    DeleteKeys(#[source] StoreError),

    #[error("invalid ID: no configured key with ID '{id}'")]
    KeyNotFound { id: KeyId },

    #[error("failed to decrypt key '{id}': incorrect passphrase")]
    IncorrectPassphrase { id: KeyId },

    #[error("failed to parse private key '{id}': {detail}")]
    InvalidKey { id: KeyId, detail: String },

    #[error("failed to {action}: {source}")]
    Keyring {
        action: &'static str,
        #[source]
        source: KeyringError,
    },

    #[error("failed to encode key record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("key decoding task failed: {0}")]
    DecodeTask(#[source] tokio::task::JoinError),

    #[error("operation was cancelled before it completed")]
    Cancelled,

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "Configuration uses format version {config_version}, but this build \
         only supports up to version {supported_version}."
    )]
    FormatVersionTooNew {
        config_version: u32,
        supported_version: u32,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ManagerError {
    pub(crate) fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::InvalidArgument {
            detail: detail.into(),
        }
    }

    pub(crate) fn keyring(action: &'static str, source: KeyringError) -> Self {
        Self::Keyring { action, source }
    }

    /// Classify this error, looking through context wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Store(_) | Self::Encode(_) => ErrorKind::StorageWrite,
            Self::StorageRead(_) => ErrorKind::StorageRead,
            Self::ReadKeys(inner) | Self::EnumerateKeys(inner) => inner.kind(),
            Self::DeleteKeys(_) => ErrorKind::StorageDelete,
            Self::KeyNotFound { .. } => ErrorKind::NotFound,
            Self::IncorrectPassphrase { .. } => ErrorKind::IncorrectPassphrase,
            Self::InvalidKey { .. } => ErrorKind::Parse,
            Self::Keyring { .. } => ErrorKind::Keyring,
            Self::InvalidConfig { .. } | Self::FormatVersionTooNew { .. } => ErrorKind::Config,
            Self::DecodeTask(_) | Self::Cancelled | Self::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ManagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_failures_render_both_layers() {
        let err = ManagerError::EnumerateKeys(Box::new(ManagerError::StorageRead(
            StoreError::backend("storage.Get failed"),
        )));
        assert_eq!(
            err.to_string(),
            "failed to enumerate keys: failed to read from storage: storage.Get failed"
        );
        assert_eq!(err.kind(), ErrorKind::StorageRead);
    }

    #[test]
    fn raw_store_error_is_transparent() {
        let err = ManagerError::from(StoreError::backend("storage.Set failed"));
        assert_eq!(err.to_string(), "storage.Set failed");
        assert_eq!(err.kind(), ErrorKind::StorageWrite);
    }

    #[test]
    fn delete_failure_has_single_layer() {
        let err = ManagerError::DeleteKeys(StoreError::backend("storage.Delete failed"));
        assert_eq!(err.to_string(), "failed to delete keys: storage.Delete failed");
        assert_eq!(err.kind(), ErrorKind::StorageDelete);
    }
}
