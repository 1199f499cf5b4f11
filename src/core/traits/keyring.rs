use std::future::Future;

use crate::core::errors::KeyringError;
use crate::core::models::live_identity::LiveIdentity;

/// Port for the live, in-memory signing identity store (an SSH agent).
///
/// Identities are addressed by their comment.
pub trait Keyring: Send + Sync {
    /// Install decrypted key material.
    fn add_identity(
        &self,
        identity: LiveIdentity,
    ) -> impl Future<Output = Result<(), KeyringError>> + Send;

    /// Remove the identity with the given comment.
    fn remove_identity(&self, comment: &str)
    -> impl Future<Output = Result<(), KeyringError>> + Send;

    /// Comments of every live identity, including ones installed by others.
    fn list_identities(&self) -> impl Future<Output = Result<Vec<String>, KeyringError>> + Send;
}
