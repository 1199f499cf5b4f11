use secrecy::SecretString;
use ssh_key::PrivateKey;

use crate::core::errors::DecodeError;

/// Port for turning stored PEM text into usable key material.
pub trait KeyDecoder: Send + Sync {
    /// Parse `pem` and, if it is encrypted, decrypt it with `passphrase`.
    ///
    /// Must return `DecodeError::IncorrectPassphrase` only when the key parsed
    /// but could not be decrypted, so callers can re-prompt.
    fn decode(&self, pem: &str, passphrase: &SecretString) -> Result<PrivateKey, DecodeError>;
}
