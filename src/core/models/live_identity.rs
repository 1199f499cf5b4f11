use ssh_key::{HashAlg, PrivateKey};

/// Decrypted signing material held by a keyring.
///
/// Live identities exist only in memory and must be rebuilt from a stored
/// record (plus passphrase) after every restart.
#[derive(Clone)]
pub struct LiveIdentity {
    /// Identifier the keyring addresses this identity by.
    pub comment: String,
    /// The decrypted key (zeroized on drop via `ssh_key::PrivateKey`).
    pub private_key: PrivateKey,
    /// SHA-256 fingerprint of the public half.
    pub fingerprint: String,
}

impl LiveIdentity {
    pub fn new(comment: impl Into<String>, mut private_key: PrivateKey) -> Self {
        let comment = comment.into();
        private_key.set_comment(comment.as_str());
        let fingerprint = private_key
            .public_key()
            .fingerprint(HashAlg::Sha256)
            .to_string();
        Self {
            comment,
            private_key,
            fingerprint,
        }
    }
}

impl std::fmt::Debug for LiveIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveIdentity")
            .field("comment", &self.comment)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}
