use secrecy::{ExposeSecret, SecretString};
use ssh_key::PrivateKey;

use crate::adapters::decoders::legacy_pem::{self, PKCS8_LABEL, RSA_LABEL};
use crate::core::errors::DecodeError;
use crate::core::traits::key_decoder::KeyDecoder;

const OPENSSH_LABEL: &str = "OPENSSH PRIVATE KEY";

/// Decoder for SSH private keys.
///
/// Accepts the OpenSSH format (`BEGIN OPENSSH PRIVATE KEY`), optionally
/// encrypted with a passphrase, and traditional OpenSSL RSA keys. Other
/// armored formats are reported as unsupported.
///
/// Leading indentation on PEM lines is tolerated, so keys pasted from
/// indented text still parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSshDecoder;

impl OpenSshDecoder {
    /// Strip per-line indentation and blank lines from PEM text.
    fn normalize(pem: &str) -> String {
        pem.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
            + "\n"
    }

    fn decode_openssh(pem: &str, passphrase: &SecretString) -> Result<PrivateKey, DecodeError> {
        let key =
            PrivateKey::from_openssh(pem).map_err(|e| DecodeError::Malformed(e.to_string()))?;

        if !key.is_encrypted() {
            return Ok(key);
        }

        key.decrypt(passphrase.expose_secret().as_bytes())
            .map_err(decrypt_error)
    }
}

/// Only a failed integrity check means the passphrase was wrong.
fn decrypt_error(err: ssh_key::Error) -> DecodeError {
    match err {
        ssh_key::Error::Crypto => DecodeError::IncorrectPassphrase,
        other => DecodeError::Malformed(other.to_string()),
    }
}

impl KeyDecoder for OpenSshDecoder {
    fn decode(&self, pem: &str, passphrase: &SecretString) -> Result<PrivateKey, DecodeError> {
        let pem = Self::normalize(pem);
        match pem.lines().next().and_then(legacy_pem::label_of) {
            Some(RSA_LABEL | PKCS8_LABEL) => legacy_pem::decode(&pem, passphrase),
            Some(label) if label != OPENSSH_LABEL => Err(DecodeError::Malformed(format!(
                "unsupported key format: {label}"
            ))),
            _ => Self::decode_openssh(&pem, passphrase),
        }
    }
}
