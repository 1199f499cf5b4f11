//! Traditional OpenSSL RSA key files: PKCS#1 (`BEGIN RSA PRIVATE KEY`),
//! optionally encrypted with `Proc-Type`/`DEK-Info` headers, and unencrypted
//! PKCS#8 (`BEGIN PRIVATE KEY`).

use aes::cipher::{BlockDecryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::prelude::{BASE64_STANDARD, Engine};
use md5::{Digest, Md5};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use secrecy::{ExposeSecret, SecretString};
use ssh_key::PrivateKey;
use ssh_key::private::{KeypairData, RsaKeypair};
use zeroize::Zeroizing;

use crate::core::errors::DecodeError;

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub const RSA_LABEL: &str = "RSA PRIVATE KEY";
pub const PKCS8_LABEL: &str = "PRIVATE KEY";

const IV_LEN: usize = 16;
const SALT_LEN: usize = 8;

fn malformed(detail: impl Into<String>) -> DecodeError {
    DecodeError::Malformed(detail.into())
}

/// One armored block: label, RFC 1421 headers, and concatenated base64 body.
struct PemBlock<'a> {
    label: &'a str,
    headers: Vec<(&'a str, &'a str)>,
    body: String,
}

impl<'a> PemBlock<'a> {
    /// Parse a block whose lines have already been trimmed.
    fn parse(pem: &'a str) -> Result<Self, DecodeError> {
        let mut lines = pem.lines();
        let label = lines
            .next()
            .and_then(label_of)
            .ok_or_else(|| malformed("missing PEM header line"))?;
        let footer = format!("-----END {label}-----");

        let mut headers = Vec::new();
        let mut body = String::new();
        let mut closed = false;
        for line in lines {
            if line == footer {
                closed = true;
                break;
            }
            match line.split_once(':') {
                Some((name, value)) => headers.push((name.trim(), value.trim())),
                None => body.push_str(line),
            }
        }
        if !closed {
            return Err(malformed(format!("missing PEM footer for {label}")));
        }

        Ok(Self {
            label,
            headers,
            body,
        })
    }

    fn header(&self, name: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
    }
}

/// Label of a `-----BEGIN <label>-----` line.
pub fn label_of(line: &str) -> Option<&str> {
    line.strip_prefix("-----BEGIN ")?.strip_suffix("-----")
}

/// Decode an RSA key in one of the traditional OpenSSL encodings.
pub fn decode(pem: &str, passphrase: &SecretString) -> Result<PrivateKey, DecodeError> {
    let block = PemBlock::parse(pem)?;
    let der = Zeroizing::new(
        BASE64_STANDARD
            .decode(&block.body)
            .map_err(|e| malformed(format!("invalid PEM body: {e}")))?,
    );

    let key = match block.label {
        RSA_LABEL => match block.header("DEK-Info") {
            None => RsaPrivateKey::from_pkcs1_der(&der)
                .map_err(|e| malformed(format!("invalid PKCS#1 key: {e}")))?,
            Some(dek_info) => {
                let plain = decrypt(dek_info, &der, passphrase)?;
                // A wrong passphrase can still unpad cleanly; the DER then fails to parse.
                RsaPrivateKey::from_pkcs1_der(&plain)
                    .map_err(|_| DecodeError::IncorrectPassphrase)?
            }
        },
        PKCS8_LABEL => RsaPrivateKey::from_pkcs8_der(&der)
            .map_err(|e| malformed(format!("unsupported PKCS#8 key: {e}")))?,
        other => return Err(malformed(format!("unsupported key format: {other}"))),
    };

    let keypair = RsaKeypair::try_from(&key).map_err(|e| malformed(e.to_string()))?;
    PrivateKey::new(KeypairData::Rsa(keypair), "").map_err(|e| malformed(e.to_string()))
}

/// Undo OpenSSL's legacy PEM encryption described by a `DEK-Info` header.
fn decrypt(
    dek_info: &str,
    ciphertext: &[u8],
    passphrase: &SecretString,
) -> Result<Zeroizing<Vec<u8>>, DecodeError> {
    let (cipher, iv_hex) = dek_info
        .split_once(',')
        .ok_or_else(|| malformed("invalid DEK-Info header"))?;
    let iv = hex::decode(iv_hex.trim()).map_err(|_| malformed("invalid DEK-Info IV"))?;
    if iv.len() != IV_LEN {
        return Err(malformed("invalid DEK-Info IV"));
    }

    let password = passphrase.expose_secret().as_bytes();
    let plain = match cipher.trim() {
        "AES-128-CBC" => {
            let key = derive_key(password, &iv[..SALT_LEN], 16);
            Aes128CbcDec::new_from_slices(&key, &iv)
                .map_err(|_| malformed("invalid AES-128 key length"))?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        }
        "AES-256-CBC" => {
            let key = derive_key(password, &iv[..SALT_LEN], 32);
            Aes256CbcDec::new_from_slices(&key, &iv)
                .map_err(|_| malformed("invalid AES-256 key length"))?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        }
        other => return Err(malformed(format!("unsupported PEM cipher: {other}"))),
    };

    plain
        .map(Zeroizing::new)
        .map_err(|_| DecodeError::IncorrectPassphrase)
}

/// OpenSSL `EVP_BytesToKey` with MD5 and a single iteration.
fn derive_key(password: &[u8], salt: &[u8], len: usize) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(Vec::with_capacity(len + 16));
    while key.len() < len {
        let mut hasher = Md5::new();
        hasher.update(&key[key.len().saturating_sub(16)..]);
        hasher.update(password);
        hasher.update(salt);
        key.extend_from_slice(&hasher.finalize());
    }
    key.truncate(len);
    key
}
