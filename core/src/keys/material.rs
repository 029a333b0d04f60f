//! keys/material.rs
//! Caller-supplied key material.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::KEY_LEN_32;
use crate::keys::types::KeyError;

/// Prefix accepted on textual symmetric keys, e.g. `base64:TSKOZk6r...`.
pub const BASE64_KEY_PREFIX: &str = "base64:";

/// Raw 32-byte archive key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_LEN_32]);

impl SymmetricKey {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != KEY_LEN_32 {
            return Err(KeyError::InvalidLength { expected: KEY_LEN_32, got: bytes.len() });
        }
        let mut key = [0u8; KEY_LEN_32];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN_32] {
        &self.0
    }
}

/// Key material for `decrypt`.
#[derive(Clone)]
pub enum KeyMaterial {
    /// Archive key given directly (or already unwrapped).
    Symmetric(SymmetricKey),
    /// P-256 private key, PEM encoded (PKCS#8 or SEC1).
    Asymmetric(Zeroizing<Vec<u8>>),
}

impl KeyMaterial {
    pub fn symmetric(bytes: &[u8]) -> Result<Self, KeyError> {
        SymmetricKey::from_slice(bytes).map(KeyMaterial::Symmetric)
    }

    /// Parse a textual symmetric key: `base64:<b64>`, 64 hex chars, or bare base64.
    pub fn parse_symmetric(text: &str) -> Result<Self, KeyError> {
        let text = text.trim();
        let raw = if let Some(b64) = text.strip_prefix(BASE64_KEY_PREFIX) {
            Zeroizing::new(
                STANDARD.decode(b64).map_err(|e| KeyError::InvalidEncoding(format!("base64: {e}")))?,
            )
        } else if text.len() == 2 * KEY_LEN_32 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
            Zeroizing::new(hex::decode(text).map_err(|e| KeyError::InvalidEncoding(format!("hex: {e}")))?)
        } else {
            Zeroizing::new(STANDARD.decode(text).map_err(|_| {
                KeyError::InvalidEncoding("expected base64:<key>, 64 hex characters or base64".into())
            })?)
        };
        Self::symmetric(&raw)
    }

    pub fn from_pem(pem: impl Into<Vec<u8>>) -> Self {
        KeyMaterial::Asymmetric(Zeroizing::new(pem.into()))
    }

    pub fn from_pem_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        std::fs::read(path).map(Self::from_pem)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            KeyMaterial::Symmetric(_) => "symmetric",
            KeyMaterial::Asymmetric(_) => "asymmetric",
        }
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyMaterial::{}(<redacted>)", self.kind())
    }
}
