use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::KEY_LEN_32;
use crate::headers::{HeaderError, Profile};

/// Derived 32-byte content encryption key. Never persisted; wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ContentEncryptionKey(pub(crate) [u8; KEY_LEN_32]);

impl ContentEncryptionKey {
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN_32] {
        &self.0
    }
}

impl std::fmt::Debug for ContentEncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ContentEncryptionKey(<redacted>)")
    }
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid key encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid private key PEM: {0}")]
    InvalidPem(String),

    #[error("invalid ephemeral public key: {0}")]
    InvalidPublicKey(String),

    #[error("key block scheme 0x{scheme:04x} does not match profile {profile:?}")]
    SchemeMismatch { profile: Profile, scheme: u16 },

    #[error("{material} key material is not accepted by profile {profile:?}")]
    UnsupportedMaterial { profile: Profile, material: &'static str },

    #[error("profile {profile:?} requires key material")]
    MissingKeyMaterial { profile: Profile },

    #[error("malformed key block: {0}")]
    MalformedKeyBlock(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error(transparent)]
    Header(#[from] HeaderError),
}
