//! src/crypto/aead.rs
//! AEAD interface for AES-256-GCM and ChaCha20-Poly1305.
//!
//! Design notes:
//! - Both ciphers use 32-byte keys and 12-byte nonces.
//! - Tag verification is constant-time and fails closed (no partial plaintext).
//! - Caller provides nonce and AAD per segment.
//! - Cipher selection is driven by the header's cipher registry id.

use crate::crypto::types::{CryptoError, KEY_LEN_32, NONCE_LEN_12, TAG_LEN};
use crate::headers::CipherSuite;

use aes_gcm::aead::{Aead, KeyInit, Payload};

use aes_gcm::{Aes256Gcm, Nonce as AesNonce};
use chacha20poly1305::{ChaCha20Poly1305, Nonce as ChaNonce};

/// Unified AEAD cipher implementation selected by header.cipher.
#[derive(Clone)]
pub enum AeadImpl {
    AesGcm(Aes256Gcm),
    ChaCha(ChaCha20Poly1305),
}

impl AeadImpl {
    /// Construct the cipher for `suite` keyed with a derived segment key.
    pub fn new(suite: CipherSuite, key: &[u8]) -> Result<Self, CryptoError> {
        let bad_len = || CryptoError::InvalidKeyLen { expected: KEY_LEN_32, actual: key.len() };
        if key.len() != KEY_LEN_32 {
            return Err(bad_len());
        }

        match suite {
            CipherSuite::Aes256Gcm => {
                Aes256Gcm::new_from_slice(key).map(Self::AesGcm).map_err(|_| bad_len())
            }
            CipherSuite::Chacha20Poly1305 => {
                ChaCha20Poly1305::new_from_slice(key).map(Self::ChaCha).map_err(|_| bad_len())
            }
        }
    }

    /// Seal plaintext; returns `ciphertext ‖ tag`.
    pub fn seal(&self, nonce_12: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        check_nonce(nonce_12)?;

        match self {
            AeadImpl::AesGcm(cipher) => cipher
                .encrypt(AesNonce::from_slice(nonce_12), Payload { msg: plaintext, aad })
                .map_err(|_| CryptoError::Failure("AES-GCM seal failed".into())),
            AeadImpl::ChaCha(cipher) => cipher
                .encrypt(ChaNonce::from_slice(nonce_12), Payload { msg: plaintext, aad })
                .map_err(|_| CryptoError::Failure("ChaCha20-Poly1305 seal failed".into())),
        }
    }

    /// Open `ciphertext ‖ tag`. Any tag mismatch is `CryptoError::TagMismatch`.
    pub fn open(&self, nonce_12: &[u8], aad: &[u8], ciphertext_and_tag: &[u8]) -> Result<Vec<u8>, CryptoError> {
        check_nonce(nonce_12)?;

        if ciphertext_and_tag.len() < TAG_LEN {
            return Err(CryptoError::Failure("ciphertext too short".into()));
        }

        match self {
            AeadImpl::AesGcm(cipher) => cipher
                .decrypt(AesNonce::from_slice(nonce_12), Payload { msg: ciphertext_and_tag, aad })
                .map_err(|_| CryptoError::TagMismatch),
            AeadImpl::ChaCha(cipher) => cipher
                .decrypt(ChaNonce::from_slice(nonce_12), Payload { msg: ciphertext_and_tag, aad })
                .map_err(|_| CryptoError::TagMismatch),
        }
    }
}

#[inline]
fn check_nonce(nonce_12: &[u8]) -> Result<(), CryptoError> {
    if nonce_12.len() != NONCE_LEN_12 {
        return Err(CryptoError::InvalidNonceLen { expected: NONCE_LEN_12, actual: nonce_12.len() });
    }
    Ok(())
}
