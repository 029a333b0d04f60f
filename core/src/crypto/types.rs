// ## 📂 File: `src/crypto/types.rs`

use thiserror::Error;

use crate::headers::HkdfPrf;
use crate::headers::HEADER_LEN;
use crate::utils::enum_name_or_hex;

/// Stable key and nonce sizes.
pub const KEY_LEN_32: usize = 32;

/// Standard 12-byte nonce length for AES-GCM and ChaCha20-Poly1305.
pub const NONCE_LEN_12: usize = 12;

/// Fixed AEAD tag length (bytes).
pub const TAG_LEN: usize = 16;

/// SHA-256 output length, used for the archive context digest.
pub const CONTEXT_DIGEST_LEN: usize = 32;

/// Per-segment fields bound into the AAD.
///
/// All fields are little-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentAad {
    pub index: u32,
    pub flags: u16,
    pub plaintext_len: u32,
    pub stored_len: u32,
}

impl SegmentAad {
    pub const SEGMENT_LEN: usize = 4 // index
        + 2                          // flags
        + 4                          // plaintext_len
        + 4;                         // stored_len

    pub const LEN_V1: usize = HEADER_LEN + CONTEXT_DIGEST_LEN + SegmentAad::SEGMENT_LEN;
}

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Unsupported HKDF PRF selection from header.
    #[error("unsupported HKDF PRF: {}", enum_name_or_hex::<HkdfPrf>(*prf_id))]
    UnsupportedPrf { prf_id: u16 },

    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLen { expected: usize, actual: usize },

    #[error("invalid nonce length: expected={expected}, actual={actual}")]
    InvalidNonceLen { expected: usize, actual: usize },

    /// AEAD tag mismatch (authentication failure).
    #[error("AEAD tag mismatch")]
    TagMismatch,

    #[error("crypto failure: {0}")]
    Failure(String),
}
