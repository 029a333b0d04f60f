use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::{
    compression::CompressionError,
    crypto::CryptoError,
    headers::HeaderError,
    keys::KeyError,
    metadata::MetadataError,
};

/// Where an archive ran out of bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Truncation {
    #[error("header: {have} of {need} bytes")]
    Header { have: usize, need: usize },

    #[error("{block} block: {have} of {need} bytes")]
    Block { block: &'static str, have: usize, need: usize },

    #[error("segment table: {available_segments} of {expected_segments} descriptors")]
    SegmentTable { expected_segments: u32, available_segments: u32 },

    #[error("payload: {available_bytes} of {expected_bytes} bytes")]
    Payload { expected_bytes: u64, available_bytes: u64 },
}

/// Unified archive error.
/// - `From<T>` impls let `?` cross module boundaries.
/// - Each failure carries enough context (segment index, offset) to tell a
///   wrong key from a corrupted file.
#[derive(Debug, Error)]
pub enum AeaError {
    /// Bad magic, unsupported version, CRC mismatch, invalid field or segment table.
    #[error("malformed header: {0}")]
    MalformedHeader(#[from] HeaderError),

    #[error("truncated archive: {0}")]
    TruncatedArchive(Truncation),

    #[error("malformed metadata: {0}")]
    MalformedMetadata(#[from] MetadataError),

    #[error("key resolution failed: {0}")]
    KeyResolution(#[from] KeyError),

    /// Tag mismatch: wrong key or tampered data. Nothing from this segment
    /// was emitted.
    #[error("authentication failed for segment {segment}")]
    AuthenticationFailure { segment: u32 },

    #[error("decompression failed for segment {segment}: {source}")]
    Decompression {
        segment: u32,
        #[source]
        source: CompressionError,
    },

    /// Key-schedule or cipher construction failure (not a tag mismatch).
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Decrypt never replaces an existing file, including the archive itself.
    #[error("output already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("pipeline error: {0}")]
    Pipeline(&'static str),
}

impl AeaError {
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, AeaError::AuthenticationFailure { .. })
    }

    /// Segment the error is attributed to, if any.
    pub fn segment_index(&self) -> Option<u32> {
        match self {
            AeaError::AuthenticationFailure { segment } | AeaError::Decompression { segment, .. } => {
                Some(*segment)
            }
            _ => None,
        }
    }
}

impl From<Truncation> for AeaError {
    fn from(t: Truncation) -> Self {
        AeaError::TruncatedArchive(t)
    }
}
