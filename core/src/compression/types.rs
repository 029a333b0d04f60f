//! compression/types.rs
//! Codec ids, error type and per-segment codec traits.
use num_enum::TryFromPrimitive;
use thiserror::Error;

use crate::compression::constants::codec_ids;
use crate::utils::enum_name_or_hex;

/// Compression codec applied to segments flagged `COMPRESSED`.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum CompressionCodec {
    None    = codec_ids::NONE,
    Zstd    = codec_ids::ZSTD,
    Lz4     = codec_ids::LZ4,
    Deflate = codec_ids::DEFLATE,
}

impl CompressionCodec {
    pub fn verify(raw: u16) -> Result<Self, CompressionError> {
        CompressionCodec::try_from_primitive(raw)
            .map_err(|_| CompressionError::UnsupportedCodec { codec_id: raw })
    }

    pub fn name(self) -> &'static str {
        match self {
            CompressionCodec::None => "none",
            CompressionCodec::Zstd => "zstd",
            CompressionCodec::Lz4 => "lz4",
            CompressionCodec::Deflate => "deflate",
        }
    }
}

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("unsupported compression codec: {}", enum_name_or_hex::<CompressionCodec>(*codec_id))]
    UnsupportedCodec { codec_id: u16 },

    #[error("codec {codec} process failed: {msg}")]
    CodecProcessFailed { codec: &'static str, msg: String },

    #[error("codec {codec} produced {have} bytes, descriptor declares {expected}")]
    LengthMismatch { codec: &'static str, have: usize, expected: usize },
}

// Require Send so trait objects can cross thread boundaries.
pub trait Compressor: Send {
    /// Compress one segment's plaintext into `out`.
    fn compress_segment(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError>;
}

pub trait Decompressor: Send {
    /// Decompress one segment into `out`. The result must be exactly
    /// `expected_len` bytes; codecs stop reading past that bound.
    fn decompress_segment(
        &mut self,
        input: &[u8],
        expected_len: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), CompressionError>;
}

/// Shared post-condition for every decompressor.
#[inline]
pub(crate) fn check_len(codec: &'static str, have: usize, expected: usize) -> Result<(), CompressionError> {
    if have != expected {
        return Err(CompressionError::LengthMismatch { codec, have, expected });
    }
    Ok(())
}
