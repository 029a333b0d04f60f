//! compression/registry.rs
//! Codec registry and factory functions.

use crate::compression::codecs::{deflate, lz4, none, zstd};
use crate::compression::constants::{DEFAULT_LEVEL_DEFLATE, DEFAULT_LEVEL_LZ4, DEFAULT_LEVEL_ZSTD};
use crate::compression::types::{CompressionCodec, CompressionError, Compressor, Decompressor};

pub struct CodecInfo {
    pub name: &'static str,
    pub default_level: i32,
}

pub fn resolve(codec: CompressionCodec) -> CodecInfo {
    let default_level = match codec {
        CompressionCodec::None => 0,
        CompressionCodec::Zstd => DEFAULT_LEVEL_ZSTD,
        CompressionCodec::Lz4 => DEFAULT_LEVEL_LZ4,
        CompressionCodec::Deflate => DEFAULT_LEVEL_DEFLATE,
    };
    CodecInfo { name: codec.name(), default_level }
}

pub fn create_compressor(codec: CompressionCodec, level: Option<i32>) -> Box<dyn Compressor + Send> {
    let level = level.unwrap_or(resolve(codec).default_level);
    match codec {
        CompressionCodec::None => Box::new(none::NoneCodec),
        CompressionCodec::Zstd => Box::new(zstd::ZstdCompressor::new(level)),
        CompressionCodec::Lz4 => Box::new(lz4::Lz4Codec),
        CompressionCodec::Deflate => Box::new(deflate::DeflateCompressor::new(level)),
    }
}

pub fn create_decompressor(codec: CompressionCodec) -> Box<dyn Decompressor + Send> {
    match codec {
        CompressionCodec::None => Box::new(none::NoneCodec),
        CompressionCodec::Zstd => Box::new(zstd::ZstdDecompressor),
        CompressionCodec::Lz4 => Box::new(lz4::Lz4Codec),
        CompressionCodec::Deflate => Box::new(deflate::DeflateDecompressor),
    }
}

/// Registry lookup from a raw header id.
pub fn decompressor_for_id(codec_id: u16) -> Result<Box<dyn Decompressor + Send>, CompressionError> {
    CompressionCodec::verify(codec_id).map(create_decompressor)
}
