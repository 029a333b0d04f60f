//! src/compression/codecs/zstd.rs
//!
//! Zstd block codec. Each segment is one standalone zstd frame produced by
//! `zstd::bulk`, so it decodes without any neighbouring segment.

use crate::compression::types::{check_len, CompressionError, Compressor, Decompressor};

pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Compressor for ZstdCompressor {
    fn compress_segment(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let compressed = zstd::bulk::compress(input, self.level)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "zstd", msg: e.to_string() })?;
        out.extend_from_slice(&compressed);
        Ok(())
    }
}

pub struct ZstdDecompressor;

impl Decompressor for ZstdDecompressor {
    fn decompress_segment(&mut self, input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        // Capacity bounds the output; an oversized frame errors instead of growing.
        let decompressed = zstd::bulk::decompress(input, expected_len)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "zstd", msg: e.to_string() })?;

        check_len("zstd", decompressed.len(), expected_len)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
