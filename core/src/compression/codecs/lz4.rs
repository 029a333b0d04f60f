//! codecs/lz4.rs
//! LZ4 block codec. The descriptor carries the plaintext length, so blocks
//! are stored without lz4_flex's size prefix.
use lz4_flex::block::{compress, decompress};

use crate::compression::types::{check_len, CompressionError, Compressor, Decompressor};

/// lz4_flex has no level or dictionary knobs in block mode.
pub struct Lz4Codec;

impl Compressor for Lz4Codec {
    fn compress_segment(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        out.extend_from_slice(&compress(input));
        Ok(())
    }
}

impl Decompressor for Lz4Codec {
    fn decompress_segment(&mut self, input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let decompressed = decompress(input, expected_len)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "lz4", msg: e.to_string() })?;

        check_len("lz4", decompressed.len(), expected_len)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
