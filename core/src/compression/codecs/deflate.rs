//! Deflate (zlib wrapper) via flate2, one zlib stream per segment.

use std::io::{Read, Write};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use crate::compression::types::{check_len, CompressionError, Compressor, Decompressor};

pub struct DeflateCompressor {
    level: Compression,
}

impl DeflateCompressor {
    pub fn new(level: i32) -> Self {
        let level = match level {
            0..=9 => Compression::new(level as u32),
            _ => Compression::default(),
        };
        Self { level }
    }
}

impl Compressor for DeflateCompressor {
    fn compress_segment(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let mut enc = ZlibEncoder::new(Vec::new(), self.level);
        enc.write_all(input)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "deflate", msg: e.to_string() })?;
        let compressed = enc.finish()
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "deflate", msg: e.to_string() })?;
        out.extend_from_slice(&compressed);
        Ok(())
    }
}

pub struct DeflateDecompressor;

impl Decompressor for DeflateDecompressor {
    fn decompress_segment(&mut self, input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        // Read one byte past the bound so an oversized stream is detected
        // without inflating all of it.
        let mut dec = ZlibDecoder::new(input).take(expected_len as u64 + 1);
        let mut decompressed = Vec::with_capacity(expected_len);
        dec.read_to_end(&mut decompressed)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "deflate", msg: e.to_string() })?;

        check_len("deflate", decompressed.len(), expected_len)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
