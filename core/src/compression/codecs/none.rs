//! codecs/none.rs
//! Pass-through codec.

use crate::compression::types::{check_len, CompressionError, Compressor, Decompressor};

pub struct NoneCodec;

impl Compressor for NoneCodec {
    fn compress_segment(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        out.extend_from_slice(input);
        Ok(())
    }
}

impl Decompressor for NoneCodec {
    fn decompress_segment(&mut self, input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        check_len("none", input.len(), expected_len)?;
        out.extend_from_slice(input);
        Ok(())
    }
}
