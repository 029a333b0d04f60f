//! container/encode.rs
//! Inverse of the table decoder, used to assemble fixture archives.

use byteorder::{ByteOrder, LittleEndian};

use crate::container::types::SegmentDescriptor;

pub fn encode_segment_descriptor(d: &SegmentDescriptor) -> [u8; SegmentDescriptor::LEN] {
    let mut out = [0u8; SegmentDescriptor::LEN];
    LittleEndian::write_u32(&mut out[0..4], d.index);
    LittleEndian::write_u16(&mut out[4..6], d.flags.bits());
    LittleEndian::write_u16(&mut out[6..8], d.reserved);
    LittleEndian::write_u32(&mut out[8..12], d.plaintext_len);
    LittleEndian::write_u32(&mut out[12..16], d.stored_len);
    out[16..32].copy_from_slice(&d.tag);
    out
}

pub fn encode_segment_table(segments: &[SegmentDescriptor]) -> Vec<u8> {
    let mut out = Vec::with_capacity(segments.len() * SegmentDescriptor::LEN);
    for d in segments {
        out.extend_from_slice(&encode_segment_descriptor(d));
    }
    out
}
