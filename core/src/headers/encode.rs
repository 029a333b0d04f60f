//! headers/encode.rs
//!
//! Header encoding. Used to rebuild the exact bytes bound into segment AAD
//! and by fixture tooling.

use byteorder::{ByteOrder, LittleEndian};

use crate::headers::types::{ArchiveHeader, HEADER_CRC_SPAN, HEADER_LEN};
use crate::utils::compute_crc32;

/// Serialize an `ArchiveHeader` into its 84-byte wire form.
///
/// The CRC field is recomputed from the encoded bytes; `h.crc32` is ignored.
pub fn encode_header_le(h: &ArchiveHeader) -> [u8; HEADER_LEN] {
    let mut out = [0u8; HEADER_LEN];

    out[0..4].copy_from_slice(&h.magic);
    LittleEndian::write_u16(&mut out[4..6], h.version);
    LittleEndian::write_u16(&mut out[6..8], h.profile);
    LittleEndian::write_u16(&mut out[8..10], h.cipher);
    LittleEndian::write_u16(&mut out[10..12], h.hkdf_prf);
    LittleEndian::write_u16(&mut out[12..14], h.compression);
    LittleEndian::write_u16(&mut out[14..16], h.flags);
    LittleEndian::write_u32(&mut out[16..20], h.metadata_len);
    LittleEndian::write_u32(&mut out[20..24], h.key_block_len);
    LittleEndian::write_u32(&mut out[24..28], h.segment_count);
    LittleEndian::write_u32(&mut out[28..32], h.segment_size);
    LittleEndian::write_u64(&mut out[32..40], h.plaintext_size);
    LittleEndian::write_u64(&mut out[40..48], h.payload_size);
    out[48..80].copy_from_slice(&h.salt);

    let crc = compute_crc32(&out[..HEADER_CRC_SPAN]);
    LittleEndian::write_u32(&mut out[80..84], crc);

    out
}
