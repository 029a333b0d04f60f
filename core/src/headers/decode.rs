//! headers/decode.rs
//!
//! Header decoding.
//!
//! - Field order must match `encode.rs` exactly.
//! - Magic and version are checked before the CRC so that a foreign file is
//!   reported as "not an AEA1 archive" rather than a checksum failure.

use byteorder::{ByteOrder, LittleEndian};

use crate::constants::SALT_LEN;
use crate::headers::types::{ArchiveHeader, HeaderError, HEADER_CRC_SPAN, HEADER_LEN};
use crate::utils::compute_crc32;

/// Deserialize an 84-byte little-endian header into `ArchiveHeader`.
///
/// # Returns
/// - `Ok(ArchiveHeader)` if decoding, CRC and validation succeed.
/// - `Err(HeaderError)` on short buffer, bad identity, CRC mismatch or invalid fields.
pub fn decode_header_le(buf: &[u8]) -> Result<ArchiveHeader, HeaderError> {
    if buf.len() < HEADER_LEN {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need: HEADER_LEN });
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&buf[0..4]);
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&buf[48..80]);

    let h = ArchiveHeader {
        magic,                                            // 0..4
        version:        LittleEndian::read_u16(&buf[4..6]),
        profile:        LittleEndian::read_u16(&buf[6..8]),
        cipher:         LittleEndian::read_u16(&buf[8..10]),
        hkdf_prf:       LittleEndian::read_u16(&buf[10..12]),
        compression:    LittleEndian::read_u16(&buf[12..14]),
        flags:          LittleEndian::read_u16(&buf[14..16]),
        metadata_len:   LittleEndian::read_u32(&buf[16..20]),
        key_block_len:  LittleEndian::read_u32(&buf[20..24]),
        segment_count:  LittleEndian::read_u32(&buf[24..28]),
        segment_size:   LittleEndian::read_u32(&buf[28..32]),
        plaintext_size: LittleEndian::read_u64(&buf[32..40]),
        payload_size:   LittleEndian::read_u64(&buf[40..48]),
        salt,                                             // 48..80
        crc32:          LittleEndian::read_u32(&buf[80..84]),
    };

    h.validate_identity()?;

    let computed = compute_crc32(&buf[..HEADER_CRC_SPAN]);
    if h.crc32 != computed {
        return Err(HeaderError::InvalidCrc32 { stored: h.crc32, computed });
    }

    h.validate()?;
    Ok(h)
}
