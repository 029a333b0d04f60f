//! container/parse.rs
//!
//! Reads an archive front to back: header, metadata block, key block,
//! segment table, then checks the payload length by seeking to the end.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;

use crate::compression::CompressionCodec;
use crate::container::types::{Container, SegmentDescriptor, SegmentFlags};
use crate::crypto::TAG_LEN;
use crate::headers::{decode_header_le, ArchiveHeader, HeaderError, HEADER_LEN};
use crate::types::{AeaError, Truncation};

/// Fill `buf` as far as the reader allows; returns bytes read.
fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_block<R: Read>(r: &mut R, block: &'static str, len: u32) -> Result<Vec<u8>, AeaError> {
    let mut buf = vec![0u8; len as usize];
    let have = read_full(r, &mut buf)?;
    if have < buf.len() {
        return Err(Truncation::Block { block, have, need: buf.len() }.into());
    }
    Ok(buf)
}

/// Decode one 32-byte descriptor. `ciphertext_offset` is filled in by the caller.
pub fn decode_segment_descriptor(buf: &[u8]) -> Result<SegmentDescriptor, HeaderError> {
    if buf.len() < SegmentDescriptor::LEN {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need: SegmentDescriptor::LEN });
    }

    let index = LittleEndian::read_u32(&buf[0..4]);
    let flags_raw = LittleEndian::read_u16(&buf[4..6]);
    let reserved = LittleEndian::read_u16(&buf[6..8]);
    let plaintext_len = LittleEndian::read_u32(&buf[8..12]);
    let stored_len = LittleEndian::read_u32(&buf[12..16]);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&buf[16..32]);

    let flags = SegmentFlags::from_bits(flags_raw).ok_or_else(|| {
        HeaderError::SegmentTable(format!("segment {index}: unknown flags 0x{flags_raw:04x}"))
    })?;

    Ok(SegmentDescriptor { index, flags, reserved, plaintext_len, stored_len, tag, ciphertext_offset: 0 })
}

/// Check table invariants against the header and assign ciphertext offsets.
pub fn validate_segment_table(
    header: &ArchiveHeader,
    segments: &mut [SegmentDescriptor],
) -> Result<(), HeaderError> {
    let codec = header.codec()?;
    let last = segments.len().saturating_sub(1);
    let mut offset = 0u64;
    let mut plaintext_total = 0u64;

    for (pos, d) in segments.iter_mut().enumerate() {
        let fail = |msg: String| HeaderError::SegmentTable(format!("segment {pos}: {msg}"));

        if d.index as usize != pos {
            return Err(fail(format!("index {} out of order", d.index)));
        }
        if d.reserved != 0 {
            return Err(fail("reserved field must be zero".into()));
        }
        if d.plaintext_len == 0 || d.plaintext_len > header.segment_size {
            return Err(fail(format!(
                "plaintext_len {} outside 1..={}", d.plaintext_len, header.segment_size
            )));
        }
        if pos != last && d.plaintext_len != header.segment_size {
            return Err(fail("only the final segment may be short".into()));
        }
        if d.is_final() != (pos == last) {
            return Err(fail("FINAL flag must mark exactly the last segment".into()));
        }
        if d.is_compressed() {
            if codec == CompressionCodec::None {
                return Err(fail("COMPRESSED set but archive has no codec".into()));
            }
            if d.stored_len == 0 {
                return Err(fail("compressed segment is empty".into()));
            }
        } else if d.stored_len != d.plaintext_len {
            return Err(fail(format!(
                "uncompressed stored_len {} != plaintext_len {}", d.stored_len, d.plaintext_len
            )));
        }

        d.ciphertext_offset = offset;
        offset += d.stored_len as u64;
        plaintext_total += d.plaintext_len as u64;
    }

    if offset != header.payload_size {
        return Err(HeaderError::SegmentTable(format!(
            "stored lengths sum to {offset}, header declares {}", header.payload_size
        )));
    }
    if plaintext_total != header.plaintext_size {
        return Err(HeaderError::SegmentTable(format!(
            "plaintext lengths sum to {plaintext_total}, header declares {}", header.plaintext_size
        )));
    }
    Ok(())
}

/// Parse an archive without decrypting anything.
///
/// # Errors
/// - `MalformedHeader` for bad magic, version, CRC, fields or table invariants.
/// - `TruncatedArchive` when any region is shorter than declared.
/// - `Io` for underlying read or seek failures.
pub fn parse_container<R: Read + Seek>(r: &mut R) -> Result<Container, AeaError> {
    let start = r.stream_position()?;

    let mut header_bytes = [0u8; HEADER_LEN];
    let have = read_full(r, &mut header_bytes)?;
    if have < HEADER_LEN {
        // A short foreign file is still reported as foreign.
        if have >= 4 {
            let mut magic = [0u8; 4];
            magic.copy_from_slice(&header_bytes[..4]);
            ArchiveHeader { magic, ..Default::default() }.validate_identity()?;
        }
        return Err(Truncation::Header { have, need: HEADER_LEN }.into());
    }

    let header = decode_header_le(&header_bytes)?;
    let profile = header.profile()?;

    let metadata_block = read_block(r, "metadata", header.metadata_len)?;
    let key_block = read_block(r, "key", header.key_block_len)?;

    // Declared count is untrusted until the descriptors are actually there.
    let mut segments = Vec::with_capacity(header.segment_count.min(4096) as usize);
    let mut desc = [0u8; SegmentDescriptor::LEN];
    for i in 0..header.segment_count {
        if read_full(r, &mut desc)? < SegmentDescriptor::LEN {
            return Err(Truncation::SegmentTable {
                expected_segments: header.segment_count,
                available_segments: i,
            }
            .into());
        }
        segments.push(decode_segment_descriptor(&desc)?);
    }
    validate_segment_table(&header, &mut segments)?;

    let payload_offset = r.stream_position()?;
    let end = r.seek(SeekFrom::End(0))?;
    let available = end.saturating_sub(payload_offset);
    if available < header.payload_size {
        return Err(Truncation::Payload { expected_bytes: header.payload_size, available_bytes: available }.into());
    }
    if available > header.payload_size {
        return Err(HeaderError::Validation(format!(
            "{} trailing bytes after payload", available - header.payload_size
        ))
        .into());
    }

    debug!(
        profile = ?profile,
        segments = segments.len(),
        plaintext_size = header.plaintext_size,
        payload_size = header.payload_size,
        payload_offset = payload_offset - start,
        "parsed archive container"
    );

    Ok(Container {
        header,
        header_bytes,
        profile,
        metadata_block,
        key_block,
        segments,
        payload_offset,
    })
}
