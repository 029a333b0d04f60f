//! metadata/codec.rs
//!
//! Decoder for the metadata block, plus the encoder fixture tooling uses.

use std::collections::HashSet;

use byteorder::{ByteOrder, LittleEndian};

use crate::constants::MAX_METADATA_LEN;
use crate::metadata::types::{Metadata, MetadataEntry, MetadataError};

const LEN_PREFIX: usize = 4;

/// Decode a metadata block into ordered entries.
///
/// An empty block yields empty metadata. Every byte must belong to an entry.
pub fn decode_metadata(block: &[u8]) -> Result<Metadata, MetadataError> {
    if block.len() > MAX_METADATA_LEN {
        return Err(MetadataError::TooLarge { have: block.len(), max: MAX_METADATA_LEN });
    }

    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut offset = 0usize;

    while offset < block.len() {
        let rest = &block[offset..];
        if rest.len() < LEN_PREFIX {
            return Err(MetadataError::Truncated { offset, need: LEN_PREFIX, have: rest.len() });
        }

        let entry_len = LittleEndian::read_u32(&rest[..LEN_PREFIX]);
        // Smallest entry: prefix + one key byte + NUL.
        if (entry_len as usize) < LEN_PREFIX + 2 {
            return Err(MetadataError::InvalidEntryLength { offset, len: entry_len });
        }
        if entry_len as usize > rest.len() {
            return Err(MetadataError::Truncated { offset, need: entry_len as usize, have: rest.len() });
        }

        let body = &rest[LEN_PREFIX..entry_len as usize];
        let nul = body.iter().position(|&b| b == 0)
            .ok_or(MetadataError::MissingTerminator { offset })?;
        if nul == 0 {
            return Err(MetadataError::EmptyKey { offset });
        }

        let key = std::str::from_utf8(&body[..nul])
            .map_err(|_| MetadataError::InvalidKey { offset })?
            .to_owned();
        if !seen.insert(key.clone()) {
            return Err(MetadataError::DuplicateKey { offset, key });
        }

        entries.push(MetadataEntry { key, value: body[nul + 1..].to_vec() });
        offset += entry_len as usize;
    }

    Ok(Metadata::from_entries(entries))
}

/// Encode entries in order. Keys must be non-empty, NUL-free and unique.
pub fn encode_metadata(entries: &[MetadataEntry]) -> Result<Vec<u8>, MetadataError> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();

    for e in entries {
        let offset = out.len();
        if e.key.is_empty() {
            return Err(MetadataError::EmptyKey { offset });
        }
        if e.key.as_bytes().contains(&0) {
            return Err(MetadataError::InvalidKey { offset });
        }
        if !seen.insert(e.key.as_str()) {
            return Err(MetadataError::DuplicateKey { offset, key: e.key.clone() });
        }

        let total = LEN_PREFIX + e.key.len() + 1 + e.value.len();
        let len = u32::try_from(total)
            .map_err(|_| MetadataError::InvalidEntryLength { offset, len: u32::MAX })?;

        let mut prefix = [0u8; LEN_PREFIX];
        LittleEndian::write_u32(&mut prefix, len);
        out.extend_from_slice(&prefix);
        out.extend_from_slice(e.key.as_bytes());
        out.push(0);
        out.extend_from_slice(&e.value);
    }

    if out.len() > MAX_METADATA_LEN {
        return Err(MetadataError::TooLarge { have: out.len(), max: MAX_METADATA_LEN });
    }
    Ok(out)
}
