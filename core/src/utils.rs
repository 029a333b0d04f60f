use std::fmt;
use std::path::Path;
use num_enum::TryFromPrimitive;

use crate::constants::FALLBACK_OUTPUT_NAME;

/// CRC-32 (IEEE) over `data`.
#[inline]
pub fn compute_crc32(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Render a registry id by variant name, or as hex when unknown.
pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

/// Printable form for short byte strings: ASCII when graphic, hex otherwise.
pub fn fmt_bytes(b: &[u8]) -> String {
    if b.iter().all(|&c| c.is_ascii_graphic() || c == b' ') {
        format!("b\"{}\"", String::from_utf8_lossy(b))
    } else {
        format!("0x{}", hex::encode(b))
    }
}

/// Output artifact name for an archive path: file name minus its extension.
///
/// `iPhone16,2_d34e.aea` → `iPhone16,2_d34e`. Falls back to
/// [`FALLBACK_OUTPUT_NAME`] when nothing usable remains.
pub fn output_name_for(archive: &Path) -> String {
    archive
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && !s.starts_with('.'))
        .map(str::to_owned)
        .unwrap_or_else(|| FALLBACK_OUTPUT_NAME.to_owned())
}

/// Concatenate ordered segment payloads into a single blob.
pub fn segments_to_plaintext(segments: &[impl AsRef<[u8]>]) -> Vec<u8> {
    segments.iter()
        .flat_map(|s| s.as_ref())
        .copied()
        .collect()
}
