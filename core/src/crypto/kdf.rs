//! crypto/kdf.rs
//! HKDF key schedule.
//!
//! Design:
//! - archive key --HKDF(salt = header.salt, info = "AEA_AMK" ‖ identity)--> CEK
//! - CEK --HKDF-Expand("AEA_SK" ‖ index)--> per-segment AEAD key
//! - CEK --HKDF-Expand("AEA_SN")--> 12-byte nonce base
//! - ECDH shared secret --HKDF-SHA256("AEA_KWK" ‖ eph ‖ recipient)--> wrap mask
//!
//! The PRF for the first three steps comes from the header; the wrap mask is
//! always SHA-256 so key blocks do not depend on the payload suite.

use hkdf::Hkdf;
use sha2::{Sha256, Sha512};
use zeroize::Zeroizing;

use crate::constants::labels;
use crate::crypto::types::{CryptoError, KEY_LEN_32, NONCE_LEN_12};
use crate::headers::{ArchiveHeader, HkdfPrf};

/// Single HKDF extract+expand under the selected PRF.
pub fn hkdf_expand(
    prf: HkdfPrf,
    salt: Option<&[u8]>,
    ikm: &[u8],
    info: &[&[u8]],
    out: &mut [u8],
) -> Result<(), CryptoError> {
    match prf {
        HkdfPrf::Sha256 => Hkdf::<Sha256>::new(salt, ikm)
            .expand_multi_info(info, out)
            .map_err(|_| CryptoError::Failure("HKDF expand failed (SHA-256)".into())),
        HkdfPrf::Sha512 => Hkdf::<Sha512>::new(salt, ikm)
            .expand_multi_info(info, out)
            .map_err(|_| CryptoError::Failure("HKDF expand failed (SHA-512)".into())),
    }
}

/// Build HKDF 'info' for the CEK from header identity fields.
/// Included: magic, version, profile, cipher, hkdf_prf, compression, segment_size.
/// Sizes and counts are excluded; they are authenticated per segment via AAD.
#[inline]
fn build_info_from_header(header: &ArchiveHeader) -> Vec<u8> {
    let mut info = Vec::with_capacity(labels::ARCHIVE_MAIN_KEY.len() + 18);
    info.extend_from_slice(labels::ARCHIVE_MAIN_KEY);
    info.extend_from_slice(&header.magic);
    info.extend_from_slice(&header.version.to_le_bytes());
    info.extend_from_slice(&header.profile.to_le_bytes());
    info.extend_from_slice(&header.cipher.to_le_bytes());
    info.extend_from_slice(&header.hkdf_prf.to_le_bytes());
    info.extend_from_slice(&header.compression.to_le_bytes());
    info.extend_from_slice(&header.segment_size.to_le_bytes());
    info
}

/// Derive the 32-byte content encryption key into `out`.
///
/// `archive_key` is empty for key-less archives.
pub fn derive_content_key(
    archive_key: &[u8],
    header: &ArchiveHeader,
    out: &mut [u8; KEY_LEN_32],
) -> Result<(), CryptoError> {
    if header.salt.iter().all(|&b| b == 0) {
        return Err(CryptoError::Failure("salt must not be all-zero".into()));
    }
    let prf = header.prf().map_err(|_| CryptoError::UnsupportedPrf { prf_id: header.hkdf_prf })?;
    let info = build_info_from_header(header);
    hkdf_expand(prf, Some(&header.salt), archive_key, &[&info], out)
}

/// Per-segment AEAD key.
pub fn derive_segment_key(
    prf: HkdfPrf,
    cek: &[u8; KEY_LEN_32],
    index: u32,
) -> Result<Zeroizing<[u8; KEY_LEN_32]>, CryptoError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN_32]);
    hkdf_expand(prf, None, cek, &[labels::SEGMENT_KEY, &index.to_le_bytes()], &mut key[..])?;
    Ok(key)
}

/// Nonce base shared by all segments of one archive.
pub fn derive_nonce_base(prf: HkdfPrf, cek: &[u8; KEY_LEN_32]) -> Result<[u8; NONCE_LEN_12], CryptoError> {
    let mut base = [0u8; NONCE_LEN_12];
    hkdf_expand(prf, None, cek, &[labels::SEGMENT_NONCE], &mut base)?;
    Ok(base)
}

/// Mask that unwraps an ECDHE-wrapped archive key.
pub fn derive_wrap_mask(
    shared_secret: &[u8],
    salt: &[u8],
    ephemeral_pub: &[u8],
    recipient_pub: &[u8],
) -> Result<Zeroizing<[u8; KEY_LEN_32]>, CryptoError> {
    let mut mask = Zeroizing::new([0u8; KEY_LEN_32]);
    hkdf_expand(
        HkdfPrf::Sha256,
        Some(salt),
        shared_secret,
        &[labels::KEY_WRAP_MASK, ephemeral_pub, recipient_pub],
        &mut mask[..],
    )?;
    Ok(mask)
}
