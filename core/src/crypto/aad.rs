// ## 📂 File: `src/crypto/aad.rs`

use sha2::{Digest, Sha256};

use crate::crypto::types::{SegmentAad, CONTEXT_DIGEST_LEN};
use crate::headers::HEADER_LEN;

/// SHA-256 over the metadata block followed by the wrapped-key block.
///
/// Computed once per archive and shared by every segment's AAD.
pub fn context_digest(metadata: &[u8], key_block: &[u8]) -> [u8; CONTEXT_DIGEST_LEN] {
    let mut h = Sha256::new();
    h.update(metadata);
    h.update(key_block);
    h.finalize().into()
}

/// AAD = header bytes ‖ context digest ‖ segment fields.
///
/// Everything before the payload is bound here, so a flipped header field,
/// metadata byte or descriptor surfaces as a tag mismatch.
#[inline]
pub fn build_aad(
    header_bytes: &[u8; HEADER_LEN],
    context: &[u8; CONTEXT_DIGEST_LEN],
    segment: &SegmentAad,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(SegmentAad::LEN_V1);

    out.extend_from_slice(header_bytes);
    out.extend_from_slice(context);

    out.extend_from_slice(&segment.index.to_le_bytes());
    out.extend_from_slice(&segment.flags.to_le_bytes());
    out.extend_from_slice(&segment.plaintext_len.to_le_bytes());
    out.extend_from_slice(&segment.stored_len.to_le_bytes());

    debug_assert_eq!(out.len(), SegmentAad::LEN_V1);
    out
}
