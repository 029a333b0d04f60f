//! crypto/nonce.rs
//! Deterministic per-segment nonces.
//!
//! TLS-like scheme: a 12-byte base IV derived once per archive, with the low
//! 8 bytes XORed by the little-endian segment index. Workers compute nonces
//! independently from (base, index).

use crate::crypto::types::NONCE_LEN_12;

/// Derive the nonce for `index` from the archive nonce base.
///
/// - `nonce[0..4]` stays fixed; `nonce[4..12]` carries the counter.
/// - Same `(base, index)` always gives the same nonce; distinct indices
///   give distinct nonces.
#[inline]
pub fn derive_nonce_12_tls_style(base: &[u8; NONCE_LEN_12], index: u32) -> [u8; NONCE_LEN_12] {
    let mut nonce = *base;
    let ctr = (index as u64).to_le_bytes();
    for (n, c) in nonce[4..].iter_mut().zip(ctr.iter()) {
        *n ^= c;
    }
    nonce
}
