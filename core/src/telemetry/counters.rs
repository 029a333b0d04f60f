//! telemetry/counters.rs
//! Mutable counters collected while segments are decrypted.
use std::ops::AddAssign;

use serde::Serialize;

/// Deterministic counters; identical for 1 and N workers.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TelemetryCounters {
    pub segments: u64,
    pub segments_compressed: u64,
    /// Ciphertext plus tag bytes authenticated
    pub bytes_ciphertext: u64,
    /// Stored (possibly compressed) bytes after authentication
    pub bytes_stored: u64,
    pub bytes_plaintext: u64,
}

impl TelemetryCounters {
    /// Record one authenticated (and, if flagged, decompressed) segment.
    ///
    /// - `stored_len`: bytes as stored in the payload, excluding the tag
    /// - `tag_len`: AEAD tag bytes
    /// - `pt_len`: bytes emitted to the output
    pub fn add_segment(&mut self, stored_len: usize, tag_len: usize, pt_len: usize, compressed: bool) {
        self.segments += 1;
        if compressed {
            self.segments_compressed += 1;
        }
        self.bytes_ciphertext += (stored_len + tag_len) as u64;
        self.bytes_stored += stored_len as u64;
        self.bytes_plaintext += pt_len as u64;
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.segments += other.segments;
        self.segments_compressed += other.segments_compressed;
        self.bytes_ciphertext += other.bytes_ciphertext;
        self.bytes_stored += other.bytes_stored;
        self.bytes_plaintext += other.bytes_plaintext;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
