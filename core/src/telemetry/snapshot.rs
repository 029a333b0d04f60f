//! telemetry/snapshot.rs
//! Immutable summary of one decryption run.

use std::time::Duration;

use serde::Serialize;

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub segments: u64,
    pub segments_compressed: u64,
    pub bytes_ciphertext: u64,
    pub bytes_stored: u64,
    pub bytes_plaintext: u64,
    /// stored / plaintext; 1.0 for an uncompressed archive
    pub compression_ratio: f64,
    pub throughput_plaintext_bytes_per_sec: f64,
    pub workers: usize,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer, workers: usize) -> Self {
        let elapsed = timer.elapsed();

        let compression_ratio = if counters.bytes_plaintext > 0 {
            counters.bytes_stored as f64 / counters.bytes_plaintext as f64
        } else {
            1.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_plaintext as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            segments: counters.segments,
            segments_compressed: counters.segments_compressed,
            bytes_ciphertext: counters.bytes_ciphertext,
            bytes_stored: counters.bytes_stored,
            bytes_plaintext: counters.bytes_plaintext,
            compression_ratio,
            throughput_plaintext_bytes_per_sec: throughput,
            workers,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Counter-level invariants that hold for every successful run.
    pub fn sanity_check(&self) -> bool {
        self.segments_compressed <= self.segments
            && self.bytes_ciphertext >= self.bytes_stored
    }
}
