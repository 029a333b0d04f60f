use std::time::Duration;

use crate::container::SegmentDescriptor;
use crate::telemetry::{StageTimes, TelemetryCounters};
use crate::types::AeaError;

/// Reader → worker: one segment's descriptor and stored ciphertext.
#[derive(Debug)]
pub struct SegmentJob {
    pub descriptor: SegmentDescriptor,
    pub ciphertext: Vec<u8>,
    pub read_time: Duration,
}

/// Authenticated, decompressed segment ready for the writer.
#[derive(Debug, Clone)]
pub struct DecryptedSegment {
    pub index: u32,
    pub bytes: Vec<u8>,
    pub counters: TelemetryCounters,
    pub stage_times: StageTimes,
}

/// Worker → writer. The index travels with errors too, so the writer can
/// report failures in segment order.
pub type SegmentResult = (u32, Result<DecryptedSegment, AeaError>);
