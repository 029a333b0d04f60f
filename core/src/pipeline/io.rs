//! pipeline/io.rs
//! Payload reads and the ordered plaintext writer.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Read, Write};
use std::time::Instant;

use tracing::debug;

use crate::container::SegmentDescriptor;
use crate::pipeline::types::DecryptedSegment;
use crate::telemetry::{Stage, StageTimes, TelemetryCounters};
use crate::types::{AeaError, Truncation};

/// Read exactly one segment's stored ciphertext from the current position.
pub fn read_segment_ciphertext<R: Read>(r: &mut R, desc: &SegmentDescriptor) -> Result<Vec<u8>, AeaError> {
    let mut buf = vec![0u8; desc.stored_len as usize];
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(Truncation::Payload {
                    expected_bytes: desc.ciphertext_offset + desc.stored_len as u64,
                    available_bytes: desc.ciphertext_offset + filled as u64,
                }
                .into());
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(buf)
}

/// Reorders segment results and writes plaintext strictly by index.
///
/// Errors are ordered too: the error reported is the one for the lowest
/// failing index, whatever order workers finished in.
pub struct OrderedPlaintextWriter<'a, W: Write> {
    out: &'a mut W,
    next: u32,
    total: u32,
    pending: BTreeMap<u32, Result<DecryptedSegment, AeaError>>,
    first_failure: Option<u32>,
    counters: TelemetryCounters,
    stage_times: StageTimes,
}

impl<'a, W: Write> OrderedPlaintextWriter<'a, W> {
    pub fn new(out: &'a mut W, total: u32) -> Self {
        Self {
            out,
            next: 0,
            total,
            pending: BTreeMap::new(),
            first_failure: None,
            counters: TelemetryCounters::default(),
            stage_times: StageTimes::default(),
        }
    }

    /// Queue one result and flush everything now in order.
    /// Returns how many segments were written by this call.
    pub fn push(&mut self, index: u32, result: Result<DecryptedSegment, AeaError>) -> Result<usize, AeaError> {
        if index < self.next || index >= self.total || self.pending.contains_key(&index) {
            return Err(AeaError::Pipeline("segment result out of range or duplicated"));
        }
        if result.is_err() {
            self.first_failure = Some(self.first_failure.map_or(index, |f| f.min(index)));
        }
        self.pending.insert(index, result);
        self.flush_ready()
    }

    /// Lowest failed index received so far that is still waiting for
    /// earlier segments. Segments after it will never be written.
    pub fn pending_failure(&self) -> Option<u32> {
        self.first_failure
    }

    /// Segments waiting for an earlier index.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    pub fn written(&self) -> u32 {
        self.next
    }

    /// All segments must have been written.
    pub fn finish(self) -> Result<(TelemetryCounters, StageTimes), AeaError> {
        if self.next != self.total {
            return Err(AeaError::Pipeline("segment stream ended before the final segment"));
        }
        debug!(segments = self.total, "ordered writer finished");
        Ok((self.counters, self.stage_times))
    }

    fn flush_ready(&mut self) -> Result<usize, AeaError> {
        let mut flushed = 0;
        while let Some(result) = self.pending.remove(&self.next) {
            self.write(result?)?;
            self.next += 1;
            flushed += 1;
        }
        Ok(flushed)
    }

    fn write(&mut self, segment: DecryptedSegment) -> Result<(), AeaError> {
        let t = Instant::now();
        self.out.write_all(&segment.bytes)?;
        self.stage_times.add(Stage::Write, t.elapsed());

        self.counters.merge(&segment.counters);
        self.stage_times.merge(&segment.stage_times);
        Ok(())
    }
}
