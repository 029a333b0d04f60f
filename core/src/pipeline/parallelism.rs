use tracing::debug;

use crate::constants::{MAX_INFLIGHT_SEGMENTS, MAX_WORKERS};

/// Parallelism configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelismProfile {
    pub worker_count: usize,
    /// Dispatched-but-unwritten segments allowed at once
    pub inflight_segments: usize,
}

impl ParallelismProfile {
    pub fn single_threaded() -> Self {
        Self { worker_count: 1, inflight_segments: 1 }
    }

    /// Size from the host: one worker per core, window bounded by a
    /// fraction of available memory.
    ///
    /// Each in-flight segment can hold ciphertext and plaintext at once,
    /// so the budget is charged twice the segment size.
    pub fn dynamic(max_segment_size: u64, mem_fraction: f64, hard_cap: usize) -> Self {
        let worker_count = num_cpus::get().clamp(1, MAX_WORKERS);

        let mut sys = sysinfo::System::new();
        sys.refresh_memory();
        let avail_bytes = sys.available_memory(); // bytes

        let budget = (avail_bytes as f64 * mem_fraction) as u64;
        let per_segment = max_segment_size.max(1).saturating_mul(2);
        let by_memory = (budget / per_segment).max(1);

        let cap = hard_cap.clamp(1, MAX_INFLIGHT_SEGMENTS) as u64;
        let inflight_segments = by_memory.max(worker_count as u64).min(cap) as usize;

        debug!(worker_count, inflight_segments, avail_bytes, "parallelism profile");
        Self { worker_count, inflight_segments }
    }

    /// Apply explicit overrides on top of a dynamic profile.
    pub fn with_overrides(mut self, workers: Option<usize>, inflight: Option<usize>) -> Self {
        if let Some(w) = workers {
            self.worker_count = w;
        }
        if let Some(n) = inflight {
            self.inflight_segments = n;
        }
        self
    }

    /// Never more workers or window than there are segments.
    pub fn fit_to(mut self, segment_count: usize) -> Self {
        let n = segment_count.max(1);
        self.worker_count = self.worker_count.clamp(1, n);
        self.inflight_segments = self.inflight_segments.clamp(1, n);
        self
    }
}
