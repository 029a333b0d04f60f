//! telemetry/mod.rs
//! Counters, stage timers, and immutable snapshots for decryption runs.
//!
//! - Workers fill per-segment counters; the writer merges them, so no locks
//!   or atomics sit on the hot path.
//! - The snapshot is `Serialize` for callers that log or export it.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
