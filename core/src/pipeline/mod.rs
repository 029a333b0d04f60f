//! pipeline/mod.rs
//! Segment Decryption Engine and Output Reconstructor.
//!
//! - `segment`: per-segment authenticate → decompress, plus the sequential
//!   `SegmentStream`.
//! - `run`: reader thread, N workers, ordered writer on the calling thread.
//! - `reconstruct`: staging file that only becomes the output on success.

pub mod types;
pub mod abort;
pub mod segment;
pub mod io;
pub mod parallelism;
pub mod reconstruct;
pub mod run;

pub use types::*;
pub use abort::*;
pub use segment::*;
pub use io::*;
pub use parallelism::*;
pub use reconstruct::*;
pub use run::*;
