//! compression/mod.rs
//! Per-segment decompression (and the compressors fixture tooling needs).
//!
//! - Each segment is an independent codec stream; no state spans segments,
//!   so workers decompress in any order.
//! - Registry resolves codec ids to implementations.

pub mod constants;
pub mod types;
pub mod registry;
pub mod codecs;

pub use constants::*;
pub use types::*;
pub use registry::*;
