//! headers/mod.rs
//! Fixed-size archive header: registries, decode, encode.
//!
//! - Fixed header (84 bytes) read before anything else in the file.
//! - Explicit registry ids (profile, cipher, PRF, compression) reject
//!   unknown combinations up front instead of failing deep in the pipeline.
//! - Block lengths and segment counts are bounded here so later stages can
//!   allocate from them.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
