//! container/mod.rs
//! Container Parser: header, opaque blocks, segment table, payload bounds.
//!
//! Nothing here decrypts. A `Container` only exists once the magic, version,
//! header CRC and every segment-table invariant have been checked.

pub mod types;
pub mod parse;
pub mod encode;

pub use types::*;
pub use parse::*;
pub use encode::*;
