//! compression/codecs/mod.rs

pub mod deflate;
pub mod lz4;
pub mod none;
pub mod zstd;

pub use deflate::*;
pub use lz4::*;
pub use none::*;
pub use zstd::*;
