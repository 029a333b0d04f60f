//! keys/mod.rs
//! Key Resolver: caller key material + wrapped-key block → content key.
//!
//! - `KeyMaterial` is what the caller brings (raw symmetric key or PEM).
//! - `WrappedKeyBlock` is what the archive carries.
//! - `resolve_content_key` combines both with the header salt and returns a
//!   `ContentEncryptionKey` that zeroizes on drop.

pub mod types;
pub mod material;
pub mod block;
pub mod resolver;

pub use types::*;
pub use material::*;
pub use block::*;
pub use resolver::*;
