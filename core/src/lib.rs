//! aea-core
//!
//! Pure Rust Apple Encrypted Archive (AEA) decoder.
//! Container parsing, key unwrapping, parallel segment decryption.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Format layers
pub mod headers;
pub mod container;
pub mod metadata;
pub mod keys;

// Primitives
pub mod crypto;
pub mod compression;
pub mod telemetry;

// Decryption
pub mod pipeline;
pub mod api;

pub use api::{decrypt, decrypt_with_config, info, inspect, parse, DecryptConfig, DecryptOutcome};
pub use types::AeaError;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::api::{decrypt, decrypt_with_config, info, inspect, parse, DecryptConfig, DecryptOutcome};
    pub use crate::container::{Container, SegmentDescriptor, SegmentFlags};
    pub use crate::headers::{ArchiveHeader, Profile};
    pub use crate::keys::{KeyMaterial, SymmetricKey};
    pub use crate::metadata::{Metadata, MetadataEntry};
    pub use crate::pipeline::AbortHandle;
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{AeaError, Truncation};
}
