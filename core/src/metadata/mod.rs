//! metadata/mod.rs
//! Auth-data (metadata) block: ordered key/value entries.
//!
//! Wire form per entry: `entry_len u32 (includes itself) ‖ key ‖ 0x00 ‖ value`.
//! Values are raw bytes; interpreting them (base64, JSON plist, text) is the
//! caller's business.

pub mod types;
pub mod codec;

pub use types::*;
pub use codec::*;
