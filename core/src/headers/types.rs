//! headers/types.rs
//! Archive header struct and typed registry views.
//!
//! Notes:
//! - Fixed-size fields give a deterministic 84-byte wire format.
//! - All multi-byte integers are little-endian.
//! - The encoded header bytes are bound into every segment's AAD, so any
//!   tampering that survives the CRC still fails authentication.

use num_enum::TryFromPrimitive;
use thiserror::Error;

use crate::compression::CompressionCodec;
use crate::constants::{
    cipher_ids, prf_ids, profile_ids, FORMAT_V1, MAGIC_AEA1, MAX_FORMAT_VERSION,
    MAX_KEY_BLOCK_LEN, MAX_METADATA_LEN, MAX_SEGMENT_COUNT, MAX_SEGMENT_SIZE,
    MIN_FORMAT_VERSION, SALT_LEN,
};
use crate::utils::{enum_name_or_hex, fmt_bytes};

/// Fixed header size in bytes.
pub const HEADER_LEN: usize = 84;

/// Byte range covered by the header CRC.
pub const HEADER_CRC_SPAN: usize = 80;

/// Archive encryption profile.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum Profile {
    /// Integrity-only: segments are sealed under a key derived from the salt alone.
    KeyLess         = profile_ids::KEY_LESS,
    Symmetric       = profile_ids::SYMMETRIC,
    SymmetricSigned = profile_ids::SYMMETRIC_SIGNED,
    /// Ephemeral-static ECDH on P-256.
    Asymmetric      = profile_ids::ECDHE_P256,
    AsymmetricSigned = profile_ids::ECDHE_P256_SIGNED,
    Scrypt          = profile_ids::SCRYPT,
}

impl Profile {
    /// Parse and reject profiles this decoder does not implement.
    pub fn verify(raw: u16) -> Result<Self, HeaderError> {
        match Profile::try_from_primitive(raw) {
            Ok(p @ (Profile::KeyLess | Profile::Symmetric | Profile::Asymmetric)) => Ok(p),
            Ok(_) => Err(HeaderError::UnsupportedProfile { raw }),
            Err(_) => Err(HeaderError::UnknownProfile { raw }),
        }
    }

    /// Whether decryption needs caller-supplied key material.
    pub fn requires_key(self) -> bool {
        !matches!(self, Profile::KeyLess)
    }
}

/// Cipher suites (header registry).
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum CipherSuite {
    Aes256Gcm        = cipher_ids::AES256_GCM,
    Chacha20Poly1305 = cipher_ids::CHACHA20_POLY1305,
}

impl CipherSuite {
    pub fn verify(raw: u16) -> Result<Self, HeaderError> {
        CipherSuite::try_from_primitive(raw).map_err(|_| HeaderError::UnknownCipherSuite { raw })
    }
}

/// HKDF PRF choices (header registry).
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum HkdfPrf {
    Sha256 = prf_ids::SHA256,
    Sha512 = prf_ids::SHA512,
}

impl HkdfPrf {
    pub fn verify(raw: u16) -> Result<Self, HeaderError> {
        HkdfPrf::try_from_primitive(raw).map_err(|_| HeaderError::UnknownHkdfPrf { raw })
    }
}

/// Decoded archive header.
#[repr(C)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub magic: [u8; 4],        // "AEA1"
    pub version: u16,          // container format version
    pub profile: u16,          // Profile registry id
    pub cipher: u16,           // CipherSuite registry id
    pub hkdf_prf: u16,         // HkdfPrf registry id
    pub compression: u16,      // CompressionCodec registry id
    pub flags: u16,            // reserved; must be zero in v1
    pub metadata_len: u32,     // auth data block length
    pub key_block_len: u32,    // wrapped-key block length
    pub segment_count: u32,    // entries in the segment table
    pub segment_size: u32,     // max plaintext bytes per segment
    pub plaintext_size: u64,   // total reconstructed size
    pub payload_size: u64,     // total ciphertext bytes after the table
    pub salt: [u8; SALT_LEN],  // per-archive random salt
    pub crc32: u32,            // CRC-32 of bytes 0..80
}

impl Default for ArchiveHeader {
    /// Symmetric AES-256-GCM / HKDF-SHA256 archive with no payload yet.
    fn default() -> Self {
        Self {
            magic: MAGIC_AEA1,
            version: FORMAT_V1,
            profile: Profile::Symmetric as u16,
            cipher: CipherSuite::Aes256Gcm as u16,
            hkdf_prf: HkdfPrf::Sha256 as u16,
            compression: CompressionCodec::None as u16,
            flags: 0,
            metadata_len: 0,
            key_block_len: 0,
            segment_count: 0,
            segment_size: crate::constants::DEFAULT_SEGMENT_SIZE as u32,
            plaintext_size: 0,
            payload_size: 0,
            salt: [0x5A; SALT_LEN],
            crc32: 0,
        }
    }
}

impl ArchiveHeader {
    pub const LEN: usize = HEADER_LEN;

    /// Typed profile; only valid after `validate()`.
    pub fn profile(&self) -> Result<Profile, HeaderError> {
        Profile::verify(self.profile)
    }

    pub fn cipher_suite(&self) -> Result<CipherSuite, HeaderError> {
        CipherSuite::verify(self.cipher)
    }

    pub fn prf(&self) -> Result<HkdfPrf, HeaderError> {
        HkdfPrf::verify(self.hkdf_prf)
    }

    pub fn codec(&self) -> Result<CompressionCodec, HeaderError> {
        CompressionCodec::try_from_primitive(self.compression)
            .map_err(|_| HeaderError::UnknownCompression { raw: self.compression })
    }

    /// Byte offset of the segment table from the start of the archive.
    pub fn table_offset(&self) -> u64 {
        HEADER_LEN as u64 + self.metadata_len as u64 + self.key_block_len as u64
    }

    /// Check magic and version only. Must pass before any other field is trusted.
    pub fn validate_identity(&self) -> Result<(), HeaderError> {
        if self.magic != MAGIC_AEA1 {
            return Err(HeaderError::InvalidMagic { have: self.magic, need: MAGIC_AEA1 });
        }
        if !(MIN_FORMAT_VERSION..=MAX_FORMAT_VERSION).contains(&self.version) {
            return Err(HeaderError::UnsupportedVersion {
                have: self.version,
                min: MIN_FORMAT_VERSION,
                max: MAX_FORMAT_VERSION,
            });
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), HeaderError> {
        self.validate_identity()?;

        // Registries
        self.profile()?;
        self.cipher_suite()?;
        self.prf()?;
        self.codec()?;

        if self.flags != 0 {
            return Err(HeaderError::ReservedFlagsSet { raw: self.flags });
        }

        // Limits
        if self.segment_size == 0 {
            return Err(HeaderError::InvalidSegmentSizeZero);
        }
        if self.segment_size as usize > MAX_SEGMENT_SIZE {
            return Err(HeaderError::InvalidSegmentSizeTooLarge {
                have: self.segment_size,
                max: MAX_SEGMENT_SIZE as u32,
            });
        }
        if self.metadata_len as usize > MAX_METADATA_LEN {
            return Err(HeaderError::BlockTooLarge {
                block: "metadata",
                have: self.metadata_len as usize,
                max: MAX_METADATA_LEN,
            });
        }
        if self.key_block_len as usize > MAX_KEY_BLOCK_LEN {
            return Err(HeaderError::BlockTooLarge {
                block: "key",
                have: self.key_block_len as usize,
                max: MAX_KEY_BLOCK_LEN,
            });
        }
        if self.segment_count > MAX_SEGMENT_COUNT {
            return Err(HeaderError::TooManySegments { have: self.segment_count, max: MAX_SEGMENT_COUNT });
        }

        // Declared sizes must be reachable with the declared table
        let capacity = self.segment_count as u64 * self.segment_size as u64;
        if self.plaintext_size > capacity {
            return Err(HeaderError::Validation(format!(
                "plaintext_size {} exceeds {} segments of {} bytes",
                self.plaintext_size, self.segment_count, self.segment_size
            )));
        }
        if self.segment_count == 0 && self.payload_size != 0 {
            return Err(HeaderError::Validation("payload present but segment table is empty".into()));
        }

        // Salt must not be all zero
        if self.salt.iter().all(|&b| b == 0) {
            return Err(HeaderError::InvalidSalt);
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("header buffer too short: {have} < {need}")]
    BufferTooShort { have: usize, need: usize },

    #[error("invalid magic: expected {}, got {}", fmt_bytes(need), fmt_bytes(have))]
    InvalidMagic { have: [u8; 4], need: [u8; 4] },

    #[error("unsupported format version {have} (supported {min}..={max})")]
    UnsupportedVersion { have: u16, min: u16, max: u16 },

    #[error("header checksum mismatch: stored 0x{stored:08x}, computed 0x{computed:08x}")]
    InvalidCrc32 { stored: u32, computed: u32 },

    #[error("unknown profile: {}", enum_name_or_hex::<Profile>(*raw))]
    UnknownProfile { raw: u16 },

    #[error("unsupported profile: {}", enum_name_or_hex::<Profile>(*raw))]
    UnsupportedProfile { raw: u16 },

    #[error("unknown cipher suite: {}", enum_name_or_hex::<CipherSuite>(*raw))]
    UnknownCipherSuite { raw: u16 },

    #[error("unknown HKDF PRF: {}", enum_name_or_hex::<HkdfPrf>(*raw))]
    UnknownHkdfPrf { raw: u16 },

    #[error("unknown compression: {}", enum_name_or_hex::<CompressionCodec>(*raw))]
    UnknownCompression { raw: u16 },

    #[error("reserved header flags must be zero, got 0x{raw:04x}")]
    ReservedFlagsSet { raw: u16 },

    #[error("invalid segment_size: zero")]
    InvalidSegmentSizeZero,

    #[error("invalid segment_size: {have} > {max}")]
    InvalidSegmentSizeTooLarge { have: u32, max: u32 },

    #[error("{block} block too large: {have} > {max}")]
    BlockTooLarge { block: &'static str, have: usize, max: usize },

    #[error("too many segments: {have} > {max}")]
    TooManySegments { have: u32, max: u32 },

    #[error("invalid salt: all zeros")]
    InvalidSalt,

    #[error("segment table: {0}")]
    SegmentTable(String),

    #[error("header validation error: {0}")]
    Validation(String),
}
