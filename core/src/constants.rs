/// Magic number for the archive header.
/// "AEA1" = Apple Encrypted Archive, container generation 1.
pub const MAGIC_AEA1: [u8; 4] = *b"AEA1";

/// Supported header format versions (inclusive range).
pub const MIN_FORMAT_VERSION: u16 = 1;
pub const MAX_FORMAT_VERSION: u16 = 1;
pub const FORMAT_V1: u16 = 1;

/// Max plaintext bytes per segment (32 MiB).
pub const MAX_SEGMENT_SIZE: usize = 32 * 1024 * 1024;
/// Default segment size used by fixtures and tooling (1 MiB).
pub const DEFAULT_SEGMENT_SIZE: usize = 1024 * 1024;
/// Upper bound on declared segment count, keeps table allocation sane.
pub const MAX_SEGMENT_COUNT: u32 = 1 << 24;

/// Max metadata (auth data) block size (16 MiB).
pub const MAX_METADATA_LEN: usize = 16 * 1024 * 1024;
/// Max wrapped-key block size (4 KiB).
pub const MAX_KEY_BLOCK_LEN: usize = 4 * 1024;

/// Archive salt length in bytes.
pub const SALT_LEN: usize = 32;

/// Pipeline sizing defaults and bounds.
pub const MAX_WORKERS: usize = 256;
pub const MAX_INFLIGHT_SEGMENTS: usize = 1024;
pub const DEFAULT_INFLIGHT_CAP: usize = 64;
pub const DEFAULT_MEM_FRACTION: f64 = 0.25;

/// Output file name used when the archive path has no usable stem.
pub const FALLBACK_OUTPUT_NAME: &str = "payload";

/// Archive profile identifiers (mirrored in headers).
pub mod profile_ids {
    pub const KEY_LESS: u16               = 0x0000;
    pub const SYMMETRIC: u16              = 0x0001;
    pub const SYMMETRIC_SIGNED: u16       = 0x0002;
    pub const ECDHE_P256: u16             = 0x0003;
    pub const ECDHE_P256_SIGNED: u16      = 0x0004;
    pub const SCRYPT: u16                 = 0x0005;
}

/// Cipher suite identifiers (mirrored in headers).
pub mod cipher_ids {
    pub const AES256_GCM: u16        = 0x0001;
    pub const CHACHA20_POLY1305: u16 = 0x0002;
}

/// HKDF PRF identifiers (mirrored in headers).
pub mod prf_ids {
    pub const SHA256: u16 = 0x0001;
    pub const SHA512: u16 = 0x0002;
}

/// Wrapped-key block scheme identifiers; must agree with the header profile.
pub mod key_schemes {
    pub const NONE: u16       = 0x0000;
    pub const SYMMETRIC: u16  = 0x0001;
    pub const ECDHE_P256: u16 = 0x0003;
}

/// HKDF `info` labels. Changing any of these breaks every existing archive.
pub mod labels {
    pub const ARCHIVE_MAIN_KEY: &[u8] = b"AEA_AMK";
    pub const KEY_WRAP_MASK: &[u8]    = b"AEA_KWK";
    pub const SEGMENT_KEY: &[u8]      = b"AEA_SK";
    pub const SEGMENT_NONCE: &[u8]    = b"AEA_SN";
}
