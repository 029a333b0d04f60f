use crate::crypto::{context_digest, SegmentAad, CONTEXT_DIGEST_LEN, TAG_LEN};
use crate::headers::{ArchiveHeader, Profile, HEADER_LEN};

bitflags::bitflags! {
    /// Per-segment flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SegmentFlags: u16 {
        /// Last segment of the archive
        const FINAL = 0b0000_0001;

        /// Stored bytes are compressed with the header codec
        const COMPRESSED = 0b0000_0010;
    }
}

/// Segment table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentDescriptor {
    /// 0-based, contiguous
    pub index: u32,
    pub flags: SegmentFlags,
    /// Must be zero
    pub reserved: u16,
    /// Bytes this segment contributes to the output
    pub plaintext_len: u32,
    /// Ciphertext bytes in the payload (excluding the tag)
    pub stored_len: u32,
    pub tag: [u8; TAG_LEN],
    /// Offset of this segment's ciphertext relative to the payload start.
    /// Derived from the preceding `stored_len`s, not stored on disk.
    pub ciphertext_offset: u64,
}

impl SegmentDescriptor {
    pub const LEN: usize = 4 // index
        + 2                  // flags
        + 2                  // reserved
        + 4                  // plaintext_len
        + 4                  // stored_len
        + TAG_LEN;           // tag

    pub fn is_final(&self) -> bool {
        self.flags.contains(SegmentFlags::FINAL)
    }

    pub fn is_compressed(&self) -> bool {
        self.flags.contains(SegmentFlags::COMPRESSED)
    }

    /// Fields authenticated alongside the archive context.
    pub fn aad_fields(&self) -> SegmentAad {
        SegmentAad {
            index: self.index,
            flags: self.flags.bits(),
            plaintext_len: self.plaintext_len,
            stored_len: self.stored_len,
        }
    }
}

/// A parsed, structurally valid archive.
#[derive(Debug, Clone)]
pub struct Container {
    pub(crate) header: ArchiveHeader,
    pub(crate) header_bytes: [u8; HEADER_LEN],
    pub(crate) profile: Profile,
    pub(crate) metadata_block: Vec<u8>,
    pub(crate) key_block: Vec<u8>,
    pub(crate) segments: Vec<SegmentDescriptor>,
    pub(crate) payload_offset: u64,
}

impl Container {
    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// Header bytes exactly as read; bound into every segment's AAD.
    pub fn header_bytes(&self) -> &[u8; HEADER_LEN] {
        &self.header_bytes
    }

    pub fn format_version(&self) -> u16 {
        self.header.version
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn metadata_block(&self) -> &[u8] {
        &self.metadata_block
    }

    pub fn wrapped_key_block(&self) -> &[u8] {
        &self.key_block
    }

    pub fn segments(&self) -> &[SegmentDescriptor] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Absolute file offset of the first ciphertext byte.
    pub fn payload_offset(&self) -> u64 {
        self.payload_offset
    }

    pub fn plaintext_size(&self) -> u64 {
        self.header.plaintext_size
    }

    /// SHA-256 over metadata and key blocks, shared by all segment AADs.
    pub fn context_digest(&self) -> [u8; CONTEXT_DIGEST_LEN] {
        context_digest(&self.metadata_block, &self.key_block)
    }
}
