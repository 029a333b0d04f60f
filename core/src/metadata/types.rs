use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

/// One metadata entry, exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: Vec<u8>,
}

impl MetadataEntry {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    /// Value as UTF-8 text, if it is valid UTF-8.
    pub fn as_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }

    /// Decoded bytes when the whole value is standard padded base64.
    ///
    /// Apple stores several binary blobs (e.g. key digests) base64-encoded
    /// next to JSON documents in the same block.
    pub fn base64_decoded(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.value).ok()
    }
}

/// Decoded metadata block. Entry order is preserved from the archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<MetadataEntry>,
}

impl Metadata {
    pub(crate) fn from_entries(entries: Vec<MetadataEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.value.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetadataEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Metadata {
    type Item = MetadataEntry;
    type IntoIter = std::vec::IntoIter<MetadataEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = &'a MetadataEntry;
    type IntoIter = std::slice::Iter<'a, MetadataEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Metadata block errors. `offset` is relative to the start of the block.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("metadata truncated at offset {offset}: need {need} bytes, have {have}")]
    Truncated { offset: usize, need: usize, have: usize },

    #[error("metadata entry at offset {offset} has invalid length {len}")]
    InvalidEntryLength { offset: usize, len: u32 },

    #[error("metadata entry at offset {offset} has no key terminator")]
    MissingTerminator { offset: usize },

    #[error("metadata entry at offset {offset} has an empty key")]
    EmptyKey { offset: usize },

    #[error("metadata entry at offset {offset} has a non-UTF-8 key")]
    InvalidKey { offset: usize },

    #[error("duplicate metadata key {key:?} at offset {offset}")]
    DuplicateKey { offset: usize, key: String },

    #[error("metadata block too large: {have} > {max}")]
    TooLarge { have: usize, max: usize },
}

impl MetadataError {
    /// Block-relative offset of the offending entry.
    pub fn offset(&self) -> Option<usize> {
        match self {
            MetadataError::Truncated { offset, .. }
            | MetadataError::InvalidEntryLength { offset, .. }
            | MetadataError::MissingTerminator { offset }
            | MetadataError::EmptyKey { offset }
            | MetadataError::InvalidKey { offset }
            | MetadataError::DuplicateKey { offset, .. } => Some(*offset),
            MetadataError::TooLarge { .. } => None,
        }
    }
}
