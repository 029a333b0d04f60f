// Shared fixture builder: assembles archives from the crate's own encoders.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{EncodePrivateKey, LineEnding};
use p256::{PublicKey, SecretKey};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use aea_core::compression::{create_compressor, CompressionCodec};
use aea_core::constants::key_schemes;
use aea_core::container::{encode_segment_table, SegmentDescriptor, SegmentFlags};
use aea_core::crypto::{
    build_aad, context_digest, derive_content_key, derive_nonce_12_tls_style, derive_nonce_base, derive_segment_key,
    AeadImpl, KEY_LEN_32, TAG_LEN,
};
use aea_core::headers::{encode_header_le, ArchiveHeader, CipherSuite, HkdfPrf, Profile, HEADER_LEN};
use aea_core::keys::{encode_key_block, wrap_archive_key, KeyMaterial};
use aea_core::metadata::{encode_metadata, MetadataEntry};

pub const TEST_KEY: [u8; KEY_LEN_32] = [0x42; KEY_LEN_32];

/// How the archive key is delivered.
#[derive(Clone)]
pub enum Recipient {
    KeyLess,
    Symmetric([u8; KEY_LEN_32]),
    /// Archive key wrapped to `recipient` with a seeded ephemeral key.
    Asymmetric { archive_key: [u8; KEY_LEN_32], recipient: PublicKey },
}

#[derive(Clone)]
pub struct ArchiveBuilder {
    pub recipient: Recipient,
    pub cipher: CipherSuite,
    pub prf: HkdfPrf,
    pub codec: CompressionCodec,
    pub segment_size: u32,
    pub salt: [u8; 32],
    pub metadata: Vec<MetadataEntry>,
}

/// Built archive plus the offsets tests need for tampering.
pub struct Fixture {
    pub bytes: Vec<u8>,
    pub table_offset: usize,
    pub payload_offset: usize,
    pub segments: Vec<SegmentDescriptor>,
}

impl Fixture {
    /// Byte offset of segment `i`'s tag inside the table.
    pub fn tag_offset(&self, i: usize) -> usize {
        self.table_offset + i * SegmentDescriptor::LEN + 16
    }

    pub fn segment_offset(&self, i: usize) -> usize {
        self.payload_offset + self.segments[i].ciphertext_offset as usize
    }

    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, &self.bytes).unwrap();
        path
    }
}

impl ArchiveBuilder {
    fn with_recipient(recipient: Recipient) -> Self {
        Self {
            recipient,
            cipher: CipherSuite::Aes256Gcm,
            prf: HkdfPrf::Sha256,
            codec: CompressionCodec::None,
            segment_size: 4096,
            salt: [0x5A; 32],
            metadata: Vec::new(),
        }
    }

    pub fn symmetric(key: [u8; KEY_LEN_32]) -> Self {
        Self::with_recipient(Recipient::Symmetric(key))
    }

    pub fn keyless() -> Self {
        Self::with_recipient(Recipient::KeyLess)
    }

    pub fn asymmetric(recipient: PublicKey, archive_key: [u8; KEY_LEN_32]) -> Self {
        Self::with_recipient(Recipient::Asymmetric { archive_key, recipient })
    }

    pub fn segment_size(mut self, n: u32) -> Self {
        self.segment_size = n;
        self
    }

    pub fn codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn cipher(mut self, cipher: CipherSuite) -> Self {
        self.cipher = cipher;
        self
    }

    pub fn prf(mut self, prf: HkdfPrf) -> Self {
        self.prf = prf;
        self
    }

    pub fn meta(mut self, key: &str, value: impl Into<Vec<u8>>) -> Self {
        self.metadata.push(MetadataEntry::new(key, value));
        self
    }

    fn profile(&self) -> Profile {
        match self.recipient {
            Recipient::KeyLess => Profile::KeyLess,
            Recipient::Symmetric(_) => Profile::Symmetric,
            Recipient::Asymmetric { .. } => Profile::Asymmetric,
        }
    }

    fn key_block(&self) -> Vec<u8> {
        match &self.recipient {
            Recipient::KeyLess => encode_key_block(key_schemes::NONE, &[]).unwrap(),
            Recipient::Symmetric(_) => encode_key_block(key_schemes::SYMMETRIC, &[]).unwrap(),
            Recipient::Asymmetric { archive_key, recipient } => {
                let mut rng = StdRng::seed_from_u64(0xAEA);
                let ephemeral = SecretKey::random(&mut rng);
                let material = wrap_archive_key(archive_key, &ephemeral, recipient, &self.salt).unwrap();
                encode_key_block(key_schemes::ECDHE_P256, &material).unwrap()
            }
        }
    }

    fn archive_key(&self) -> Vec<u8> {
        match &self.recipient {
            Recipient::KeyLess => Vec::new(),
            Recipient::Symmetric(k) => k.to_vec(),
            Recipient::Asymmetric { archive_key, .. } => archive_key.to_vec(),
        }
    }

    pub fn build(&self, plaintext: &[u8]) -> Fixture {
        let metadata_block = encode_metadata(&self.metadata).unwrap();
        let key_block = self.key_block();

        // Compress first: stored lengths are part of the header.
        let mut compressor = create_compressor(self.codec, None);
        let chunks: Vec<&[u8]> = plaintext.chunks(self.segment_size as usize).collect();
        let last = chunks.len().saturating_sub(1);
        let mut stored = Vec::with_capacity(chunks.len());
        let mut segments = Vec::with_capacity(chunks.len());
        let mut offset = 0u64;
        for (i, chunk) in chunks.iter().enumerate() {
            let mut flags = SegmentFlags::empty();
            if i == last {
                flags |= SegmentFlags::FINAL;
            }
            let body = if self.codec == CompressionCodec::None {
                chunk.to_vec()
            } else {
                flags |= SegmentFlags::COMPRESSED;
                let mut out = Vec::new();
                compressor.compress_segment(chunk, &mut out).unwrap();
                out
            };
            segments.push(SegmentDescriptor {
                index: i as u32,
                flags,
                reserved: 0,
                plaintext_len: chunk.len() as u32,
                stored_len: body.len() as u32,
                tag: [0u8; TAG_LEN],
                ciphertext_offset: offset,
            });
            offset += body.len() as u64;
            stored.push(body);
        }

        let header = ArchiveHeader {
            profile: self.profile() as u16,
            cipher: self.cipher as u16,
            hkdf_prf: self.prf as u16,
            compression: self.codec as u16,
            metadata_len: metadata_block.len() as u32,
            key_block_len: key_block.len() as u32,
            segment_count: segments.len() as u32,
            segment_size: self.segment_size,
            plaintext_size: plaintext.len() as u64,
            payload_size: offset,
            salt: self.salt,
            ..Default::default()
        };
        let header_bytes = encode_header_le(&header);

        let mut cek = [0u8; KEY_LEN_32];
        derive_content_key(&self.archive_key(), &header, &mut cek).unwrap();
        let nonce_base = derive_nonce_base(self.prf, &cek).unwrap();
        let context = context_digest(&metadata_block, &key_block);

        let mut payload = Vec::with_capacity(offset as usize);
        for (desc, body) in segments.iter_mut().zip(&stored) {
            let key = derive_segment_key(self.prf, &cek, desc.index).unwrap();
            let aead = AeadImpl::new(self.cipher, &key[..]).unwrap();
            let nonce = derive_nonce_12_tls_style(&nonce_base, desc.index);
            let aad = build_aad(&header_bytes, &context, &desc.aad_fields());
            let sealed = aead.seal(&nonce, &aad, body).unwrap();
            let (ct, tag) = sealed.split_at(sealed.len() - TAG_LEN);
            desc.tag.copy_from_slice(tag);
            payload.extend_from_slice(ct);
        }

        let table_offset = HEADER_LEN + metadata_block.len() + key_block.len();
        let table = encode_segment_table(&segments);
        let payload_offset = table_offset + table.len();

        let mut bytes = Vec::with_capacity(payload_offset + payload.len());
        bytes.extend_from_slice(&header_bytes);
        bytes.extend_from_slice(&metadata_block);
        bytes.extend_from_slice(&key_block);
        bytes.extend_from_slice(&table);
        bytes.extend_from_slice(&payload);

        Fixture { bytes, table_offset, payload_offset, segments }
    }
}

/// Deterministic pseudo-random plaintext.
pub fn sample_plaintext(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut buf = vec![0u8; len];
    rng.fill_bytes(&mut buf);
    buf
}

/// Compressible plaintext.
pub fn text_plaintext(len: usize) -> Vec<u8> {
    b"the quick brown fox jumps over the lazy dog. ".iter().copied().cycle().take(len).collect()
}

/// Seeded P-256 recipient key pair; PEM is PKCS#8.
pub fn recipient_keypair(seed: u64) -> (SecretKey, PublicKey, KeyMaterial) {
    let mut rng = StdRng::seed_from_u64(seed);
    let secret = SecretKey::random(&mut rng);
    let public = secret.public_key();
    let pem = secret.to_pkcs8_pem(LineEnding::LF).unwrap();
    (secret, public, KeyMaterial::from_pem(pem.as_bytes()))
}

/// Uncompressed SEC1 encoding, for assertions on recipient identity.
pub fn sec1_uncompressed(public: &PublicKey) -> Vec<u8> {
    public.to_encoded_point(false).as_bytes().to_vec()
}

pub fn symmetric_key(bytes: [u8; KEY_LEN_32]) -> KeyMaterial {
    KeyMaterial::symmetric(&bytes).unwrap()
}

/// Files left in `dir`, sorted.
pub fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Install a test-writer subscriber once; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
