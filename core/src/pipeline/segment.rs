//! pipeline/segment.rs
//!
//! Segment Decryption Engine.
//!
//! Per segment `i`:
//! 1. key_i   = HKDF-Expand(CEK, "AEA_SK" ‖ i)
//! 2. nonce_i = nonce_base XOR i (TLS style)
//! 3. AAD     = header ‖ SHA-256(metadata ‖ key block) ‖ descriptor fields
//! 4. open(ciphertext ‖ tag); only then decompress
//!
//! No plaintext from a segment is returned unless its tag verified.

use std::io::{Read, Seek, SeekFrom};
use std::iter::FusedIterator;
use std::time::Instant;

use tracing::debug;

use crate::compression::{create_decompressor, CompressionCodec, Decompressor};
use crate::container::{Container, SegmentDescriptor};
use crate::crypto::{
    build_aad, derive_nonce_12_tls_style, derive_nonce_base, derive_segment_key, AeadImpl, CryptoError,
    CONTEXT_DIGEST_LEN, NONCE_LEN_12, TAG_LEN,
};
use crate::headers::{CipherSuite, HkdfPrf, HEADER_LEN};
use crate::keys::ContentEncryptionKey;
use crate::pipeline::abort::AbortHandle;
use crate::pipeline::io::read_segment_ciphertext;
use crate::pipeline::types::DecryptedSegment;
use crate::telemetry::{Stage, StageTimes, TelemetryCounters};
use crate::types::AeaError;

/// Immutable decryption context shared by every worker of one archive.
///
/// Holds the CEK; it is wiped when the decryptor is dropped.
#[derive(Debug)]
pub struct SegmentDecryptor {
    cek: ContentEncryptionKey,
    prf: HkdfPrf,
    suite: CipherSuite,
    codec: CompressionCodec,
    nonce_base: [u8; NONCE_LEN_12],
    header_bytes: [u8; HEADER_LEN],
    context: [u8; CONTEXT_DIGEST_LEN],
}

impl SegmentDecryptor {
    pub fn new(container: &Container, cek: ContentEncryptionKey) -> Result<Self, AeaError> {
        let header = container.header();
        let prf = header.prf()?;
        let suite = header.cipher_suite()?;
        let codec = header.codec()?;
        let nonce_base = derive_nonce_base(prf, cek.as_bytes())?;

        Ok(Self {
            cek,
            prf,
            suite,
            codec,
            nonce_base,
            header_bytes: *container.header_bytes(),
            context: container.context_digest(),
        })
    }

    pub fn codec(&self) -> CompressionCodec {
        self.codec
    }

    /// Fresh decompressor for one worker.
    pub fn decompressor(&self) -> Box<dyn Decompressor + Send> {
        create_decompressor(self.codec)
    }

    /// Authenticate and decode one segment.
    ///
    /// # Errors
    /// - `AuthenticationFailure { segment }` on tag mismatch.
    /// - `Decompression { segment, .. }` if the codec fails or the decoded
    ///   length differs from the descriptor.
    pub fn decrypt_segment(
        &self,
        desc: &SegmentDescriptor,
        ciphertext: &[u8],
        decompressor: &mut dyn Decompressor,
    ) -> Result<DecryptedSegment, AeaError> {
        let segment = desc.index;
        if ciphertext.len() != desc.stored_len as usize {
            return Err(AeaError::Pipeline("ciphertext length does not match descriptor"));
        }

        let mut stage_times = StageTimes::default();
        let t = Instant::now();

        let key = derive_segment_key(self.prf, self.cek.as_bytes(), segment)?;
        let aead = AeadImpl::new(self.suite, &key[..])?;
        let nonce = derive_nonce_12_tls_style(&self.nonce_base, segment);
        let aad = build_aad(&self.header_bytes, &self.context, &desc.aad_fields());

        let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(ciphertext);
        sealed.extend_from_slice(&desc.tag);

        let stored = aead.open(&nonce, &aad, &sealed).map_err(|e| match e {
            CryptoError::TagMismatch => AeaError::AuthenticationFailure { segment },
            other => AeaError::Crypto(other),
        })?;
        stage_times.add(Stage::Decrypt, t.elapsed());

        let bytes = if desc.is_compressed() {
            let t = Instant::now();
            let mut out = Vec::with_capacity(desc.plaintext_len as usize);
            decompressor
                .decompress_segment(&stored, desc.plaintext_len as usize, &mut out)
                .map_err(|source| AeaError::Decompression { segment, source })?;
            stage_times.add(Stage::Decompress, t.elapsed());
            out
        } else {
            stored
        };

        let mut counters = TelemetryCounters::default();
        counters.add_segment(desc.stored_len as usize, TAG_LEN, bytes.len(), desc.is_compressed());

        debug!(segment, stored = desc.stored_len, plaintext = bytes.len(), "segment authenticated");
        Ok(DecryptedSegment { index: segment, bytes, counters, stage_times })
    }

    /// Sequential, lazy decryption of every segment in `container`.
    pub fn stream<'a, R: Read + Seek>(&'a self, container: &'a Container, reader: R) -> SegmentStream<'a, R> {
        SegmentStream {
            decryptor: self,
            segments: container.segments(),
            payload_offset: container.payload_offset(),
            reader,
            decompressor: self.decompressor(),
            next: 0,
            positioned: false,
            done: false,
            abort: None,
        }
    }
}

/// Finite, non-restartable iterator over decrypted segments in index order.
/// Yields at most one error, then ends.
pub struct SegmentStream<'a, R> {
    decryptor: &'a SegmentDecryptor,
    segments: &'a [SegmentDescriptor],
    payload_offset: u64,
    reader: R,
    decompressor: Box<dyn Decompressor + Send>,
    next: usize,
    positioned: bool,
    done: bool,
    abort: Option<AbortHandle>,
}

impl<'a, R: Read + Seek> SegmentStream<'a, R> {
    /// Stop with `AeaError::Cancelled` once `abort` is triggered.
    pub fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = Some(abort);
        self
    }

    fn step(&mut self) -> Result<DecryptedSegment, AeaError> {
        if self.abort.as_ref().is_some_and(AbortHandle::is_cancelled) {
            return Err(AeaError::Cancelled);
        }
        if !self.positioned {
            self.reader.seek(SeekFrom::Start(self.payload_offset))?;
            self.positioned = true;
        }

        let desc = self.segments[self.next];
        let t = Instant::now();
        let ciphertext = read_segment_ciphertext(&mut self.reader, &desc)?;
        let read_time = t.elapsed();

        let mut seg = self.decryptor.decrypt_segment(&desc, &ciphertext, self.decompressor.as_mut())?;
        seg.stage_times.add(Stage::Read, read_time);
        Ok(seg)
    }
}

impl<'a, R: Read + Seek> Iterator for SegmentStream<'a, R> {
    type Item = Result<DecryptedSegment, AeaError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next >= self.segments.len() {
            self.done = true;
            return None;
        }
        let res = self.step();
        self.next += 1;
        if res.is_err() {
            self.done = true;
        }
        Some(res)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        (0, Some(self.segments.len() - self.next))
    }
}

impl<'a, R: Read + Seek> FusedIterator for SegmentStream<'a, R> {}
