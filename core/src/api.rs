//! api.rs
//! Stable public operations: Info, Decrypt, Parse.
//!
//! Every call opens the archive afresh; nothing is cached between calls.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::constants::{DEFAULT_INFLIGHT_CAP, DEFAULT_MEM_FRACTION, MAX_INFLIGHT_SEGMENTS, MAX_WORKERS};
use crate::container::{parse_container, Container};
use crate::keys::{resolve_content_key, KeyMaterial};
use crate::metadata::{decode_metadata, Metadata};
use crate::pipeline::{run_decrypt_pipeline, AbortHandle, OutputReconstructor, ParallelismProfile, SegmentDecryptor};
use crate::telemetry::{Stage, TelemetrySnapshot};
use crate::types::AeaError;

#[derive(Debug, Clone)]
pub struct DecryptConfig {
    /// Decrypt workers. `None` → one per core.
    pub workers: Option<usize>,
    /// Reorder window in segments. `None` → sized from available memory.
    pub inflight_segments: Option<usize>,
    /// Create the output directory if it is missing.
    pub create_output_dir: bool,
    /// Shared flag another thread can use to stop the run.
    pub abort: Option<AbortHandle>,
}

impl Default for DecryptConfig {
    fn default() -> Self {
        Self { workers: None, inflight_segments: None, create_output_dir: true, abort: None }
    }
}

impl DecryptConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_inflight_segments(mut self, n: usize) -> Self {
        self.inflight_segments = Some(n);
        self
    }

    pub fn with_create_output_dir(mut self, create: bool) -> Self {
        self.create_output_dir = create;
        self
    }

    pub fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = Some(abort);
        self
    }

    pub fn validate(&self) -> Result<(), AeaError> {
        if let Some(w) = self.workers {
            if !(1..=MAX_WORKERS).contains(&w) {
                return Err(AeaError::InvalidConfig(format!(
                    "invalid workers count: {w}, must be in 1..={MAX_WORKERS}"
                )));
            }
        }
        if let Some(n) = self.inflight_segments {
            if !(1..=MAX_INFLIGHT_SEGMENTS).contains(&n) {
                return Err(AeaError::InvalidConfig(format!(
                    "invalid inflight segments: {n}, must be in 1..={MAX_INFLIGHT_SEGMENTS}"
                )));
            }
        }
        Ok(())
    }

    fn parallelism(&self, segment_size: u32) -> ParallelismProfile {
        ParallelismProfile::dynamic(segment_size as u64, DEFAULT_MEM_FRACTION, DEFAULT_INFLIGHT_CAP)
            .with_overrides(self.workers, self.inflight_segments)
    }
}

/// Result of a successful decrypt.
#[derive(Debug, Clone)]
pub struct DecryptOutcome {
    pub path: PathBuf,
    pub telemetry: TelemetrySnapshot,
}

fn open_archive(path: &Path) -> Result<BufReader<File>, AeaError> {
    Ok(BufReader::new(File::open(path)?))
}

/// Parse and validate the container without touching any key.
pub fn inspect(path: &Path) -> Result<Container, AeaError> {
    let mut reader = open_archive(path)?;
    parse_container(&mut reader)
}

/// Decoded metadata entries, in declaration order.
pub fn info(path: &Path) -> Result<Metadata, AeaError> {
    metadata_of(inspect(path)?)
}

/// Metadata of an already parsed container.
pub fn metadata_of(container: Container) -> Result<Metadata, AeaError> {
    Ok(decode_metadata(container.metadata_block())?)
}

/// Decrypt `path` into `output_dir` with default settings.
pub fn decrypt(path: &Path, output_dir: &Path, key: Option<KeyMaterial>) -> Result<PathBuf, AeaError> {
    decrypt_with_config(path, output_dir, key, &DecryptConfig::default()).map(|o| o.path)
}

/// Decrypt with no key material. Only key-less archives succeed.
pub fn parse(path: &Path, output_dir: &Path) -> Result<PathBuf, AeaError> {
    decrypt(path, output_dir, None)
}

pub fn decrypt_with_config(
    path: &Path,
    output_dir: &Path,
    key: Option<KeyMaterial>,
    config: &DecryptConfig,
) -> Result<DecryptOutcome, AeaError> {
    config.validate()?;

    let t = Instant::now();
    let mut reader = open_archive(path)?;
    let container = parse_container(&mut reader)?;
    let parse_time = t.elapsed();

    let out_dir_ok = config.create_output_dir || output_dir.is_dir();
    if !out_dir_ok {
        return Err(AeaError::InvalidConfig(format!(
            "output directory does not exist: {}",
            output_dir.display()
        )));
    }

    let mut outcome = decrypt_container(container, reader, path, output_dir, key.as_ref(), config)?;
    outcome.telemetry.stage_times.add(Stage::Parse, parse_time);

    info!(
        archive = %path.display(),
        output = %outcome.path.display(),
        segments = outcome.telemetry.segments,
        bytes = outcome.telemetry.bytes_plaintext,
        "archive decrypted"
    );
    Ok(outcome)
}

fn decrypt_container<R>(
    container: Container,
    reader: R,
    archive: &Path,
    output_dir: &Path,
    key: Option<&KeyMaterial>,
    config: &DecryptConfig,
) -> Result<DecryptOutcome, AeaError>
where
    R: Read + Seek + Send,
{
    // Metadata must decode even though decryption does not use it.
    decode_metadata(container.metadata_block())?;

    let cek = resolve_content_key(key, container.wrapped_key_block(), container.header())?;
    let decryptor = SegmentDecryptor::new(&container, cek)?;
    let profile = config.parallelism(container.header().segment_size);
    let abort = config.abort.clone().unwrap_or_default();

    let mut output = OutputReconstructor::create(output_dir, archive, config.create_output_dir)?;
    let run = run_decrypt_pipeline(reader, &container, &decryptor, &profile, &abort, output.writer());

    match run {
        Ok(telemetry) => {
            let path = output.commit()?;
            Ok(DecryptOutcome { path, telemetry })
        }
        Err(e) => {
            output.discard(&e);
            Err(e)
        }
    }
}
