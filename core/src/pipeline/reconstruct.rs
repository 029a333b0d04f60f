//! pipeline/reconstruct.rs
//! Output Reconstructor.
//!
//! Plaintext goes to a `NamedTempFile` in the destination directory and is
//! renamed onto the final path only after every segment authenticated. A
//! failed run drops the staging file, which deletes it.
//!
//! An existing file at the final path is never replaced. That includes the
//! input archive itself when it has no extension and is decrypted in place.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::types::AeaError;
use crate::utils::output_name_for;

pub struct OutputReconstructor {
    staging: BufWriter<NamedTempFile>,
    final_path: PathBuf,
}

impl OutputReconstructor {
    /// Stage output for `archive` inside `out_dir`.
    ///
    /// `out_dir` is created when `create_dir` is set; otherwise it must exist.
    pub fn create(out_dir: &Path, archive: &Path, create_dir: bool) -> Result<Self, AeaError> {
        if create_dir {
            fs::create_dir_all(out_dir)?;
        }
        let final_path = out_dir.join(output_name_for(archive));
        if final_path.symlink_metadata().is_ok() {
            return Err(AeaError::OutputExists(final_path));
        }
        let staging = tempfile::Builder::new()
            .prefix(".aea-staging-")
            .tempfile_in(out_dir)?;

        debug!(staging = %staging.path().display(), output = %final_path.display(), "staging output");
        Ok(Self { staging: BufWriter::new(staging), final_path })
    }

    pub fn writer(&mut self) -> &mut impl Write {
        &mut self.staging
    }

    /// Flush, sync and move the staging file onto the final path.
    ///
    /// Fails with `OutputExists` if something appeared at the final path
    /// while the run was in progress.
    pub fn commit(self) -> Result<PathBuf, AeaError> {
        let file = self.staging.into_inner().map_err(|e| e.into_error())?;
        file.as_file().sync_all()?;
        match file.persist_noclobber(&self.final_path) {
            Ok(_) => Ok(self.final_path),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                warn!(output = %self.final_path.display(), "output appeared during the run; staging discarded");
                Err(AeaError::OutputExists(self.final_path))
            }
            Err(e) => Err(e.error.into()),
        }
    }

    /// Drop the staging file after a failed run.
    pub fn discard(self, reason: &AeaError) {
        warn!(output = %self.final_path.display(), error = %reason, "discarding partial output");
        // NamedTempFile removes itself on drop.
        drop(self);
    }
}
