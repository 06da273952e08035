//! Per-run scratch directory for raw reports and rewritten theories.
//!
//! Each artifact has one fixed slot inside the directory. Jobs run one at a
//! time, so a slot is owned by at most one job; [`ScratchFile`] removes its
//! file on drop so the next job starts from an empty slot. Dropping the
//! [`Scratch`] itself removes whatever is left (e.g. after Ctrl-C).

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("lemmaloops-")
            .tempdir()
            .map_err(|e| Error::scratch(std::env::temp_dir(), e))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Captured prover stdout.
    pub fn report_path(&self) -> PathBuf {
        self.dir.path().join("report.ut")
    }

    /// Macro directives followed by the original theory.
    pub fn macro_input_path(&self) -> PathBuf {
        self.dir.path().join("theory.m4")
    }

    /// Macro tool output, handed to the prover.
    pub fn rewritten_path(&self) -> PathBuf {
        self.dir.path().join("preprocessed.spthy")
    }
}

/// A scratch artifact removed (best-effort) when dropped.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to remove scratch file: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_file_is_removed_on_drop() {
        let scratch = Scratch::new().unwrap();
        let p = scratch.report_path();
        {
            let f = ScratchFile::new(p.clone());
            std::fs::write(f.path(), "x").unwrap();
            assert!(p.exists());
        }
        assert!(!p.exists());
    }

    #[test]
    fn missing_scratch_file_drops_quietly() {
        let scratch = Scratch::new().unwrap();
        drop(ScratchFile::new(scratch.rewritten_path()));
    }

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let scratch = Scratch::new().unwrap();
        let dir = scratch.path().to_path_buf();
        std::fs::write(scratch.macro_input_path(), "left over").unwrap();
        drop(scratch);
        assert!(!dir.exists());
    }
}
