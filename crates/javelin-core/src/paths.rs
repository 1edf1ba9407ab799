//! Scratch directory management.
//!
//! Every stage invocation gets fresh temporary files and directories:
//!
//! ```text
//! <scratch root>/
//! ├── javelin-javac-args-XXXX.txt     # argument file, removed after javac exits
//! ├── javelin-javac-sources-XXXX.txt  # source list, removed after javac exits
//! ├── javelin-classes-XXXX/           # javac output, kept for downstream readers
//! └── javelin-jar-XXXX/               # archive directory, kept for the caller
//! ```
//!
//! Output directories outlive the stage because a downstream stage (or the
//! caller) reads them after the stage is done. They are left for the
//! system's temp cleanup, or live under a caller-chosen root.

use std::env;
use std::fs;
use std::path::PathBuf;

use tempfile::{Builder, NamedTempFile, TempDir};

use crate::error::Result;

/// Where a stage creates its temporary files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScratchDirs {
    /// Root directory; the system temp directory when `None`.
    root: Option<PathBuf>,
}

impl ScratchDirs {
    /// Use the system temp directory.
    pub fn system() -> Self {
        Self::default()
    }

    /// Use `root`, creating it on first use.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// The directory scratch entries are created in.
    pub fn root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(env::temp_dir)
    }

    /// Create a fresh directory named `javelin-<label>-XXXX`.
    pub fn create_dir(&self, label: &str) -> Result<TempDir> {
        let root = self.ensure_root()?;
        Ok(Builder::new()
            .prefix(&format!("javelin-{}-", label))
            .tempdir_in(root)?)
    }

    /// Create a fresh file named `javelin-<label>-XXXX.txt`.
    pub fn create_file(&self, label: &str) -> Result<NamedTempFile> {
        let root = self.ensure_root()?;
        Ok(Builder::new()
            .prefix(&format!("javelin-{}-", label))
            .suffix(".txt")
            .tempfile_in(root)?)
    }

    fn ensure_root(&self) -> Result<PathBuf> {
        let root = self.root();
        if !root.exists() {
            fs::create_dir_all(&root)?;
        }
        Ok(root)
    }
}

/// Persist a scratch directory and return its path.
pub(crate) fn persist(dir: TempDir) -> PathBuf {
    dir.keep()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_created_under_root() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let scratch = ScratchDirs::under(temp.path().join("nested/scratch"));

        let dir = scratch.create_dir("classes").expect("Failed to create dir");
        let file = scratch.create_file("javac-args").expect("Failed to create file");

        assert!(dir.path().starts_with(scratch.root()));
        assert!(file.path().starts_with(scratch.root()));
        let name = dir.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("javelin-classes-"));
        assert!(file.path().to_string_lossy().ends_with(".txt"));
    }

    #[test]
    fn test_fresh_entries_per_call() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let scratch = ScratchDirs::under(temp.path());

        let first = scratch.create_dir("classes").unwrap();
        let second = scratch.create_dir("classes").unwrap();
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn test_persisted_dir_survives() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let scratch = ScratchDirs::under(temp.path());

        let path = persist(scratch.create_dir("jar").unwrap());
        assert!(path.is_dir());
    }

    #[test]
    fn test_system_root() {
        assert_eq!(ScratchDirs::system().root(), env::temp_dir());
    }
}
