//! Artifact value type shared by every stage.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// A file reference carrying its root directory and its path relative to
/// that root.
///
/// The base partitions artifacts into groups: the archiver receives one
/// `-C <base>` block per distinct base.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Artifact {
    path: PathBuf,
    base: PathBuf,
    relative: PathBuf,
}

impl Artifact {
    /// Create an artifact for `path`, which must live under `base`.
    pub fn new(base: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Result<Self> {
        let base = base.into();
        let path = path.into();

        let relative = path
            .strip_prefix(&base)
            .map_err(|_| Error::OutsideBase {
                path: path.clone(),
                base: base.clone(),
            })?
            .to_path_buf();

        if relative.as_os_str().is_empty() {
            return Err(Error::OutsideBase { path, base });
        }

        Ok(Self {
            path,
            base,
            relative,
        })
    }

    /// Create an artifact from a base and a path relative to it.
    pub fn from_relative(base: impl Into<PathBuf>, relative: impl Into<PathBuf>) -> Result<Self> {
        let base = base.into();
        let given = relative.into();

        let mut relative = PathBuf::new();
        for component in given.components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                _ => return Err(Error::InvalidRelative(given.clone())),
            }
        }
        if relative.as_os_str().is_empty() {
            return Err(Error::InvalidRelative(given));
        }

        Ok(Self {
            path: base.join(&relative),
            base,
            relative,
        })
    }

    /// Create an artifact for a standalone file, using its parent directory
    /// as the base.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::InvalidRelative(path.clone()))?;
        Self::new(base, path)
    }

    /// Full path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root directory this artifact is grouped under.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Path relative to [`Artifact::base`].
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// File extension, if any.
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// List every regular file under `root` as an artifact based at `root`,
/// sorted by path.
pub fn walk_files(root: &Path) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            artifacts.push(Artifact::new(root, entry.path())?);
        }
    }
    Ok(artifacts)
}
