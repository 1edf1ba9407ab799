//! Archive membership.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::artifact::Artifact;
use crate::error::{Error, Result};

use super::options::JarOptions;

/// Archive entries grouped by base directory.
///
/// Bases and relative paths are kept sorted, so the archiver command line
/// does not depend on the order artifacts arrived in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchivePlan {
    groups: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    /// Base each entry was first seen under.
    owners: BTreeMap<PathBuf, PathBuf>,
}

impl ArchivePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact. Returns `false` for an exact duplicate.
    ///
    /// The same relative path under a second base would produce two archive
    /// entries with one name, and fails with [`Error::DuplicateEntry`].
    pub fn insert(&mut self, artifact: &Artifact) -> Result<bool> {
        let relative = artifact.relative();
        if let Some(owner) = self.owners.get(relative) {
            if owner == artifact.base() {
                return Ok(false);
            }
            return Err(Error::DuplicateEntry(relative.to_path_buf()));
        }

        self.owners
            .insert(relative.to_path_buf(), artifact.base().to_path_buf());
        self.groups
            .entry(artifact.base().to_path_buf())
            .or_default()
            .insert(relative.to_path_buf());
        Ok(true)
    }

    /// Whether nothing under `artifact`'s base has been added yet.
    pub fn base_is_new(&self, artifact: &Artifact) -> bool {
        !self.groups.contains_key(artifact.base())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Distinct bases, sorted.
    pub fn bases(&self) -> impl Iterator<Item = &Path> {
        self.groups.keys().map(PathBuf::as_path)
    }

    /// Archiver arguments creating `jar_path` from this plan.
    pub fn arguments(&self, jar_path: &Path, options: &JarOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = options
            .launcher_flags
            .iter()
            .map(|flag| OsString::from(format!("-J{}", flag)))
            .collect();

        args.push(options.mode_flags().into());
        args.push(jar_path.into());
        if let Some(entrypoint) = &options.entrypoint {
            args.push(entrypoint.into());
        }

        for (base, entries) in &self.groups {
            for entry in entries {
                args.push("-C".into());
                args.push(base.into());
                args.push(entry.into());
            }
        }

        args
    }
}
