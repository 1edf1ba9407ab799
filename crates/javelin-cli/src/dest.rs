//! Writing stage outputs to a destination directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use javelin_core::Artifact;

/// Copy each artifact to `dest/<relative>`, returning the written paths.
pub async fn write_all(artifacts: &[Artifact], dest: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        let target = dest.join(artifact.relative());
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::copy(artifact.path(), &target)
            .await
            .with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    artifact.path().display(),
                    target.display()
                )
            })?;
        written.push(target);
    }

    Ok(written)
}
