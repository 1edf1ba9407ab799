//! Input discovery.

use std::path::{Path, PathBuf};

use javelin_core::{Artifact, ArtifactStream, Error, artifact_channel, walk_files};

/// Files under `root` with the given extension, sorted by path.
///
/// Files whose name starts with `-` are skipped.
pub fn discover(root: &Path, extension: &str) -> anyhow::Result<Vec<Artifact>> {
    if !root.is_dir() {
        anyhow::bail!("Directory not found: {}", root.display());
    }
    let root = root.canonicalize()?;

    let artifacts = walk_files(&root)?
        .into_iter()
        .filter(|artifact| artifact.extension() == Some(extension))
        .filter(|artifact| !is_excluded(artifact.path()))
        .collect();

    Ok(artifacts)
}

fn is_excluded(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('-'))
}

/// Stream the `.jar` files under `dir` as they are found.
pub fn library_stream(dir: PathBuf) -> ArtifactStream {
    let (sink, stream) = artifact_channel();

    tokio::spawn(async move {
        let found = match tokio::task::spawn_blocking(move || walk_files(&dir)).await {
            Ok(found) => found,
            Err(e) => Err(Error::StageTask(e.to_string())),
        };

        match found {
            Ok(files) => {
                let jars = files
                    .into_iter()
                    .filter(|artifact| artifact.extension() == Some("jar"));
                if let Err(e) = sink.send_all(jars).await {
                    tracing::debug!("library stream dropped: {}", e);
                }
            }
            Err(e) => sink.fail(e).await,
        }
    });

    stream
}
