//! Stream forwarding.

use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;

use crate::artifact::Artifact;
use crate::error::Result;

use super::{ArtifactSink, ArtifactStream};

/// Copy every artifact from `source` into `dest`, then signal end-of-stream
/// by releasing `dest`.
///
/// Returns the number of artifacts forwarded. A failure item from the source
/// stops forwarding and is returned to the caller, who decides where the
/// failure goes; `dest` is released either way.
pub async fn forward<S>(mut source: S, dest: ArtifactSink) -> Result<usize>
where
    S: Stream<Item = Result<Artifact>> + Unpin,
{
    let mut count = 0;
    while let Some(item) = source.next().await {
        dest.send(item?).await?;
        count += 1;
    }
    Ok(count)
}

/// Spawn a forwarder linking one stage's output to the next stage's input.
///
/// Unlike [`forward`], a failure from `source` is delivered into `dest` so
/// that it propagates to whatever reads the downstream stage.
pub fn pipe(source: ArtifactStream, dest: ArtifactSink) -> JoinHandle<()> {
    tokio::spawn(async move {
        let failure = dest.clone();
        match forward(source, dest).await {
            Ok(count) => {
                tracing::trace!("pipe forwarded {} artifacts", count);
            }
            Err(e) => failure.fail(e).await,
        }
    })
}
