//! Artifact channels and the helpers that move artifacts between them.
//!
//! Every stage owns two one-directional channels: an input channel the
//! caller writes into, and an output channel the stage writes into. Both
//! carry `Result<Artifact>` so that a failure travels the same path as data.
//!
//! End-of-stream is signaled by dropping every [`ArtifactSink`] of a channel.
//! A failure is a single `Err` item followed by end-of-stream.

mod compose;
mod forward;

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::mpsc;

use crate::artifact::Artifact;
use crate::error::{Error, Result};

pub use compose::encapsulate;
pub use forward::{forward, pipe};

/// Buffered items per channel before a writer has to wait.
pub const CHANNEL_CAPACITY: usize = 64;

/// Create a connected sink/stream pair.
pub fn artifact_channel() -> (ArtifactSink, ArtifactStream) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    (ArtifactSink { tx }, ArtifactStream { rx })
}

/// Write end of an artifact channel.
#[derive(Debug, Clone)]
pub struct ArtifactSink {
    tx: mpsc::Sender<Result<Artifact>>,
}

impl ArtifactSink {
    /// Send one artifact, waiting for buffer space.
    pub async fn send(&self, artifact: Artifact) -> Result<()> {
        self.tx
            .send(Ok(artifact))
            .await
            .map_err(|_| Error::StreamClosed)
    }

    /// Send every artifact from an iterator, in order.
    pub async fn send_all(&self, artifacts: impl IntoIterator<Item = Artifact>) -> Result<()> {
        for artifact in artifacts {
            self.send(artifact).await?;
        }
        Ok(())
    }

    /// Signal a failure and end the stream.
    ///
    /// If the reader is already gone the failure has nowhere to go and is
    /// logged instead.
    pub async fn fail(self, error: Error) {
        if let Err(mpsc::error::SendError(Err(error))) = self.tx.send(Err(error)).await {
            tracing::debug!("dropping failure for closed stream: {}", error);
        }
    }

    /// Signal end-of-stream for this handle.
    ///
    /// The reader observes the end once every clone has been closed or
    /// dropped.
    pub fn close(self) {}

    /// Whether the reading side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Read end of an artifact channel: a lazy, finite, non-restartable sequence.
#[derive(Debug)]
pub struct ArtifactStream {
    rx: mpsc::Receiver<Result<Artifact>>,
}

impl ArtifactStream {
    /// A finished stream over a fixed set of artifacts.
    pub fn from_artifacts(artifacts: Vec<Artifact>) -> Self {
        let (tx, rx) = mpsc::channel(artifacts.len().max(1));
        for artifact in artifacts {
            // Capacity covers every item, so this cannot be full.
            let _ = tx.try_send(Ok(artifact));
        }
        Self { rx }
    }

    /// A stream that yields nothing and is already ended.
    pub fn empty() -> Self {
        Self::from_artifacts(Vec::new())
    }

    /// Receive the next item. `None` means end-of-stream.
    pub async fn next(&mut self) -> Option<Result<Artifact>> {
        self.rx.recv().await
    }

    /// Drain the stream, returning every artifact or the failure it ended
    /// with.
    pub async fn collect_all(mut self) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::new();
        while let Some(item) = self.next().await {
            artifacts.push(item?);
        }
        Ok(artifacts)
    }
}

impl futures::Stream for ArtifactStream {
    type Item = Result<Artifact>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn artifact(name: &str) -> Artifact {
        Artifact::from_relative("/src", name).unwrap()
    }

    #[tokio::test]
    async fn test_end_after_all_sinks_dropped() {
        let (sink, mut stream) = artifact_channel();
        let second = sink.clone();

        sink.send(artifact("A.java")).await.unwrap();
        sink.close();
        second.send(artifact("B.java")).await.unwrap();
        drop(second);

        assert_eq!(stream.next().await.unwrap().unwrap(), artifact("A.java"));
        assert_eq!(stream.next().await.unwrap().unwrap(), artifact("B.java"));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_failure_is_distinct_from_end() {
        let (sink, stream) = artifact_channel();
        sink.send(artifact("A.java")).await.unwrap();
        sink.fail(Error::StreamClosed).await;

        let err = stream.collect_all().await.unwrap_err();
        assert!(matches!(err, Error::StreamClosed));
    }

    #[tokio::test]
    async fn test_send_to_dropped_stream() {
        let (sink, stream) = artifact_channel();
        drop(stream);

        assert!(sink.is_closed());
        assert!(matches!(
            sink.send(artifact("A.java")).await,
            Err(Error::StreamClosed)
        ));
    }

    #[tokio::test]
    async fn test_from_artifacts_is_finished() {
        let stream = ArtifactStream::from_artifacts(vec![artifact("A.java"), artifact("B.java")]);
        let items: Vec<_> = stream.map(|item| item.unwrap()).collect().await;
        assert_eq!(items, vec![artifact("A.java"), artifact("B.java")]);

        assert!(ArtifactStream::empty().collect_all().await.unwrap().is_empty());
    }
}
