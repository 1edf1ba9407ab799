//! Dependency aggregation for the compilation stage.
//!
//! Libraries can be attached at any point before the compiler runs, as a
//! fixed list of paths or as a live artifact stream that is still producing.
//! The stage only proceeds once its own input has ended *and* every attached
//! stream has ended:
//!
//! ```text
//! attach(A) ──► slot 0 ─┐
//! attach(B) ──► slot 1 ─┼──► when_ready() ──► classpath [A..., B..., C...]
//! attach(C) ──► slot 2 ─┘        ▲
//! input_ended() ─────────────────┘
//! ```
//!
//! Each source fills its own slot, so the classpath follows attach order
//! regardless of which source finishes first. Within a slot, paths keep the
//! order they arrived in.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::log::ToolLog;
use crate::stream::ArtifactStream;

/// A library source accepted by [`Libraries::attach`].
#[derive(Debug)]
pub enum LibrarySource {
    /// Fixed paths, available immediately.
    Paths(Vec<PathBuf>),
    /// Artifacts still being produced; each artifact's path is a library.
    Stream(ArtifactStream),
}

impl From<PathBuf> for LibrarySource {
    fn from(path: PathBuf) -> Self {
        Self::Paths(vec![path])
    }
}

impl From<&Path> for LibrarySource {
    fn from(path: &Path) -> Self {
        Self::Paths(vec![path.to_path_buf()])
    }
}

impl From<&str> for LibrarySource {
    fn from(path: &str) -> Self {
        Self::Paths(vec![PathBuf::from(path)])
    }
}

impl From<Vec<PathBuf>> for LibrarySource {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self::Paths(paths)
    }
}

impl From<ArtifactStream> for LibrarySource {
    fn from(stream: ArtifactStream) -> Self {
        Self::Stream(stream)
    }
}

/// Stages that accept libraries on a side input.
///
/// Composite stages implement this by forwarding to the stage that owns the
/// aggregator, so callers cannot tell them apart.
pub trait AcceptsLibraries {
    /// Attach a library source. Fails once the batch has started.
    fn add_libraries(&self, source: impl Into<LibrarySource>) -> Result<()>;
}

#[derive(Default)]
struct JoinState {
    /// One entry per attached source, in attach order.
    slots: Vec<Vec<PathBuf>>,
    /// Streams attached but not yet ended.
    pending: usize,
    input_ended: bool,
    /// Set once the classpath has been handed out.
    sealed: bool,
    failure: Option<Error>,
}

struct Shared {
    state: Mutex<JoinState>,
    notify: Notify,
    log: ToolLog,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, JoinState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Wait-group over attached library sources.
///
/// Cloning shares the same aggregator.
#[derive(Clone)]
pub struct Libraries {
    inner: Arc<Shared>,
}

impl Libraries {
    /// Create an empty aggregator.
    pub fn new(log: ToolLog) -> Self {
        Self {
            inner: Arc::new(Shared {
                state: Mutex::new(JoinState::default()),
                notify: Notify::new(),
                log,
            }),
        }
    }

    /// Attach a library source.
    ///
    /// Stream sources are drained on a background task, so this must be
    /// called from within a tokio runtime.
    pub fn attach(&self, source: impl Into<LibrarySource>) -> Result<()> {
        let source = source.into();
        let mut state = self.inner.lock();
        if state.sealed {
            return Err(Error::LateAttachment);
        }

        let slot = state.slots.len();
        match source {
            LibrarySource::Paths(paths) => {
                self.inner
                    .log
                    .trace("javac", format_args!("adding {} library paths", paths.len()));
                state.slots.push(paths);
            }
            LibrarySource::Stream(stream) => {
                self.inner.log.trace("javac", "adding library stream");
                state.slots.push(Vec::new());
                state.pending += 1;
                drop(state);
                tokio::spawn(drain_source(self.inner.clone(), slot, stream));
            }
        }

        Ok(())
    }

    /// Number of attached streams that have not ended yet.
    pub fn pending(&self) -> usize {
        self.inner.lock().pending
    }

    /// Record that the stage's own input has ended.
    pub(crate) fn input_ended(&self) {
        self.inner.lock().input_ended = true;
        self.inner.notify.notify_waiters();
    }

    /// Wait until input has ended and every attached source has ended, then
    /// seal the aggregator and return the classpath.
    ///
    /// A failed source resolves this with [`Error::DependencyStream`] as soon
    /// as the input has ended, without waiting on the remaining sources.
    pub(crate) async fn when_ready(&self) -> Result<Vec<PathBuf>> {
        loop {
            // Registered before checking, so a wakeup between the check and
            // the await is not lost.
            let notified = self.inner.notify.notified();
            {
                let mut state = self.inner.lock();
                if state.input_ended {
                    if let Some(failure) = state.failure.take() {
                        state.sealed = true;
                        return Err(Error::DependencyStream(Box::new(failure)));
                    }
                    if state.pending == 0 {
                        state.sealed = true;
                        let classpath: Vec<PathBuf> =
                            state.slots.iter().flatten().cloned().collect();
                        self.inner.log.trace(
                            "javac",
                            format_args!("all libraries resolved ({} entries)", classpath.len()),
                        );
                        return Ok(classpath);
                    }
                }
            }
            notified.await;
        }
    }
}

impl AcceptsLibraries for Libraries {
    fn add_libraries(&self, source: impl Into<LibrarySource>) -> Result<()> {
        self.attach(source)
    }
}

async fn drain_source(shared: Arc<Shared>, slot: usize, mut stream: ArtifactStream) {
    while let Some(item) = stream.next().await {
        match item {
            Ok(artifact) => {
                shared.log.trace("javac", format_args!("library added: {}", artifact));
                shared.lock().slots[slot].push(artifact.path().to_path_buf());
            }
            Err(e) => {
                shared.log.trace("javac", format_args!("library stream failed: {}", e));
                let mut state = shared.lock();
                if state.failure.is_none() {
                    state.failure = Some(e);
                }
                break;
            }
        }
    }

    shared.lock().pending -= 1;
    shared.log.trace("javac", "library stream complete");
    shared.notify.notify_waiters();
}
