//! Stage runtime.
//!
//! A stage is a task sitting between an input channel and an output
//! channel. Callers hold the input [`ArtifactSink`] and the output
//! [`ArtifactStream`]; the task holds the other two ends.
//!
//! ```text
//!  caller ──► ArtifactSink ══input══► ┌────────────┐ ══output══► ArtifactStream ──► caller
//!                                     │ stage task │
//!                                     └────────────┘
//! ```
//!
//! Stage bodies return `Result<()>`. The runtime turns an `Err` (or a panic)
//! into the single failure item on the output stream, so bodies never emit
//! failures themselves.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::artifact::Artifact;
use crate::error::{Error, Result};
use crate::log::ToolLog;
use crate::stream::{ArtifactSink, ArtifactStream, artifact_channel};

/// Lifecycle of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    /// Accepting input.
    Collecting,
    /// Input ended, waiting on side inputs.
    Waiting,
    /// External tool running.
    Executing,
    /// Emitting output.
    Streaming,
    /// Output ended normally.
    Done,
    /// Output ended with a failure item.
    Failed,
}

impl StageState {
    /// Whether the stage will make no further progress.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Collecting => "collecting",
            Self::Waiting => "waiting",
            Self::Executing => "executing",
            Self::Streaming => "streaming",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Common interface of primitive and composite stages.
pub trait Stage {
    /// Input side.
    fn sink(&self) -> &ArtifactSink;

    /// Current lifecycle state.
    fn state(&self) -> StageState;

    /// Split into the input sink and the output stream.
    fn into_parts(self) -> (ArtifactSink, ArtifactStream);

    /// Feed `inputs`, close the input, and collect the output.
    fn run(self, inputs: Vec<Artifact>) -> impl Future<Output = Result<Vec<Artifact>>> + Send
    where
        Self: Sized,
    {
        let (sink, stream) = self.into_parts();
        async move {
            let feed = async move { sink.send_all(inputs).await };
            let (fed, output) = tokio::join!(feed, stream.collect_all());
            // The output carries the real failure when the stage stopped
            // reading early.
            let artifacts = output?;
            fed?;
            Ok(artifacts)
        }
    }
}

/// Sink and stream of a running stage task.
#[derive(Debug)]
pub struct StageHandle {
    sink: ArtifactSink,
    stream: ArtifactStream,
    state: watch::Receiver<StageState>,
}

impl StageHandle {
    /// Subscribe to state transitions.
    pub fn watch_state(&self) -> watch::Receiver<StageState> {
        self.state.clone()
    }
}

impl Stage for StageHandle {
    fn sink(&self) -> &ArtifactSink {
        &self.sink
    }

    fn state(&self) -> StageState {
        *self.state.borrow()
    }

    fn into_parts(self) -> (ArtifactSink, ArtifactStream) {
        (self.sink, self.stream)
    }
}

/// Shared writer for a stage's state.
#[derive(Clone)]
pub(crate) struct StateTracker {
    tx: Arc<watch::Sender<StageState>>,
    tool: &'static str,
    log: ToolLog,
}

impl StateTracker {
    pub(crate) fn enter(&self, state: StageState) {
        let previous = self.tx.send_replace(state);
        if previous != state {
            self.log.trace(self.tool, format_args!("{} -> {}", previous, state));
        }
    }

    /// Move to `to` only if the stage is still in `from`.
    pub(crate) fn advance(&self, from: StageState, to: StageState) {
        let moved = self.tx.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        });
        if moved {
            self.log.trace(self.tool, format_args!("{} -> {}", from, to));
        }
    }
}

/// Everything a stage body works with.
pub(crate) struct StageContext {
    /// Items written by the caller.
    pub(crate) input: ArtifactStream,
    /// Items read by the caller.
    pub(crate) output: ArtifactSink,
    pub(crate) state: StateTracker,
    pub(crate) log: ToolLog,
}

/// Spawn `body` as a stage task and return the caller's handle.
///
/// Must be called from within a tokio runtime.
pub(crate) fn spawn_stage<F, Fut>(tool: &'static str, log: ToolLog, body: F) -> StageHandle
where
    F: FnOnce(StageContext) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let (sink, input) = artifact_channel();
    let (output, stream) = artifact_channel();
    let (state_tx, state_rx) = watch::channel(StageState::Collecting);

    let tracker = StateTracker {
        tx: Arc::new(state_tx),
        tool,
        log: log.clone(),
    };

    // Held until the final state is recorded, so readers never observe
    // end-of-stream before the stage is terminal.
    let failure = output.clone();

    let ctx = StageContext {
        input,
        output,
        state: tracker.clone(),
        log: log.clone(),
    };
    let task = tokio::spawn(body(ctx));

    tokio::spawn(async move {
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(Error::StageTask(e.to_string())),
        };

        match result {
            Ok(()) => {
                tracker.enter(StageState::Done);
                drop(failure);
            }
            Err(e) => {
                tracker.enter(StageState::Failed);
                log.trace(tool, format_args!("failed: {}", e));
                failure.fail(e).await;
            }
        }
    });

    StageHandle {
        sink,
        stream,
        state: state_rx,
    }
}

/// Drain a stage's input, returning every artifact in arrival order.
///
/// An upstream failure item aborts the stage with that failure.
pub(crate) async fn collect_input(input: &mut ArtifactStream) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();
    while let Some(item) = input.next().await {
        artifacts.push(item?);
    }
    Ok(artifacts)
}
