//! Compilation stage.
//!
//! Buffers every incoming source file, waits for the stage input to end and
//! for every attached library source to end, then runs javac once over the
//! whole batch:
//!
//! ```text
//! sources ──► collect ──► wait for libraries ──► javac @args @sources ──► walk classes dir ──► class files
//! ```
//!
//! Each emitted artifact is based at the fresh class output directory, so its
//! relative path is the package path of the class file.

mod batch;
mod options;

pub use batch::{BatchRequest, quote};
pub use options::{DebugInfo, DebugKind, JavacOptions};

use futures::stream;

use crate::artifact::{Artifact, walk_files};
use crate::deps::{AcceptsLibraries, Libraries, LibrarySource};
use crate::error::{Error, Result};
use crate::log::ToolLog;
use crate::paths;
use crate::process;
use crate::stage::{Stage, StageContext, StageHandle, StageState, collect_input, spawn_stage};
use crate::stream::{ArtifactSink, ArtifactStream, forward};
use crate::toolchain::Tool;

const TOOL: &str = "javac";

/// Stage compiling Java sources into class files.
pub struct JavacStage {
    handle: StageHandle,
    libraries: Libraries,
}

impl JavacStage {
    /// Validate `options` and start the stage.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(options: JavacOptions, log: ToolLog) -> Result<Self> {
        options.validate()?;

        let libraries = Libraries::new(log.clone());
        let aggregator = libraries.clone();
        let handle = spawn_stage(TOOL, log, move |ctx| compile(ctx, options, aggregator));

        Ok(Self { handle, libraries })
    }

    /// The stage's dependency aggregator.
    pub fn libraries(&self) -> &Libraries {
        &self.libraries
    }

    /// Subscribe to state transitions.
    pub fn watch_state(&self) -> tokio::sync::watch::Receiver<StageState> {
        self.handle.watch_state()
    }

    /// Split into the stage handle and the dependency aggregator.
    pub(crate) fn into_handle(self) -> (StageHandle, Libraries) {
        (self.handle, self.libraries)
    }
}

impl Stage for JavacStage {
    fn sink(&self) -> &ArtifactSink {
        self.handle.sink()
    }

    fn state(&self) -> StageState {
        self.handle.state()
    }

    fn into_parts(self) -> (ArtifactSink, ArtifactStream) {
        self.handle.into_parts()
    }
}

impl AcceptsLibraries for JavacStage {
    fn add_libraries(&self, source: impl Into<LibrarySource>) -> Result<()> {
        self.libraries.attach(source)
    }
}

async fn compile(mut ctx: StageContext, options: JavacOptions, libraries: Libraries) -> Result<()> {
    let sources: Vec<_> = collect_input(&mut ctx.input)
        .await?
        .into_iter()
        .map(|artifact| artifact.path().to_path_buf())
        .collect();
    ctx.log.trace(TOOL, format_args!("input ended with {} sources", sources.len()));

    libraries.input_ended();
    ctx.state.enter(StageState::Waiting);
    let classpath = libraries.when_ready().await?;

    if sources.is_empty() {
        ctx.log.trace(TOOL, "no sources; skipping invocation");
        return Ok(());
    }

    ctx.state.enter(StageState::Executing);
    let tool = Tool::resolve(TOOL, &options.tool_path)?;
    let output_dir = options.scratch.create_dir("classes")?;
    let request = BatchRequest {
        sources,
        classpath,
        output_dir: output_dir.path().to_path_buf(),
    };

    let at_files = request.write_at_files(&options, &options.scratch).await?;
    let result = process::run(&tool, at_files.arguments(), &ctx.log).await;
    drop(at_files);
    // On failure the class directory is dropped (and removed) here.
    result?.check(&tool)?;

    ctx.state.enter(StageState::Streaming);
    let output_dir = paths::persist(output_dir);
    let classes = tokio::task::spawn_blocking(move || walk_files(&output_dir))
        .await
        .map_err(|e| Error::StageTask(e.to_string()))??;
    ctx.log
        .trace(TOOL, format_args!("emitting {} class files", classes.len()));

    forward(stream::iter(classes.into_iter().map(Ok::<Artifact, Error>)), ctx.output).await?;
    Ok(())
}
