//! Packaging stage.
//!
//! Buffers every incoming artifact into an [`ArchivePlan`] and, once the
//! input ends, runs the archiver once:
//!
//! ```text
//! jar [-J<flag>...] cf[v][M][e] <dir>/<name>.jar [<entrypoint>] -C <base> <relative> ...
//! ```
//!
//! The archive is emitted as the stage's only artifact.

mod options;
mod plan;

pub use options::JarOptions;
pub use plan::ArchivePlan;

use crate::artifact::Artifact;
use crate::error::Result;
use crate::log::ToolLog;
use crate::paths;
use crate::process;
use crate::stage::{Stage, StageContext, StageHandle, StageState, collect_input, spawn_stage};
use crate::stream::{ArtifactSink, ArtifactStream};
use crate::toolchain::Tool;

const TOOL: &str = "jar";

/// Stage packaging artifacts into one archive.
pub struct JarStage {
    handle: StageHandle,
}

impl JarStage {
    /// Validate the archive name and `options`, then start the stage.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(jar_name: impl Into<String>, options: JarOptions, log: ToolLog) -> Result<Self> {
        let jar_name = jar_name.into();
        options::validate_jar_name(&jar_name)?;
        options.validate()?;

        let handle = spawn_stage(TOOL, log, move |ctx| package(ctx, jar_name, options));
        Ok(Self { handle })
    }

    /// Subscribe to state transitions.
    pub fn watch_state(&self) -> tokio::sync::watch::Receiver<StageState> {
        self.handle.watch_state()
    }
}

impl Stage for JarStage {
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

async fn package(mut ctx: StageContext, jar_name: String, options: JarOptions) -> Result<()> {
    let mut plan = ArchivePlan::new();
    for artifact in collect_input(&mut ctx.input).await? {
        if plan.base_is_new(&artifact) {
            ctx.log
                .trace(TOOL, format_args!("new jar folder: {}", artifact.base().display()));
        }
        if !plan.insert(&artifact)? {
            ctx.log.trace(TOOL, format_args!("skipping duplicate {}", artifact));
        }
    }
    ctx.log.trace(
        TOOL,
        format_args!("input ended with {} entries", plan.len()),
    );

    if plan.is_empty() {
        ctx.log.trace(TOOL, "nothing to archive; skipping invocation");
        return Ok(());
    }

    ctx.state.enter(StageState::Executing);
    let tool = Tool::resolve(TOOL, &options.tool_path)?;
    let archive_dir = options.scratch.create_dir("jar")?;
    let jar_path = archive_dir.path().join(&jar_name);

    let result = process::run(&tool, plan.arguments(&jar_path, &options), &ctx.log).await?;
    result.check(&tool)?;

    ctx.state.enter(StageState::Streaming);
    let metadata = tokio::fs::metadata(&jar_path).await?;
    ctx.log.trace(
        TOOL,
        format_args!("wrote {} ({} bytes)", jar_path.display(), metadata.len()),
    );

    let archive_dir = paths::persist(archive_dir);
    ctx.output
        .send(Artifact::from_relative(archive_dir, jar_name)?)
        .await
}
