//! Stage pipelines.
//!
//! [`PipelineBuilder`] links stages output-to-input and presents the chain
//! as a single stage. [`CompileStage`] is the usual javac → jar chain.

use tokio::sync::watch;

use crate::deps::{AcceptsLibraries, Libraries, LibrarySource};
use crate::error::Result;
use crate::jar::{JarOptions, JarStage};
use crate::javac::{JavacOptions, JavacStage};
use crate::log::ToolLog;
use crate::stage::{Stage, StageHandle, StageState};
use crate::stream::{ArtifactSink, ArtifactStream, encapsulate, pipe};

/// Builds a composite stage from a chain of stages.
///
/// ```ignore
/// let stage = PipelineBuilder::new(javac, log.clone()).then(jar).build();
/// ```
pub struct PipelineBuilder {
    head: ArtifactSink,
    tail: ArtifactStream,
    stages: usize,
    log: ToolLog,
}

impl PipelineBuilder {
    /// Start a chain at `first`.
    pub fn new(first: impl Stage, log: ToolLog) -> Self {
        let (head, tail) = first.into_parts();
        Self {
            head,
            tail,
            stages: 1,
            log,
        }
    }

    /// Append `next`, feeding it everything the chain so far produces.
    ///
    /// Must be called from within a tokio runtime.
    pub fn then(mut self, next: impl Stage) -> Self {
        let (sink, stream) = next.into_parts();
        pipe(self.tail, sink);
        self.tail = stream;
        self.stages += 1;
        self
    }

    /// Number of stages in the chain.
    pub fn stage_count(&self) -> usize {
        self.stages
    }

    /// Wrap the chain as one stage.
    pub fn build(self) -> StageHandle {
        self.log
            .trace("pipeline", format_args!("built chain of {} stages", self.stages));
        encapsulate(self.head, self.tail, self.log)
    }
}

/// Options for both halves of a [`CompileStage`].
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub javac: JavacOptions,
    pub jar: JarOptions,
}

impl CompileOptions {
    pub fn validate(&self) -> Result<()> {
        self.javac.validate()?;
        self.jar.validate()
    }
}

/// Compiles sources and packages the classes into one archive.
///
/// Libraries attached here go to the compilation half.
pub struct CompileStage {
    handle: StageHandle,
    libraries: Libraries,
}

impl CompileStage {
    /// Validate everything, then start both stages.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(jar_name: impl Into<String>, options: CompileOptions, log: ToolLog) -> Result<Self> {
        options.validate()?;

        let jar = JarStage::new(jar_name, options.jar, log.clone())?;
        let (javac, libraries) = JavacStage::new(options.javac, log.clone())?.into_handle();
        let handle = PipelineBuilder::new(javac, log).then(jar).build();

        Ok(Self { handle, libraries })
    }

    /// The compilation half's dependency aggregator.
    pub fn libraries(&self) -> &Libraries {
        &self.libraries
    }

    /// Subscribe to state transitions of the composite.
    pub fn watch_state(&self) -> watch::Receiver<StageState> {
        self.handle.watch_state()
    }
}

impl Stage for CompileStage {
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

impl AcceptsLibraries for CompileStage {
    fn add_libraries(&self, source: impl Into<LibrarySource>) -> Result<()> {
        self.libraries.attach(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Artifact;
    use crate::error::Error;
    use crate::stage::{collect_input, spawn_stage};

    fn artifact(name: &str) -> Artifact {
        Artifact::from_relative("/src", name).unwrap()
    }

    fn rename_stage(extension: &'static str) -> StageHandle {
        spawn_stage("rename", ToolLog::default(), move |mut ctx| async move {
            for input in collect_input(&mut ctx.input).await? {
                let renamed = input.relative().with_extension(extension);
                ctx.output.send(Artifact::from_relative("/out", renamed)?).await?;
            }
            Ok(())
        })
    }

    fn failing_stage() -> StageHandle {
        spawn_stage("fails", ToolLog::default(), |mut ctx| async move {
            collect_input(&mut ctx.input).await?;
            Err(Error::ToolFailed {
                tool: "fails".to_string(),
                code: Some(1),
            })
        })
    }

    #[tokio::test]
    async fn test_chain_of_three() {
        let builder = PipelineBuilder::new(rename_stage("class"), ToolLog::default())
            .then(rename_stage("jar"))
            .then(rename_stage("zip"));
        assert_eq!(builder.stage_count(), 3);

        let outputs = builder
            .build()
            .run(vec![artifact("A.java"), artifact("B.java")])
            .await
            .unwrap();

        let mut names: Vec<_> = outputs.iter().map(|a| a.relative().to_path_buf()).collect();
        names.sort();
        assert_eq!(names, vec![std::path::PathBuf::from("A.zip"), "B.zip".into()]);
    }

    #[tokio::test]
    async fn test_failure_in_middle_reaches_output() {
        let stage = PipelineBuilder::new(rename_stage("class"), ToolLog::default())
            .then(failing_stage())
            .then(rename_stage("jar"))
            .build();
        let state = stage.watch_state();

        let err = stage.run(vec![artifact("A.java")]).await.unwrap_err();

        assert!(matches!(err, Error::ToolFailed { code: Some(1), .. }));
        assert_eq!(*state.borrow(), StageState::Failed);
    }

    #[tokio::test]
    async fn test_invalid_options_rejected_before_start() {
        let options = CompileOptions {
            jar: JarOptions {
                omit_manifest: true,
                ..Default::default()
            }
            .with_entrypoint("app.Main"),
            ..Default::default()
        };
        assert!(matches!(
            CompileStage::new("app.jar", options, ToolLog::default()),
            Err(Error::InvalidOptions(_))
        ));
        assert!(
            CompileStage::new("out/app.jar", CompileOptions::default(), ToolLog::default())
                .is_err()
        );
    }
}
