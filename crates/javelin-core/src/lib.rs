//! Stream-oriented build stages for Java projects.
//!
//! This crate provides:
//! - Artifact channels and stage composition
//! - A javac stage compiling each batch in one invocation
//! - A jar stage packaging its inputs into one archive
//! - Library aggregation for live dependency streams
//! - External tool execution with line-by-line logging

pub mod artifact;
pub mod deps;
pub mod error;
pub mod jar;
pub mod javac;
pub mod log;
pub mod paths;
pub mod pipeline;
pub mod process;
pub mod stage;
pub mod stream;
pub mod toolchain;

pub use artifact::{Artifact, walk_files};
pub use deps::{AcceptsLibraries, Libraries, LibrarySource};
pub use error::{Error, Result};
pub use jar::{ArchivePlan, JarOptions, JarStage};
pub use javac::{BatchRequest, DebugInfo, DebugKind, JavacOptions, JavacStage};
pub use log::{LogSink, MemorySink, ToolLog, TracingSink, Verbosity};
pub use paths::ScratchDirs;
pub use pipeline::{CompileOptions, CompileStage, PipelineBuilder};
pub use process::ProcessResult;
pub use stage::{Stage, StageHandle, StageState};
pub use stream::{ArtifactSink, ArtifactStream, artifact_channel, encapsulate, forward, pipe};
pub use toolchain::Tool;
