//! Command-line option groups shared by several commands.

use std::path::PathBuf;

use clap::Args;
use javelin_core::{AcceptsLibraries, DebugInfo, JarOptions, JavacOptions, ScratchDirs};

use crate::sources;

/// Compiler options.
#[derive(Args, Debug, Clone)]
pub struct JavacArgs {
    /// Debug information: "all", "none", or a list such as "lines,source,vars"
    #[arg(long, value_name = "KINDS")]
    pub debug: Option<DebugInfo>,

    /// Language version passed as -source and -target
    #[arg(long, value_name = "VERSION")]
    pub java_version: Option<String>,

    /// Treat compiler warnings as errors
    #[arg(long)]
    pub fail_on_warning: bool,

    /// Suppress compiler warnings
    #[arg(long)]
    pub no_warnings: bool,

    /// javac binary to run
    #[arg(long, value_name = "PATH", default_value = "javac")]
    pub javac: PathBuf,

    /// Pass -verbose to javac
    #[arg(long)]
    pub javac_verbose: bool,

    /// JVM flag for the javac launcher (repeatable)
    #[arg(long = "javac-flag", value_name = "FLAG", allow_hyphen_values = true)]
    pub javac_flags: Vec<String>,
}

impl JavacArgs {
    pub fn options(&self, scratch: &ScratchDirs) -> JavacOptions {
        JavacOptions {
            debug: self.debug.clone().unwrap_or_default(),
            java_version: self.java_version.clone(),
            fail_on_warning: self.fail_on_warning,
            no_warnings: self.no_warnings,
            tool_path: self.javac.clone(),
            verbose: self.javac_verbose,
            launcher_flags: self.javac_flags.clone(),
            scratch: scratch.clone(),
        }
    }
}

/// Archiver options.
#[derive(Args, Debug, Clone)]
pub struct JarArgs {
    /// Main class recorded in the manifest
    #[arg(short, long, value_name = "CLASS")]
    pub entrypoint: Option<String>,

    /// Do not write a manifest
    #[arg(long)]
    pub omit_manifest: bool,

    /// jar binary to run
    #[arg(long, value_name = "PATH", default_value = "jar")]
    pub jar_tool: PathBuf,

    /// Pass v to jar
    #[arg(long)]
    pub jar_verbose: bool,

    /// JVM flag for the jar launcher (repeatable)
    #[arg(long = "jar-flag", value_name = "FLAG", allow_hyphen_values = true)]
    pub jar_flags: Vec<String>,
}

impl JarArgs {
    pub fn options(&self, scratch: &ScratchDirs) -> JarOptions {
        JarOptions {
            omit_manifest: self.omit_manifest,
            entrypoint: self.entrypoint.clone(),
            tool_path: self.jar_tool.clone(),
            verbose: self.jar_verbose,
            launcher_flags: self.jar_flags.clone(),
            scratch: scratch.clone(),
        }
    }
}

/// Classpath options.
#[derive(Args, Debug, Clone, Default)]
pub struct LibraryArgs {
    /// Jar or class directory added to the classpath (repeatable)
    #[arg(short = 'l', long = "lib", value_name = "PATH")]
    pub libs: Vec<PathBuf>,

    /// Directory whose .jar files are added to the classpath (repeatable)
    #[arg(long = "lib-dir", value_name = "DIR")]
    pub lib_dirs: Vec<PathBuf>,
}

impl LibraryArgs {
    /// Attach every library to `stage`, static paths first.
    pub fn attach(&self, stage: &impl AcceptsLibraries) -> javelin_core::Result<()> {
        if !self.libs.is_empty() {
            stage.add_libraries(self.libs.clone())?;
        }
        for dir in &self.lib_dirs {
            stage.add_libraries(sources::library_stream(dir.clone()))?;
        }
        Ok(())
    }
}
