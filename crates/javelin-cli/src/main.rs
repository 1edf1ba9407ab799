//! javelin CLI - javac and jar build pipeline.

mod args;
mod colors;
mod commands;
mod dest;
mod sources;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use javelin_core::{ScratchDirs, ToolLog, Verbosity};

use args::{JarArgs, JavacArgs, LibraryArgs};
use commands::Session;

#[derive(Parser)]
#[command(name = "javelin")]
#[command(about = "Compile Java sources and package them into jars")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory for temporary files and intermediate outputs
    #[arg(long, global = true, value_name = "DIR")]
    scratch: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source tree and package the classes into a jar
    Build {
        /// Root directory scanned for .java files
        sources: PathBuf,

        /// File name of the jar to create
        #[arg(long, value_name = "NAME")]
        jar: String,

        /// Output directory
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        #[command(flatten)]
        libs: LibraryArgs,

        #[command(flatten)]
        javac: JavacArgs,

        #[command(flatten)]
        jar_args: JarArgs,
    },

    /// Compile a source tree into class files
    Compile {
        /// Root directory scanned for .java files
        sources: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        #[command(flatten)]
        libs: LibraryArgs,

        #[command(flatten)]
        javac: JavacArgs,
    },

    /// Package class directories into a jar
    Package {
        /// Directories of compiled classes
        #[arg(required = true)]
        classes: Vec<PathBuf>,

        /// File name of the jar to create
        #[arg(long, value_name = "NAME")]
        jar: String,

        /// Output directory
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        #[command(flatten)]
        jar_args: JarArgs,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; tool output is logged at INFO
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let verbosity = if cli.verbose {
        Verbosity::Trace
    } else {
        Verbosity::Normal
    };
    let session = Session {
        log: ToolLog::tracing().with_verbosity(verbosity),
        scratch: cli.scratch.map(ScratchDirs::under).unwrap_or_default(),
    };

    // Helper to format javelin-core errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(core_err) = err.downcast_ref::<javelin_core::Error>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else {
            err
        }
    };

    match cli.command {
        Commands::Build {
            sources,
            jar,
            output,
            libs,
            javac,
            jar_args,
        } => {
            commands::build(&session, &sources, &jar, &output, &libs, &javac, &jar_args)
                .await
                .map_err(format_error)?;
        }

        Commands::Compile {
            sources,
            output,
            libs,
            javac,
        } => {
            commands::compile(&session, &sources, &output, &libs, &javac)
                .await
                .map_err(format_error)?;
        }

        Commands::Package {
            classes,
            jar,
            output,
            jar_args,
        } => {
            commands::package(&session, &classes, &jar, &output, &jar_args)
                .await
                .map_err(format_error)?;
        }
    }

    Ok(())
}
