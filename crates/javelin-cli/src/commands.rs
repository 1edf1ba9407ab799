//! Command implementations for the javelin CLI.

use std::path::{Path, PathBuf};
use std::time::Instant;

use javelin_core::{
    Artifact, CompileOptions, CompileStage, JarStage, JavacStage, ScratchDirs, Stage, ToolLog,
    walk_files,
};

use crate::args::{JarArgs, JavacArgs, LibraryArgs};
use crate::{colors, dest, sources};

/// Result type for CLI operations.
pub type CliResult = anyhow::Result<()>;

/// Settings shared by every command.
pub struct Session {
    pub log: ToolLog,
    pub scratch: ScratchDirs,
}

/// Compile a source tree and package it into a jar.
pub async fn build(
    session: &Session,
    source_root: &Path,
    jar_name: &str,
    output: &Path,
    libs: &LibraryArgs,
    javac: &JavacArgs,
    jar: &JarArgs,
) -> CliResult {
    let start = Instant::now();
    header("Building", jar_name);

    let inputs = find_sources(source_root)?;
    let options = CompileOptions {
        javac: javac.options(&session.scratch),
        jar: jar.options(&session.scratch),
    };
    let stage = CompileStage::new(jar_name, options, session.log.clone())?;
    libs.attach(&stage)?;

    step(&format!("Compiling and packaging {} sources", inputs.len()));
    let outputs = stage.run(inputs).await?;
    ok();

    let written = dest::write_all(&outputs, output).await?;
    summary(&written, output, start);
    Ok(())
}

/// Compile a source tree into class files.
pub async fn compile(
    session: &Session,
    source_root: &Path,
    output: &Path,
    libs: &LibraryArgs,
    javac: &JavacArgs,
) -> CliResult {
    let start = Instant::now();
    header("Compiling", &source_root.display().to_string());

    let inputs = find_sources(source_root)?;
    let stage = JavacStage::new(javac.options(&session.scratch), session.log.clone())?;
    libs.attach(&stage)?;

    step(&format!("Compiling {} sources", inputs.len()));
    let outputs = stage.run(inputs).await?;
    ok();

    let written = dest::write_all(&outputs, output).await?;
    summary(&written, output, start);
    Ok(())
}

/// Package class directories into a jar.
pub async fn package(
    session: &Session,
    class_dirs: &[PathBuf],
    jar_name: &str,
    output: &Path,
    jar: &JarArgs,
) -> CliResult {
    let start = Instant::now();
    header("Packaging", jar_name);

    let mut inputs: Vec<Artifact> = Vec::new();
    for dir in class_dirs {
        if !dir.is_dir() {
            anyhow::bail!("Class directory not found: {}", dir.display());
        }
        inputs.extend(walk_files(&dir.canonicalize()?)?);
    }
    if inputs.is_empty() {
        anyhow::bail!("Nothing to package: the class directories are empty");
    }

    let stage = JarStage::new(jar_name, jar.options(&session.scratch), session.log.clone())?;

    step(&format!("Packaging {} files", inputs.len()));
    let outputs = stage.run(inputs).await?;
    ok();

    let written = dest::write_all(&outputs, output).await?;
    summary(&written, output, start);
    Ok(())
}

fn find_sources(root: &Path) -> anyhow::Result<Vec<Artifact>> {
    let inputs = sources::discover(root, "java")?;
    if inputs.is_empty() {
        anyhow::bail!("No .java files found under {}", root.display());
    }
    Ok(inputs)
}

fn header(action: &str, target: &str) {
    println!(
        "\n{}javelin{} - {} {}{}{}\n",
        colors::BOLD,
        colors::RESET,
        action,
        colors::CYAN,
        target,
        colors::RESET
    );
}

fn step(message: &str) {
    print!("{}  ◆ {}{} ... ", colors::BLUE, message, colors::RESET);
    colors::flush_stdout();
}

fn ok() {
    println!("{}✓{}", colors::GREEN, colors::RESET);
}

fn summary(written: &[PathBuf], output: &Path, start: Instant) {
    println!();
    match written {
        [single] => println!("{}Built:{} {}", colors::GREEN, colors::RESET, single.display()),
        _ => println!(
            "{}Wrote:{} {} files to {}",
            colors::GREEN,
            colors::RESET,
            written.len(),
            output.display()
        ),
    }
    println!(
        "{}Time:{} {:.2}s",
        colors::DIM,
        colors::RESET,
        start.elapsed().as_secs_f64()
    );
}
