//! Fake JDK tools for integration tests.
//!
//! The fake `javac` reads its two argument files, records them, and writes
//! one empty `pkg/<Name>.class` per source into the `-d` directory. A source
//! containing `BROKEN` makes it exit 1. The fake `jar` writes the entry
//! names it was given into the archive file, one per line.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use javelin_core::{Artifact, JarOptions, JavacOptions, ScratchDirs};
use tempfile::TempDir;

const FAKE_JAVAC: &str = r#"#!/bin/sh
args="${1#@}"
sources="${2#@}"
cp "$args" "@CAPTURE@/javac-args.txt"
cp "$sources" "@CAPTURE@/javac-sources.txt"
echo invoked >> "@CAPTURE@/javac-invocations"
out=$(sed -n 's/^-d "\(.*\)"$/\1/p' "$args")
status=0
while IFS= read -r line; do
  src=$(printf '%s' "$line" | sed 's/^"\(.*\)"$/\1/')
  if grep -q BROKEN "$src"; then
    echo "$src:1: error: broken source" >&2
    status=1
    continue
  fi
  name=$(basename "$src" .java)
  mkdir -p "$out/pkg"
  : > "$out/pkg/$name.class"
done < "$sources"
echo "note: compiled sources"
exit $status
"#;

const FAKE_JAR: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "@CAPTURE@/jar-args.txt"
while [ $# -gt 0 ]; do
  case "$1" in
    -J*) shift ;;
    *) break ;;
  esac
done
mode="$1"
jar="$2"
shift 2
case "$mode" in
  *e*) shift ;;
esac
: > "$jar"
while [ $# -gt 0 ]; do
  if [ "$1" = "-C" ]; then
    printf '%s\n' "$3" >> "$jar"
    shift 3
  else
    printf '%s\n' "$1" >> "$jar"
    shift
  fi
done
echo "added manifest"
"#;

/// A temp directory holding fake tools, sources and scratch space.
pub struct FakeJdk {
    dir: TempDir,
    pub javac: PathBuf,
    pub jar: PathBuf,
}

impl FakeJdk {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let capture = dir.path().join("capture");
        fs::create_dir_all(&capture).unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();

        let capture_dir = capture.to_string_lossy();
        let javac = write_script(
            dir.path(),
            "javac",
            &FAKE_JAVAC.replace("@CAPTURE@", &capture_dir),
        );
        let jar = write_script(dir.path(), "jar", &FAKE_JAR.replace("@CAPTURE@", &capture_dir));

        Self { dir, javac, jar }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn scratch(&self) -> ScratchDirs {
        ScratchDirs::under(self.dir.path().join("scratch"))
    }

    pub fn javac_options(&self) -> JavacOptions {
        JavacOptions::default()
            .with_tool_path(&self.javac)
            .with_scratch(self.scratch())
    }

    pub fn jar_options(&self) -> JarOptions {
        JarOptions::default()
            .with_tool_path(&self.jar)
            .with_scratch(self.scratch())
    }

    /// A tool that prints to stderr and exits with `code`.
    pub fn failing_tool(&self, name: &str, code: i32) -> PathBuf {
        write_script(
            self.dir.path(),
            name,
            &format!("#!/bin/sh\necho \"error: {} exploded\" >&2\nexit {}\n", name, code),
        )
    }

    /// Write a source file under `src/` and return it as an artifact.
    pub fn source(&self, name: &str, body: &str) -> Artifact {
        let base = self.dir.path().join("src");
        let path = base.join(name);
        fs::write(&path, body).unwrap();
        Artifact::new(base, path).unwrap()
    }

    /// Contents of a captured file, if the tool wrote it.
    pub fn captured(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.dir.path().join("capture").join(name)).ok()
    }

    /// Captured argument lines starting with `prefix`.
    pub fn captured_lines(&self, name: &str, prefix: &str) -> Vec<String> {
        self.captured(name)
            .unwrap_or_default()
            .lines()
            .filter(|line| line.starts_with(prefix))
            .map(str::to_string)
            .collect()
    }

    pub fn javac_invocations(&self) -> usize {
        self.captured("javac-invocations")
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Entry names listed in a fake archive.
pub fn archive_entries(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
