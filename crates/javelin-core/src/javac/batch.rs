//! Batch requests and javac argument files.
//!
//! javac reads `@file` arguments one token per line. Source lists easily
//! exceed command-line length limits, so both the flags and the sources go
//! through argument files:
//!
//! ```text
//! javac @javelin-javac-args-XXXX.txt @javelin-javac-sources-XXXX.txt
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::Result;
use crate::paths::ScratchDirs;

use super::options::JavacOptions;

/// Everything one javac invocation needs.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Source files, in arrival order.
    pub sources: Vec<PathBuf>,

    /// Library paths, in classpath order.
    pub classpath: Vec<PathBuf>,

    /// Directory javac writes class files into.
    pub output_dir: PathBuf,
}

impl BatchRequest {
    /// Lines of the argument file.
    pub fn argument_lines(&self, options: &JavacOptions) -> Vec<String> {
        let mut lines = vec![format!("-d {}", quote(&self.output_dir))];

        for flag in &options.launcher_flags {
            lines.push(format!("-J{}", flag));
        }

        lines.push(options.debug.flag());

        if options.verbose {
            lines.push("-verbose".to_string());
        }
        if options.no_warnings {
            lines.push("-nowarn".to_string());
        }
        if options.fail_on_warning {
            lines.push("-Werror".to_string());
        }

        if let Some(version) = &options.java_version {
            lines.push(format!("-source {}", version));
            lines.push(format!("-target {}", version));
        }

        for library in &self.classpath {
            lines.push(format!("-classpath {}", quote(library)));
        }

        lines
    }

    /// Lines of the source file.
    pub fn source_lines(&self) -> Vec<String> {
        self.sources.iter().map(|source| quote(source)).collect()
    }

    /// Write both argument files into scratch space.
    pub(crate) async fn write_at_files(
        &self,
        options: &JavacOptions,
        scratch: &ScratchDirs,
    ) -> Result<AtFiles> {
        let args = scratch.create_file("javac-args")?;
        tokio::fs::write(args.path(), join_lines(&self.argument_lines(options))).await?;

        let sources = scratch.create_file("javac-sources")?;
        tokio::fs::write(sources.path(), join_lines(&self.source_lines())).await?;

        Ok(AtFiles { args, sources })
    }
}

/// The two argument files of an invocation. Deleted on drop.
#[derive(Debug)]
pub(crate) struct AtFiles {
    args: NamedTempFile,
    sources: NamedTempFile,
}

impl AtFiles {
    /// Command-line arguments referencing the files.
    pub(crate) fn arguments(&self) -> [OsString; 2] {
        [at_argument(self.args.path()), at_argument(self.sources.path())]
    }

    #[cfg(test)]
    fn args_path(&self) -> &Path {
        self.args.path()
    }
}

fn at_argument(path: &Path) -> OsString {
    let mut arg = OsString::from("@");
    arg.push(path);
    arg
}

/// Double-quote a path for an argument file, escaping `\` and `"`.
pub fn quote(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for c in raw.chars() {
        if c == '\\' || c == '"' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn join_lines(lines: &[String]) -> String {
    let mut content = lines.join("\n");
    content.push('\n');
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::javac::options::DebugInfo;

    fn request() -> BatchRequest {
        BatchRequest {
            sources: vec![
                PathBuf::from("/src/pkg/Main.java"),
                PathBuf::from("/src/pkg/Util.java"),
            ],
            classpath: vec![PathBuf::from("/libs/b.jar"), PathBuf::from("/libs/a.jar")],
            output_dir: PathBuf::from("/tmp/classes"),
        }
    }

    #[test]
    fn test_default_argument_lines() {
        let lines = request().argument_lines(&JavacOptions::default());
        assert_eq!(
            lines,
            vec![
                "-d \"/tmp/classes\"",
                "-g:lines,source",
                "-classpath \"/libs/b.jar\"",
                "-classpath \"/libs/a.jar\"",
            ]
        );
    }

    #[test]
    fn test_full_argument_lines() {
        let options = JavacOptions {
            debug: DebugInfo::All,
            java_version: Some("1.8".to_string()),
            fail_on_warning: true,
            verbose: true,
            launcher_flags: vec!["-Xmx1g".to_string(), "-Dfile.encoding=UTF-8".to_string()],
            ..Default::default()
        };
        let mut batch = request();
        batch.classpath.clear();

        assert_eq!(
            batch.argument_lines(&options),
            vec![
                "-d \"/tmp/classes\"",
                "-J-Xmx1g",
                "-J-Dfile.encoding=UTF-8",
                "-g",
                "-verbose",
                "-Werror",
                "-source 1.8",
                "-target 1.8",
            ]
        );
    }

    #[test]
    fn test_nowarn_line() {
        let options = JavacOptions {
            no_warnings: true,
            ..Default::default()
        };
        assert!(request().argument_lines(&options).contains(&"-nowarn".to_string()));
    }

    #[test]
    fn test_source_lines_quoted() {
        assert_eq!(
            request().source_lines(),
            vec!["\"/src/pkg/Main.java\"", "\"/src/pkg/Util.java\""]
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(Path::new("C:\\src\\A.java")), "\"C:\\\\src\\\\A.java\"");
        assert_eq!(quote(Path::new("/odd\"name")), "\"/odd\\\"name\"");
    }

    #[tokio::test]
    async fn test_at_files_written_and_removed() {
        let temp = tempfile::TempDir::new().unwrap();
        let scratch = ScratchDirs::under(temp.path());
        let options = JavacOptions::default();

        let files = request().write_at_files(&options, &scratch).await.unwrap();
        let args_path = files.args_path().to_path_buf();
        let content = std::fs::read_to_string(&args_path).unwrap();
        assert!(content.starts_with("-d \"/tmp/classes\"\n"));
        assert!(content.ends_with("-classpath \"/libs/a.jar\"\n"));

        let [args_arg, sources_arg] = files.arguments();
        assert!(args_arg.to_string_lossy().starts_with('@'));
        assert!(sources_arg.to_string_lossy().contains("javelin-javac-sources-"));

        drop(files);
        assert!(!args_path.exists());
    }
}
