//! JDK tool discovery.
//!
//! Locates the `javac` and `jar` binaries a stage will spawn.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable pointing at a JDK installation.
pub const JAVA_HOME: &str = "JAVA_HOME";

/// A resolved external tool.
#[derive(Debug, Clone)]
pub struct Tool {
    /// Short name used to tag log lines and errors.
    name: &'static str,

    /// Absolute path to the binary.
    path: PathBuf,
}

impl Tool {
    /// Resolve a tool binary.
    ///
    /// `configured` is either a bare program name, looked up on `PATH` and
    /// then under `$JAVA_HOME/bin`, or a path to the binary.
    pub fn resolve(name: &'static str, configured: &Path) -> Result<Self> {
        if let Ok(path) = which::which(configured) {
            return Ok(Self { name, path });
        }

        if is_bare_name(configured) {
            if let Some(path) = Self::find_in_java_home(configured) {
                return Ok(Self { name, path });
            }
        }

        Err(Error::ToolNotFound {
            tool: name.to_string(),
            path: configured.to_path_buf(),
        })
    }

    /// Short tool name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Path to the binary.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look for a program under `$JAVA_HOME/bin`.
    fn find_in_java_home(program: &Path) -> Option<PathBuf> {
        let java_home = env::var_os(JAVA_HOME)?;
        let bin = PathBuf::from(java_home).join("bin");
        which::which_in(program, Some(&bin), &bin).ok()
    }
}

fn is_bare_name(path: &Path) -> bool {
    path.components().count() == 1 && !path.is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool() {
        let err = Tool::resolve("javac", Path::new("javelin-no-such-javac")).unwrap_err();
        match err {
            Error::ToolNotFound { tool, path } => {
                assert_eq!(tool, "javac");
                assert_eq!(path, PathBuf::from("javelin-no-such-javac"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_path() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let script = temp.path().join("fake-jar");
        std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let tool = Tool::resolve("jar", &script).unwrap();
        assert_eq!(tool.name(), "jar");
        assert!(tool.path().ends_with("fake-jar"));
    }

    #[test]
    fn test_bare_name_detection() {
        assert!(is_bare_name(Path::new("javac")));
        assert!(!is_bare_name(Path::new("bin/javac")));
        assert!(!is_bare_name(Path::new("/usr/bin/javac")));
    }
}
