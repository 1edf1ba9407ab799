//! Packaging stage configuration.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths::ScratchDirs;

/// Configuration for [`JarStage`](super::JarStage).
#[derive(Debug, Clone)]
pub struct JarOptions {
    /// Do not write a manifest (`M`).
    pub omit_manifest: bool,

    /// Main class recorded in the manifest (`e`).
    pub entrypoint: Option<String>,

    /// jar binary, a program name on `PATH` or a path.
    pub tool_path: PathBuf,

    /// Verbose archiver output (`v`).
    pub verbose: bool,

    /// Flags for the JVM running jar, each passed as `-J<flag>`.
    pub launcher_flags: Vec<String>,

    /// Where the archive directory is created.
    pub scratch: ScratchDirs,
}

impl Default for JarOptions {
    fn default() -> Self {
        Self {
            omit_manifest: false,
            entrypoint: None,
            tool_path: PathBuf::from("jar"),
            verbose: false,
            launcher_flags: Vec::new(),
            scratch: ScratchDirs::system(),
        }
    }
}

impl JarOptions {
    /// Set the main class.
    pub fn with_entrypoint(mut self, class: impl Into<String>) -> Self {
        self.entrypoint = Some(class.into());
        self
    }

    /// Set the jar binary.
    pub fn with_tool_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tool_path = path.into();
        self
    }

    /// Add a JVM flag for the jar launcher.
    pub fn with_launcher_flag(mut self, flag: impl Into<String>) -> Self {
        self.launcher_flags.push(flag.into());
        self
    }

    /// Set the scratch root.
    pub fn with_scratch(mut self, scratch: ScratchDirs) -> Self {
        self.scratch = scratch;
        self
    }

    /// The combined mode flags, e.g. `cfvMe`.
    pub fn mode_flags(&self) -> String {
        let mut flags = String::from("cf");
        if self.verbose {
            flags.push('v');
        }
        if self.omit_manifest {
            flags.push('M');
        }
        if self.entrypoint.is_some() {
            flags.push('e');
        }
        flags
    }

    /// Check for invalid values and contradictory combinations.
    pub fn validate(&self) -> Result<()> {
        if let Some(entrypoint) = &self.entrypoint {
            if entrypoint.is_empty() || entrypoint.chars().any(char::is_whitespace) {
                return Err(Error::InvalidOptions(format!(
                    "invalid entrypoint `{}`",
                    entrypoint
                )));
            }
            if self.omit_manifest {
                return Err(Error::InvalidOptions(
                    "an entrypoint needs a manifest; drop omit_manifest".to_string(),
                ));
            }
        }

        if self.tool_path.as_os_str().is_empty() {
            return Err(Error::InvalidOptions("empty jar path".to_string()));
        }

        if self.launcher_flags.iter().any(|f| f.is_empty()) {
            return Err(Error::InvalidOptions("empty launcher flag".to_string()));
        }

        Ok(())
    }
}

/// Check that `name` is a plain file name.
pub(crate) fn validate_jar_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let plain = matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
        && !name.contains(['/', '\\']);

    if plain {
        Ok(())
    } else {
        Err(Error::InvalidOptions(format!(
            "jar name `{}` must be a plain file name",
            name
        )))
    }
}
