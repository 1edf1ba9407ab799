//! Compilation stage configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::paths::ScratchDirs;

/// One kind of debugging information javac can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DebugKind {
    /// Line number tables.
    Lines,
    /// Source file names.
    Source,
    /// Local variable tables.
    Vars,
}

impl DebugKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Lines => "lines",
            Self::Source => "source",
            Self::Vars => "vars",
        }
    }
}

impl FromStr for DebugKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "lines" => Ok(Self::Lines),
            "source" => Ok(Self::Source),
            "var" | "vars" => Ok(Self::Vars),
            other => Err(Error::InvalidOptions(format!(
                "unknown debug information kind `{}` (expected lines, source or vars)",
                other
            ))),
        }
    }
}

/// Debugging information to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugInfo {
    /// Everything (`-g`).
    All,
    /// Nothing (`-g:none`).
    None,
    /// A subset (`-g:lines,source`). An empty subset means none.
    Only(Vec<DebugKind>),
}

impl DebugInfo {
    /// The javac flag for this setting.
    pub fn flag(&self) -> String {
        match self {
            Self::All => "-g".to_string(),
            Self::None => "-g:none".to_string(),
            Self::Only(kinds) if kinds.is_empty() => "-g:none".to_string(),
            Self::Only(kinds) => {
                let kinds: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
                format!("-g:{}", kinds.join(","))
            }
        }
    }
}

impl Default for DebugInfo {
    fn default() -> Self {
        Self::Only(vec![DebugKind::Lines, DebugKind::Source])
    }
}

impl FromStr for DebugInfo {
    type Err = Error;

    /// Accepts `*` or `all`, `none` (or an empty string), or a
    /// comma-separated list of kinds.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "*" | "all" => Ok(Self::All),
            "" | "none" => Ok(Self::None),
            list => {
                let mut kinds = Vec::new();
                for kind in list.split(',') {
                    let kind: DebugKind = kind.parse()?;
                    if !kinds.contains(&kind) {
                        kinds.push(kind);
                    }
                }
                Ok(Self::Only(kinds))
            }
        }
    }
}

impl fmt::Display for DebugInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flag())
    }
}

/// Configuration for [`JavacStage`](super::JavacStage).
#[derive(Debug, Clone)]
pub struct JavacOptions {
    /// Debugging information to generate.
    pub debug: DebugInfo,

    /// Language version passed as `-source` and `-target`.
    /// When `None`, javac's own default applies.
    pub java_version: Option<String>,

    /// Treat warnings as errors (`-Werror`).
    pub fail_on_warning: bool,

    /// Suppress warnings (`-nowarn`).
    pub no_warnings: bool,

    /// javac binary, a program name on `PATH` or a path.
    pub tool_path: PathBuf,

    /// Verbose compiler output (`-verbose`).
    pub verbose: bool,

    /// Flags for the JVM running javac, each passed as `-J<flag>`.
    pub launcher_flags: Vec<String>,

    /// Where argument files and the class output directory are created.
    pub scratch: ScratchDirs,
}

impl Default for JavacOptions {
    fn default() -> Self {
        Self {
            debug: DebugInfo::default(),
            java_version: None,
            fail_on_warning: false,
            no_warnings: false,
            tool_path: PathBuf::from("javac"),
            verbose: false,
            launcher_flags: Vec::new(),
            scratch: ScratchDirs::system(),
        }
    }
}

impl JavacOptions {
    /// Set the debugging information.
    pub fn with_debug(mut self, debug: DebugInfo) -> Self {
        self.debug = debug;
        self
    }

    /// Set the source and target language version.
    pub fn with_java_version(mut self, version: impl Into<String>) -> Self {
        self.java_version = Some(version.into());
        self
    }

    /// Set the javac binary.
    pub fn with_tool_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tool_path = path.into();
        self
    }

    /// Add a JVM flag for the javac launcher.
    pub fn with_launcher_flag(mut self, flag: impl Into<String>) -> Self {
        self.launcher_flags.push(flag.into());
        self
    }

    /// Set the scratch root.
    pub fn with_scratch(mut self, scratch: ScratchDirs) -> Self {
        self.scratch = scratch;
        self
    }

    /// Check for invalid values and contradictory combinations.
    pub fn validate(&self) -> Result<()> {
        if let Some(version) = &self.java_version {
            if version.is_empty() || version.chars().any(char::is_whitespace) {
                return Err(Error::InvalidOptions(format!(
                    "invalid java version `{}`",
                    version
                )));
            }
        }

        if self.no_warnings && self.fail_on_warning {
            return Err(Error::InvalidOptions(
                "warnings cannot be both suppressed and treated as errors".to_string(),
            ));
        }

        if self.tool_path.as_os_str().is_empty() {
            return Err(Error::InvalidOptions("empty javac path".to_string()));
        }

        if let Some(flag) = self
            .launcher_flags
            .iter()
            .find(|f| f.is_empty() || f.contains(['\n', '\r']))
        {
            return Err(Error::InvalidOptions(format!(
                "invalid launcher flag `{}`",
                flag.escape_debug()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = JavacOptions::default();
        assert_eq!(options.debug.flag(), "-g:lines,source");
        assert_eq!(options.tool_path, PathBuf::from("javac"));
        assert!(options.java_version.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_debug_parsing() {
        assert_eq!("*".parse::<DebugInfo>().unwrap(), DebugInfo::All);
        assert_eq!("all".parse::<DebugInfo>().unwrap().flag(), "-g");
        assert_eq!("none".parse::<DebugInfo>().unwrap().flag(), "-g:none");
        assert_eq!("".parse::<DebugInfo>().unwrap().flag(), "-g:none");
        assert_eq!(
            "lines, var,lines".parse::<DebugInfo>().unwrap().flag(),
            "-g:lines,vars"
        );
        assert!("lines,bogus".parse::<DebugInfo>().is_err());
    }

    #[test]
    fn test_empty_subset_is_none() {
        assert_eq!(DebugInfo::Only(Vec::new()).flag(), "-g:none");
    }

    #[test]
    fn test_contradictory_warnings_rejected() {
        let options = JavacOptions {
            no_warnings: true,
            fail_on_warning: true,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(JavacOptions::default().with_java_version("1 .8").validate().is_err());
        assert!(JavacOptions::default().with_java_version("").validate().is_err());
        assert!(JavacOptions::default().with_launcher_flag("").validate().is_err());
        assert!(JavacOptions::default().with_tool_path("").validate().is_err());
        assert!(JavacOptions::default()
            .with_java_version("17")
            .with_launcher_flag("-Xmx512m")
            .validate()
            .is_ok());
    }
}
