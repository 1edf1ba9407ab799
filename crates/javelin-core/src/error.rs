//! Error types for javelin-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for javelin-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in javelin-core.
///
/// A stage reports any of these as a single failure item on its output
/// stream, after which the stream ends.
#[derive(Debug, Error)]
pub enum Error {
    /// Stage options failed validation.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Tool binary could not be located.
    #[error("{tool} not found at {}", path.display())]
    ToolNotFound { tool: String, path: PathBuf },

    /// Tool process failed to start.
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Tool process exited unsuccessfully.
    #[error("{tool} failed{}", code.map(|c| format!(" with exit code {}", c)).unwrap_or_else(|| " (terminated by signal)".to_string()))]
    ToolFailed { tool: String, code: Option<i32> },

    /// An attached library source failed before ending.
    #[error("library source failed: {0}")]
    DependencyStream(Box<Error>),

    /// A library was attached after the batch already started.
    #[error("library attached after compilation started")]
    LateAttachment,

    /// Artifact path does not live under its base.
    #[error("{} is not under base {}", path.display(), base.display())]
    OutsideBase { path: PathBuf, base: PathBuf },

    /// Relative artifact path is absolute or escapes its base.
    #[error("invalid relative path: {}", .0.display())]
    InvalidRelative(PathBuf),

    /// Two artifacts map to the same archive entry.
    #[error("duplicate archive entry: {}", .0.display())]
    DuplicateEntry(PathBuf),

    /// The other end of an artifact channel was dropped.
    #[error("artifact stream closed")]
    StreamClosed,

    /// A stage task panicked or was cancelled.
    #[error("stage task failed: {0}")]
    StageTask(String),

    /// Directory walk error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Render the error with a recovery hint, when one applies.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Self::ToolNotFound { tool, .. } | Self::Spawn { tool, .. } => Some(format!(
                "install a JDK and make sure `{}` is on PATH, or pass an explicit tool path",
                tool
            )),
            Self::ToolFailed { tool, .. } => {
                Some(format!("see the `{}:` lines above for the tool's diagnostics", tool))
            }
            Self::LateAttachment => {
                Some("attach every library before closing the stage input".to_string())
            }
            Self::DuplicateEntry(_) => {
                Some("two input roots provide the same relative path".to_string())
            }
            Self::DependencyStream(inner) => {
                return format!("{}\n  caused by: {}", self, inner.with_hint());
            }
            _ => None,
        };

        match hint {
            Some(hint) => format!("{}\n  hint: {}", self, hint),
            None => self.to_string(),
        }
    }

    /// Whether this error came from the external tool itself.
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            Self::ToolFailed { .. } | Self::Spawn { .. } | Self::ToolNotFound { .. }
        )
    }
}
