//! External tool execution.
//!
//! Spawns a resolved [`Tool`], forwards every stdout/stderr line to the
//! stage's logger as it arrives, and reports the exit status.

use std::ffi::OsStr;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::log::ToolLog;
use crate::toolchain::Tool;

/// Outcome of one tool invocation.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured stdout lines.
    pub stdout: Vec<String>,
    /// Captured stderr lines.
    pub stderr: Vec<String>,
}

impl ProcessResult {
    /// Whether the tool exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Turn a non-zero exit into [`Error::ToolFailed`].
    pub fn check(self, tool: &Tool) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::ToolFailed {
                tool: tool.name().to_string(),
                code: self.exit_code,
            })
        }
    }
}

/// Run `tool` with `args` and wait for it to exit.
pub async fn run<I, S>(tool: &Tool, args: I, log: &ToolLog) -> Result<ProcessResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    log.trace(tool.name(), format_args!("executing {}", tool.path().display()));

    let mut child = Command::new(tool.path())
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| Error::Spawn {
            tool: tool.name().to_string(),
            source,
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (stdout, stderr, status) = tokio::join!(
        forward_lines(stdout, tool.name(), log),
        forward_lines(stderr, tool.name(), log),
        child.wait(),
    );
    let status = status?;

    log.trace(tool.name(), format_args!("complete; code: {:?}", status.code()));

    Ok(ProcessResult {
        exit_code: status.code(),
        stdout,
        stderr,
    })
}

/// Forward each line of `reader` to the logger, returning the lines.
///
/// Output is decoded lossily; tools print in the platform encoding.
async fn forward_lines<R>(reader: Option<R>, tool: &str, log: &ToolLog) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Vec::new();
    };

    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                log.tool_line(tool, line);
                lines.push(line.to_string());
            }
            Err(e) => {
                tracing::debug!("{}: output read failed: {}", tool, e);
                break;
            }
        }
    }

    lines
}
