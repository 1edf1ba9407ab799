//! Logging collaborator injected into each stage.
//!
//! Stages never log through a process-wide switch. Each one receives a
//! [`ToolLog`] at construction which decides where tool output goes and
//! whether stage trace messages are produced at all.

use std::fmt;
use std::sync::Arc;

/// How much a stage reports about itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Tool output only.
    #[default]
    Normal,
    /// Tool output plus stage trace messages.
    Trace,
}

/// Destination for log lines.
pub trait LogSink: Send + Sync {
    /// One line of stdout/stderr from an external tool.
    fn tool_line(&self, tool: &str, line: &str);

    /// A stage trace message.
    fn trace(&self, tool: &str, message: &str);
}

/// Sink forwarding everything to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn tool_line(&self, tool: &str, line: &str) {
        tracing::info!("{}: {}", tool, line);
    }

    fn trace(&self, tool: &str, message: &str) {
        tracing::debug!("{}: {}", tool, message);
    }
}

/// Logger handle given to a stage.
#[derive(Clone)]
pub struct ToolLog {
    sink: Arc<dyn LogSink>,
    verbosity: Verbosity,
}

impl ToolLog {
    /// Logger writing to `tracing` at normal verbosity.
    pub fn tracing() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// Logger writing to a custom sink.
    pub fn with_sink(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            verbosity: Verbosity::Normal,
        }
    }

    /// Set the verbosity.
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Current verbosity.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Forward one line of tool output.
    pub fn tool_line(&self, tool: &str, line: &str) {
        self.sink.tool_line(tool, line);
    }

    /// Emit a trace message. Formatting is skipped below `Verbosity::Trace`.
    pub fn trace(&self, tool: &str, message: impl fmt::Display) {
        if self.verbosity >= Verbosity::Trace {
            self.sink.trace(tool, &message.to_string());
        }
    }
}

impl Default for ToolLog {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for ToolLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolLog")
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

/// Sink that records every line, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: std::sync::Mutex<Vec<String>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded lines, each formatted `"<tool>: <line>"`.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl LogSink for MemorySink {
    fn tool_line(&self, tool: &str, line: &str) {
        self.push(format!("{}: {}", tool, line));
    }

    fn trace(&self, tool: &str, message: &str) {
        self.push(format!("{} [trace]: {}", tool, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_suppressed_at_normal() {
        let sink = Arc::new(MemorySink::new());
        let log = ToolLog::with_sink(sink.clone());

        log.trace("javac", "building");
        log.tool_line("javac", "Note: deprecated API");

        assert_eq!(sink.lines(), vec!["javac: Note: deprecated API"]);
    }

    #[test]
    fn test_trace_emitted_at_trace() {
        let sink = Arc::new(MemorySink::new());
        let log = ToolLog::with_sink(sink.clone()).with_verbosity(Verbosity::Trace);

        log.trace("jar", format_args!("{} inputs", 3));

        assert_eq!(sink.lines(), vec!["jar [trace]: 3 inputs"]);
    }
}
