//! Session event logger with in-memory capture
//!
//! The session owns one logger and routes every game event through it.
//! Output can go to stdout, to an in-memory buffer, or both; tests run
//! with `OutputMode::Memory` and assert against the captured entries.

use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::ops::Deref;

/// Verbosity level for game output
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
)]
pub enum VerbosityLevel {
    /// Silent - no output during game
    Silent = 0,
    /// Minimal - only game outcome
    Minimal = 1,
    /// Normal - rounds, turns, and effects (default)
    #[default]
    Normal = 2,
    /// Verbose - all state transitions and dropped input
    Verbose = 3,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Output only to stdout (default)
    #[default]
    Stdout,
    /// Capture only to in-memory buffer (no stdout)
    Memory,
    /// Both stdout and in-memory buffer
    Both,
}

/// A captured log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Verbosity level of this entry
    pub level: VerbosityLevel,
    /// Log message
    pub message: String,
    /// Optional category (e.g., "turn", "effect", "outcome")
    pub category: Option<&'static str>,
}

/// Guard type providing slice access to captured entries
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl<'a> LogGuard<'a> {
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.guard.iter()
    }

    pub fn len(&self) -> usize {
        self.guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Session logger
///
/// Logging takes `&self` (interior mutability) so events can be recorded
/// while the session is otherwise borrowed.
pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,
    buffer: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    /// Create a new logger with default verbosity (Normal)
    pub fn new() -> Self {
        GameLogger {
            verbosity: VerbosityLevel::default(),
            output_mode: OutputMode::default(),
            buffer: RefCell::new(Vec::new()),
        }
    }

    /// Create a logger with specified verbosity
    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output_mode: OutputMode::default(),
            buffer: RefCell::new(Vec::new()),
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    /// Log the game outcome (shown at Minimal and above)
    pub fn log_minimal(&self, message: &str) {
        self.log(VerbosityLevel::Minimal, message, None);
    }

    /// Log rounds, turns, and effects (shown at Normal and above)
    pub fn log_normal(&self, message: &str) {
        self.log(VerbosityLevel::Normal, message, None);
    }

    /// Log state transitions and dropped input (shown at Verbose only)
    pub fn log_verbose(&self, message: &str) {
        self.log(VerbosityLevel::Verbose, message, None);
    }

    /// Log with an explicit category for filtering in tests
    pub fn log_category(&self, level: VerbosityLevel, category: &'static str, message: &str) {
        self.log(level, message, Some(category));
    }

    /// Get access to captured entries
    ///
    /// Returns a guard that derefs to `[LogEntry]`.
    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.buffer.borrow(),
        }
    }

    /// Captured messages joined by newlines (for transcript comparison)
    pub fn transcript(&self) -> String {
        let buffer = self.buffer.borrow();
        let mut transcript = String::new();
        for entry in buffer.iter() {
            transcript.push_str(&entry.message);
            transcript.push('\n');
        }
        transcript
    }

    /// Clear the capture buffer
    pub fn clear_logs(&mut self) {
        self.buffer.borrow_mut().clear();
    }

    fn log(&self, level: VerbosityLevel, message: &str, category: Option<&'static str>) {
        if level > self.verbosity {
            return;
        }
        if matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both) {
            println!("{message}");
        }
        if matches!(self.output_mode, OutputMode::Memory | OutputMode::Both) {
            self.buffer.borrow_mut().push(LogEntry {
                level,
                message: message.to_string(),
                category,
            });
        }
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture_logger(verbosity: VerbosityLevel) -> GameLogger {
        let mut logger = GameLogger::with_verbosity(verbosity);
        logger.set_output_mode(OutputMode::Memory);
        logger
    }

    #[test]
    fn test_verbosity_filters_capture() {
        let logger = capture_logger(VerbosityLevel::Normal);

        logger.log_minimal("outcome");
        logger.log_normal("turn");
        logger.log_verbose("transition");

        let logs = logger.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message, "outcome");
        assert_eq!(logs[1].message, "turn");
    }

    #[test]
    fn test_silent_captures_nothing() {
        let logger = capture_logger(VerbosityLevel::Silent);
        logger.log_minimal("outcome");
        assert!(logger.logs().is_empty());
    }

    #[test]
    fn test_transcript_joins_messages() {
        let logger = capture_logger(VerbosityLevel::Normal);
        logger.log_normal("one");
        logger.log_normal("two");
        assert_eq!(logger.transcript(), "one\ntwo\n");
    }

    #[test]
    fn test_categories_are_recorded() {
        let logger = capture_logger(VerbosityLevel::Normal);
        logger.log_category(VerbosityLevel::Normal, "effect", "P1 attacks");
        assert_eq!(logger.logs()[0].category, Some("effect"));
    }
}
