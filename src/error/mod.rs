//! Error types and handling for `perf_notes`.
//!
//! Comparison results are NOT errors: an out-of-band metric value comes
//! back as a [`crate::model::Outcome`]. The variants here cover the cases
//! that genuinely abort an operation: malformed input, broken filter
//! patterns, and failures on the note-append path. Transport failures on
//! the read path never surface as errors at all; the reader degrades to
//! "no baseline".
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for wrapped one-off errors
//! - Provides recovery hints for user-facing errors

use thiserror::Error;

/// Primary error type for `perf_notes` operations.
#[derive(Error, Debug)]
pub enum PerfError {
    // === Input Errors ===
    /// Test name does not match the required shape.
    #[error("invalid test name: '{name}'")]
    InvalidTestName { name: String },

    /// A user-supplied filter pattern failed to compile.
    #[error("invalid regular expression: {0}")]
    Pattern(#[from] regex::Error),

    /// The reporting command was invoked without any commits.
    #[error("no commits given")]
    NoCommits,

    // === Note Store Errors (append path only) ===
    /// A `git notes` invocation on the append path failed.
    #[error("git notes {action} failed for '{commit}': {detail}")]
    NotesCommand {
        action: &'static str,
        commit: String,
        detail: String,
    },

    // === I/O Errors ===
    /// File system or subprocess I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Wrapped errors ===
    /// Wrapped anyhow error for one-off contexts.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PerfError {
    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidTestName { .. } => {
                Some("Test names start with optional digits, then a letter, then [a-zA-Z0-9._-]")
            }
            Self::NoCommits => Some("Pass at least one commit ref, e.g.: pn compare HEAD"),
            Self::NotesCommand { .. } => {
                Some("Check that you are inside a git repository and the commit ref exists")
            }
            _ => None,
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }
}

/// Result type using `PerfError`.
pub type Result<T> = std::result::Result<T, PerfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PerfError::InvalidTestName {
            name: "_bad".to_string(),
        };
        assert_eq!(err.to_string(), "invalid test name: '_bad'");
    }

    #[test]
    fn test_notes_command_display() {
        let err = PerfError::NotesCommand {
            action: "append",
            commit: "HEAD".to_string(),
            detail: "exit status 128".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "git notes append failed for 'HEAD': exit status 128"
        );
    }

    #[test]
    fn test_suggestion() {
        assert!(PerfError::NoCommits.suggestion().is_some());
        let io = PerfError::Io(std::io::Error::other("boom"));
        assert!(io.suggestion().is_none());
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(PerfError::NoCommits.exit_code(), 1);
    }
}
