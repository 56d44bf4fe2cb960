//! Unified error type for git data collection and queries.

use thiserror::Error;

/// All errors that can occur while collecting or querying repository data.
#[derive(Error, Debug)]
pub enum GitViewError {
    /// No `.git` marker found walking up from the start directory. Fatal at
    /// startup; the process exits with a clear message.
    #[error("Not a git repository (or any parent up to filesystem root): {0}")]
    NotAGitRepository(String),

    /// A git subcommand exited non-zero. Surfaced as a query-level failure,
    /// never crashes the process.
    #[error("git {subcommand} failed (exit {code}): {stderr}")]
    GitCommandFailed {
        subcommand: String,
        code: i32,
        stderr: String,
    },

    /// Subcommand not in the read-only allowlist. Rejected before any
    /// process is spawned.
    #[error("git subcommand not allowed: {0}")]
    UnsupportedCommand(String),

    /// Malformed but non-empty output for one record.
    #[error("Failed to parse git output: {0}")]
    ParseError(String),

    /// The queried path does not exist at the resolved ref.
    #[error("Path not found at the given ref: {0}")]
    PathNotFound(String),

    /// The queried ref cannot be resolved to a commit.
    #[error("Unknown ref: {0}")]
    RefNotFound(String),

    /// The path exists at the ref but is binary — no per-line attribution.
    #[error("Blame unavailable for binary file: {0}")]
    BlameUnavailable(String),

    /// Subprocess exceeded its execution bound. Retryable.
    #[error("git {subcommand} timed out after {secs}s")]
    Timeout { subcommand: String, secs: u64 },

    /// A refresh was requested while another one was still running.
    #[error("A snapshot refresh is already in progress")]
    RefreshInProgress,

    /// I/O error (spawning git, reading the repository on disk)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_repo_display() {
        let err = GitViewError::NotAGitRepository("/tmp/nowhere".to_string());
        assert!(err.to_string().contains("/tmp/nowhere"));
        assert!(err.to_string().contains("Not a git repository"));
    }

    #[test]
    fn test_command_failed_display() {
        let err = GitViewError::GitCommandFailed {
            subcommand: "log".to_string(),
            code: 128,
            stderr: "fatal: bad revision".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("git log"));
        assert!(msg.contains("128"));
        assert!(msg.contains("bad revision"));
    }

    #[test]
    fn test_unsupported_command_display() {
        let err = GitViewError::UnsupportedCommand("push".to_string());
        assert!(err.to_string().contains("push"));
        assert!(err.to_string().contains("not allowed"));
    }

    #[test]
    fn test_timeout_display() {
        let err = GitViewError::Timeout { subcommand: "blame".to_string(), secs: 30 };
        assert!(err.to_string().contains("blame"));
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: GitViewError = io_err.into();
        assert!(matches!(err, GitViewError::Io(_)));
    }
}
