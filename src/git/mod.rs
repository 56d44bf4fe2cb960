//! Git subprocess layer — allowlisted read-only invocations of the `git` CLI.
//!
//! Every piece of repository data flows through [`run`]: a closed enum of
//! permitted subcommands, discrete argument tokens (never a shell string), a
//! bounded execution timeout, and permissive UTF-8 decoding of the output.
//! The parsers in the submodules are pure functions over that text.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::GitViewError;

pub mod activity;
pub mod blame;
pub mod diff;
pub mod log;
pub mod meta;

/// Default per-invocation execution bound. Long enough for a blame on a big
/// file, short enough that a hung subprocess cannot wedge the server.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ─── Allowlist ───────────────────────────────────────────────────────

/// Closed enumeration of the read-only subcommands this tool may run.
///
/// Anything else — in particular every write operation — is rejected before
/// a process is spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitCommand {
    Log,
    Show,
    Diff,
    Status,
    Blame,
    Stash,
    Branch,
    Tag,
    ForEachRef,
    Shortlog,
    LsTree,
    LsFiles,
    Remote,
    RevList,
    RevParse,
    Describe,
}

impl GitCommand {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GitCommand::Log => "log",
            GitCommand::Show => "show",
            GitCommand::Diff => "diff",
            GitCommand::Status => "status",
            GitCommand::Blame => "blame",
            GitCommand::Stash => "stash",
            GitCommand::Branch => "branch",
            GitCommand::Tag => "tag",
            GitCommand::ForEachRef => "for-each-ref",
            GitCommand::Shortlog => "shortlog",
            GitCommand::LsTree => "ls-tree",
            GitCommand::LsFiles => "ls-files",
            GitCommand::Remote => "remote",
            GitCommand::RevList => "rev-list",
            GitCommand::RevParse => "rev-parse",
            GitCommand::Describe => "describe",
        }
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GitCommand {
    type Err = GitViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(GitCommand::Log),
            "show" => Ok(GitCommand::Show),
            "diff" => Ok(GitCommand::Diff),
            "status" => Ok(GitCommand::Status),
            "blame" => Ok(GitCommand::Blame),
            "stash" => Ok(GitCommand::Stash),
            "branch" => Ok(GitCommand::Branch),
            "tag" => Ok(GitCommand::Tag),
            "for-each-ref" => Ok(GitCommand::ForEachRef),
            "shortlog" => Ok(GitCommand::Shortlog),
            "ls-tree" => Ok(GitCommand::LsTree),
            "ls-files" => Ok(GitCommand::LsFiles),
            "remote" => Ok(GitCommand::Remote),
            "rev-list" => Ok(GitCommand::RevList),
            "rev-parse" => Ok(GitCommand::RevParse),
            "describe" => Ok(GitCommand::Describe),
            other => Err(GitViewError::UnsupportedCommand(other.to_string())),
        }
    }
}

// ─── Runner ──────────────────────────────────────────────────────────

/// Run one allowlisted git subcommand with the default timeout.
pub async fn run<S: AsRef<str>>(
    repo: &Path,
    cmd: GitCommand,
    args: &[S],
) -> Result<String, GitViewError> {
    run_with_timeout(repo, cmd, args, DEFAULT_TIMEOUT_SECS).await
}

/// Run one allowlisted git subcommand and return its stdout, lossily decoded.
///
/// Arguments are passed as discrete tokens — no shell is involved, so
/// metacharacters in paths or messages cannot inject anything. The only
/// write-capable flag reachable through read-only subcommands is `--output`,
/// which is rejected here.
pub async fn run_with_timeout<S: AsRef<str>>(
    repo: &Path,
    cmd: GitCommand,
    args: &[S],
    timeout_secs: u64,
) -> Result<String, GitViewError> {
    for arg in args {
        if arg.as_ref().starts_with("--output") {
            return Err(GitViewError::UnsupportedCommand(format!(
                "{} {}",
                cmd,
                arg.as_ref()
            )));
        }
    }

    let mut command = Command::new("git");
    command
        .arg(cmd.as_str())
        .args(args.iter().map(AsRef::as_ref))
        .current_dir(repo)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(subcommand = %cmd, args = args.len(), "spawning git");

    let output = tokio::time::timeout(Duration::from_secs(timeout_secs), command.output())
        .await
        .map_err(|_| GitViewError::Timeout {
            subcommand: cmd.as_str().to_string(),
            secs: timeout_secs,
        })??;

    if !output.status.success() {
        return Err(GitViewError::GitCommandFailed {
            subcommand: cmd.as_str().to_string(),
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    // Permissive decode: invalid byte sequences become U+FFFD, never an error.
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Execute a whitespace-split passthrough query like `log --oneline -5`.
///
/// The first token must parse into [`GitCommand`]; the rest are forwarded as
/// discrete tokens. Used by the raw-query API endpoint.
pub async fn run_query_string(repo: &Path, query: &str) -> Result<String, GitViewError> {
    let mut tokens = query.split_whitespace();
    let first = tokens
        .next()
        .ok_or_else(|| GitViewError::UnsupportedCommand("<empty>".to_string()))?;
    let cmd: GitCommand = first.parse()?;
    let args: Vec<&str> = tokens.collect();
    run(repo, cmd, &args).await
}

// ─── Repository locator ──────────────────────────────────────────────

/// Walk upward from `start` until a directory containing a `.git` marker is
/// found. The marker may be a directory (normal checkout) or a file
/// (worktree / submodule gitfile).
pub fn locate_repository(start: &Path) -> Result<PathBuf, GitViewError> {
    let start = start
        .canonicalize()
        .map_err(|_| GitViewError::NotAGitRepository(start.display().to_string()))?;

    let mut dir: &Path = &start;
    loop {
        if dir.join(".git").exists() {
            return Ok(dir.to_path_buf());
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return Err(GitViewError::NotAGitRepository(start.display().to_string())),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "test_repo.rs"]
pub(crate) mod test_repo;

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
