//! Tests for the command runner, allowlist, and repository locator.
//!
//! Runner tests drive the real `git` binary against scratch repositories.

use super::test_repo::TestRepo;
use super::*;
use crate::error::GitViewError;

// ─── Allowlist ──────────────────────────────────────────────────────

#[test]
fn test_allowlist_accepts_read_only_commands() {
    for name in [
        "log", "show", "diff", "status", "blame", "stash", "branch", "tag",
        "for-each-ref", "shortlog", "ls-tree", "ls-files", "remote", "rev-list",
        "rev-parse", "describe",
    ] {
        assert!(name.parse::<GitCommand>().is_ok(), "{name} should be allowed");
        assert_eq!(name.parse::<GitCommand>().unwrap().as_str(), name);
    }
}

#[test]
fn test_allowlist_rejects_write_commands() {
    for name in ["commit", "push", "checkout", "merge", "reset", "rm", "gc", ""] {
        let err = name.parse::<GitCommand>().unwrap_err();
        assert!(
            matches!(err, GitViewError::UnsupportedCommand(_)),
            "{name} must be rejected"
        );
    }
}

#[tokio::test]
async fn test_passthrough_rejects_before_spawning() {
    // The repo path does not even exist — rejection must happen first.
    let result = run_query_string(Path::new("/nonexistent/repo"), "push origin main").await;
    assert!(matches!(result, Err(GitViewError::UnsupportedCommand(ref s)) if s == "push"));
}

#[tokio::test]
async fn test_output_flag_rejected() {
    let repo = TestRepo::with_commits(1);
    let result = run(repo.path(), GitCommand::Log, &["--output=/tmp/evil"]).await;
    assert!(matches!(result, Err(GitViewError::UnsupportedCommand(_))));
}

// ─── Runner ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_captures_stdout() {
    let repo = TestRepo::with_commits(2);
    let out = run(repo.path(), GitCommand::Log, &["--format=%s"]).await.unwrap();
    let subjects: Vec<&str> = out.lines().collect();
    assert_eq!(subjects, vec!["commit 2", "commit 1"]);
}

#[tokio::test]
async fn test_run_failure_carries_exit_code_and_stderr() {
    let repo = TestRepo::with_commits(1);
    let err = run(repo.path(), GitCommand::RevParse, &["--verify", "no-such-ref"])
        .await
        .unwrap_err();
    match err {
        GitViewError::GitCommandFailed { subcommand, code, stderr } => {
            assert_eq!(subcommand, "rev-parse");
            assert_ne!(code, 0);
            assert!(!stderr.is_empty());
        }
        other => panic!("expected GitCommandFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_query_string_executes_allowlisted() {
    let repo = TestRepo::with_commits(1);
    let out = run_query_string(repo.path(), "log --format=%s").await.unwrap();
    assert_eq!(out.trim(), "commit 1");
}

#[tokio::test]
async fn test_run_query_string_empty() {
    let repo = TestRepo::with_commits(1);
    let result = run_query_string(repo.path(), "   ").await;
    assert!(matches!(result, Err(GitViewError::UnsupportedCommand(_))));
}

#[tokio::test]
async fn test_zero_timeout_reports_timeout() {
    let repo = TestRepo::with_commits(1);
    let err = run_with_timeout(repo.path(), GitCommand::Log, &["--format=%s"], 0)
        .await
        .unwrap_err();
    assert!(matches!(err, GitViewError::Timeout { .. }), "got {err:?}");
}

// ─── Locator ────────────────────────────────────────────────────────

#[test]
fn test_locate_from_repo_root() {
    let repo = TestRepo::new();
    let found = locate_repository(repo.path()).unwrap();
    assert_eq!(found, repo.path().canonicalize().unwrap());
}

#[test]
fn test_locate_walks_up_from_subdirectory() {
    let repo = TestRepo::new();
    repo.write("a/b/c/deep.txt", "x");
    let found = locate_repository(&repo.path().join("a/b/c")).unwrap();
    assert_eq!(found, repo.path().canonicalize().unwrap());
}

#[test]
fn test_locate_fails_outside_any_repo() {
    let dir = tempfile::tempdir().unwrap();
    let result = locate_repository(dir.path());
    assert!(matches!(result, Err(GitViewError::NotAGitRepository(_))));
}

#[test]
fn test_locate_accepts_gitfile_marker() {
    // Worktrees use a `.git` file instead of a directory.
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".git"), "gitdir: /somewhere/else\n").unwrap();
    assert!(locate_repository(dir.path()).is_ok());
}

#[test]
fn test_locate_missing_start_dir() {
    let result = locate_repository(Path::new("/definitely/not/here"));
    assert!(matches!(result, Err(GitViewError::NotAGitRepository(_))));
}
