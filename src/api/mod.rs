//! Query layer: one async function per logical operation, combining the
//! command runner with the pure parsers, plus the in-memory snapshot store.
//!
//! The snapshot covers the data the UI needs on first load and is replaced
//! wholesale on refresh. Queries parameterized by arbitrary refs or paths
//! (diffs between refs, file content, blame, file logs, stash diffs) always
//! re-invoke git — the ref space is unbounded and working-tree state is too
//! volatile to cache.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::GitViewError;
use crate::git::{self, GitCommand};
use crate::{
    BlameEntry, Commit, DiffSummary, RepoInfo, Snapshot, ActivityDay, LanguageStat,
    DEFAULT_CONTEXT_LINES, SNAPSHOT_ACTIVITY_DAYS, SNAPSHOT_COMMIT_LIMIT,
    human_size, short_hash,
};

// ─── Query payloads ──────────────────────────────────────────────────

/// One commit's diff together with its full detail.
#[derive(Serialize, Debug)]
pub struct CommitDiff {
    pub detail: Commit,
    pub diff: DiffSummary,
}

/// A paginated slice of the history plus the exact filtered total.
#[derive(Serialize, Debug)]
pub struct CommitList {
    pub commits: Vec<Commit>,
    pub total: usize,
}

/// Diff between two refs plus the commits the range contains.
#[derive(Serialize, Debug)]
pub struct RangeDiff {
    pub base: String,
    pub compare: String,
    pub diff: DiffSummary,
    pub commits: Vec<Commit>,
}

/// File content at a ref.
#[derive(Serialize, Debug)]
pub struct FileContent {
    pub path: String,
    pub reference: String,
    pub content: String,
    pub lines: usize,
    pub binary: bool,
}

/// History filters and pagination, all applied as git arguments.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    /// Branch, tag, or hash; HEAD when empty.
    pub branch: Option<String>,
    pub author: Option<String>,
    /// Substring match over subject + body (case-insensitive).
    pub search: Option<String>,
    /// Restrict to commits touching this path.
    pub path: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

// ─── Ref & commit queries ────────────────────────────────────────────

/// Resolve any ref to a full hash, or `RefNotFound`.
pub async fn resolve_ref(repo: &Path, reference: &str) -> Result<String, GitViewError> {
    let spec = format!("{reference}^{{commit}}");
    let args = ["--verify", "--quiet", spec.as_str()];
    match git::run(repo, GitCommand::RevParse, &args).await {
        Ok(out) => Ok(out.trim().to_string()),
        Err(GitViewError::GitCommandFailed { .. }) => {
            Err(GitViewError::RefNotFound(reference.to_string()))
        }
        Err(other) => Err(other),
    }
}

/// Full detail of a single commit, decorations included.
pub async fn commit_detail(repo: &Path, reference: &str) -> Result<Commit, GitViewError> {
    let hash = resolve_ref(repo, reference).await?;
    let format = format!("--format={}", git::log::log_format());
    let raw = git::run(repo, GitCommand::Log, &["-1", format.as_str(), hash.as_str()]).await?;
    let mut commits = git::log::parse_log(&raw, Local::now().timestamp());
    let mut commit = commits
        .pop()
        .ok_or_else(|| GitViewError::ParseError(format!("empty log output for {reference}")))?;

    let deco_format = format!("--format={}", git::log::decoration_format());
    let deco_raw =
        git::run(repo, GitCommand::Log, &["-1", deco_format.as_str(), hash.as_str()]).await?;
    let decorations = git::log::parse_decorations(&deco_raw);
    git::log::merge_decorations(std::slice::from_mut(&mut commit), decorations);
    Ok(commit)
}

/// One commit's diff (against its first parent for merges) plus its detail.
pub async fn commit_diff(
    repo: &Path,
    reference: &str,
    context: u32,
) -> Result<CommitDiff, GitViewError> {
    let detail = commit_detail(repo, reference).await?;
    let args = [
        format!("-U{context}"),
        "--format=".to_string(),
        "--diff-merges=first-parent".to_string(),
        detail.hash.clone(),
    ];
    let raw = git::run(repo, GitCommand::Show, &args).await?;
    Ok(CommitDiff {
        diff: git::diff::parse_diff(&raw),
        detail,
    })
}

/// Paginated, filterable commit history. Pagination and filters are applied
/// as git arguments, never post-hoc, so work stays bounded on large repos.
pub async fn commit_history(
    repo: &Path,
    query: &HistoryQuery,
) -> Result<CommitList, GitViewError> {
    let branch = query.branch.as_deref().unwrap_or("HEAD");
    resolve_ref(repo, branch).await?;

    let mut filters: Vec<String> = Vec::new();
    if let Some(author) = query.author.as_deref().filter(|s| !s.is_empty()) {
        filters.push(format!("--author={author}"));
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        filters.push(format!("--grep={search}"));
        filters.push("--regexp-ignore-case".to_string());
    }

    let mut args = vec![format!("--format={}", git::log::log_format())];
    if query.limit > 0 {
        args.push(format!("--max-count={}", query.limit));
    }
    if query.offset > 0 {
        args.push(format!("--skip={}", query.offset));
    }
    args.extend(filters.iter().cloned());
    args.push(branch.to_string());
    if let Some(path) = query.path.as_deref().filter(|s| !s.is_empty()) {
        args.push("--follow".to_string());
        args.push("--".to_string());
        args.push(path.to_string());
    }

    let raw = git::run(repo, GitCommand::Log, &args).await?;
    let mut commits = git::log::parse_log(&raw, Local::now().timestamp());

    // Decorations come from a second pass over the same slice and are merged
    // by hash equality.
    let mut deco_args: Vec<String> = args.clone();
    deco_args[0] = format!("--format={}", git::log::decoration_format());
    let deco_raw = git::run(repo, GitCommand::Log, &deco_args).await?;
    git::log::merge_decorations(&mut commits, git::log::parse_decorations(&deco_raw));

    // Exact total under the same filters, without fetching the history.
    let mut count_args = vec!["--count".to_string()];
    count_args.extend(filters);
    count_args.push(branch.to_string());
    if let Some(path) = query.path.as_deref().filter(|s| !s.is_empty()) {
        count_args.push("--".to_string());
        count_args.push(path.to_string());
    }
    let total = git::run(repo, GitCommand::RevList, &count_args)
        .await?
        .trim()
        .parse()
        .unwrap_or(commits.len());

    Ok(CommitList { commits, total })
}

/// Commit history of one file, renames followed.
pub async fn file_log(
    repo: &Path,
    path: &str,
    limit: usize,
) -> Result<Vec<Commit>, GitViewError> {
    let query = HistoryQuery {
        path: Some(path.to_string()),
        limit,
        ..HistoryQuery::default()
    };
    Ok(commit_history(repo, &query).await?.commits)
}

// ─── Diff queries ────────────────────────────────────────────────────

/// Diff of the index against HEAD.
pub async fn staged_diff(repo: &Path, context: u32) -> Result<DiffSummary, GitViewError> {
    let args = [format!("-U{context}"), "--cached".to_string()];
    let raw = git::run(repo, GitCommand::Diff, &args).await?;
    Ok(git::diff::parse_diff(&raw))
}

/// Diff of the working tree against the index.
pub async fn unstaged_diff(repo: &Path, context: u32) -> Result<DiffSummary, GitViewError> {
    let raw = git::run(repo, GitCommand::Diff, &[format!("-U{context}")]).await?;
    Ok(git::diff::parse_diff(&raw))
}

/// Three-dot diff between two refs plus the commits in `base..compare`.
pub async fn range_diff(
    repo: &Path,
    base: &str,
    compare: &str,
    context: u32,
) -> Result<RangeDiff, GitViewError> {
    resolve_ref(repo, base).await?;
    resolve_ref(repo, compare).await?;

    let args = [format!("-U{context}"), format!("{base}...{compare}")];
    let raw = git::run(repo, GitCommand::Diff, &args).await?;

    let log_args = [
        format!("--format={}", git::log::log_format()),
        format!("{base}..{compare}"),
    ];
    let commits_raw = git::run(repo, GitCommand::Log, &log_args).await?;

    Ok(RangeDiff {
        base: base.to_string(),
        compare: compare.to_string(),
        diff: git::diff::parse_diff(&raw),
        commits: git::log::parse_log(&commits_raw, Local::now().timestamp()),
    })
}

/// Diff of one stash entry. A missing entry surfaces as `RefNotFound`.
pub async fn stash_diff(
    repo: &Path,
    reference: &str,
    context: u32,
) -> Result<DiffSummary, GitViewError> {
    let context_arg = format!("-U{context}");
    let args = ["show", "-p", context_arg.as_str(), reference];
    match git::run(repo, GitCommand::Stash, &args).await {
        Ok(raw) => Ok(git::diff::parse_diff(&raw)),
        Err(GitViewError::GitCommandFailed { .. }) => {
            Err(GitViewError::RefNotFound(reference.to_string()))
        }
        Err(other) => Err(other),
    }
}

// ─── File queries ────────────────────────────────────────────────────

/// Verify `ref:path` resolves, or `PathNotFound`. The ref itself is checked
/// first so a bad ref is not misreported as a missing path.
async fn verify_path(repo: &Path, reference: &str, path: &str) -> Result<(), GitViewError> {
    resolve_ref(repo, reference).await?;
    let spec = format!("{reference}:{path}");
    match git::run(repo, GitCommand::RevParse, &["--verify", "--quiet", spec.as_str()]).await {
        Ok(_) => Ok(()),
        Err(GitViewError::GitCommandFailed { .. }) => {
            Err(GitViewError::PathNotFound(path.to_string()))
        }
        Err(other) => Err(other),
    }
}

/// git's own binary heuristic: a NUL in the first 8000 bytes.
fn looks_binary(content: &str) -> bool {
    content.as_bytes().iter().take(8000).any(|&b| b == 0)
}

/// File content at a ref, with binary detection.
pub async fn file_content(
    repo: &Path,
    path: &str,
    reference: &str,
) -> Result<FileContent, GitViewError> {
    verify_path(repo, reference, path).await?;
    let content = git::run(repo, GitCommand::Show, &[format!("{reference}:{path}")]).await?;
    let binary = looks_binary(&content);
    Ok(FileContent {
        path: path.to_string(),
        reference: reference.to_string(),
        lines: if binary { 0 } else { content.lines().count() },
        content: if binary { String::new() } else { content },
        binary,
    })
}

/// Per-line authorship of a file at a ref.
///
/// Failure ladder: unknown ref → `RefNotFound`; missing path →
/// `PathNotFound`; binary content → `BlameUnavailable`.
pub async fn blame_file(
    repo: &Path,
    path: &str,
    reference: &str,
) -> Result<Vec<BlameEntry>, GitViewError> {
    verify_path(repo, reference, path).await?;
    let content = git::run(repo, GitCommand::Show, &[format!("{reference}:{path}")]).await?;
    if looks_binary(&content) {
        return Err(GitViewError::BlameUnavailable(path.to_string()));
    }
    let args = ["--porcelain", reference, "--", path];
    let raw = git::run(repo, GitCommand::Blame, &args).await?;
    Ok(git::blame::parse_blame(&raw))
}

// ─── Statistics queries ──────────────────────────────────────────────

/// Commit counts for the trailing `days`-day window, zero-filled. Parses a
/// window-bounded log and feeds the pure aggregator.
pub async fn activity(repo: &Path, days: u32) -> Result<Vec<ActivityDay>, GitViewError> {
    let days = days.clamp(1, 3650);
    let args = [
        format!("--format={}", git::log::log_format()),
        format!("--since={days} days ago"),
        "HEAD".to_string(),
    ];
    // An unborn HEAD (fresh repo) is an empty histogram, not an error.
    let raw = git::run(repo, GitCommand::Log, &args).await.unwrap_or_default();
    let commits = git::log::parse_log(&raw, Local::now().timestamp());
    Ok(git::activity::activity_histogram(
        &commits,
        days,
        Local::now().date_naive(),
    ))
}

/// Extension breakdown over the tracked files at a ref.
pub async fn language_breakdown(
    repo: &Path,
    reference: &str,
) -> Result<Vec<LanguageStat>, GitViewError> {
    let raw = git::run(repo, GitCommand::LsTree, &["-r", "--long", reference])
        .await
        .unwrap_or_default();
    Ok(git::activity::language_stats(&git::meta::parse_tree(&raw)))
}

/// Allowlisted raw query, e.g. `log --oneline -20`.
pub async fn raw_query(repo: &Path, query: &str) -> Result<String, GitViewError> {
    git::run_query_string(repo, query).await
}

// ─── Snapshot collection ─────────────────────────────────────────────

/// Run one collector, tolerating failure with an empty default. Collection
/// must survive empty repositories, where most subcommands exit non-zero.
async fn collect_or_default(
    repo: &Path,
    cmd: GitCommand,
    args: &[String],
) -> String {
    match git::run(repo, cmd, args).await {
        Ok(out) => out,
        Err(err) => {
            warn!(subcommand = %cmd, error = %err, "collector returned empty");
            String::new()
        }
    }
}

async fn collect_repo_info(repo: &Path) -> RepoInfo {
    let name = repo
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let remotes_raw = collect_or_default(repo, GitCommand::Remote, &["-v".to_string()]).await;
    let remotes = git::meta::parse_remotes(&remotes_raw);
    let remote_url = remotes
        .get("origin")
        .or_else(|| remotes.values().next())
        .cloned()
        .unwrap_or_default();

    let current_branch = collect_or_default(
        repo,
        GitCommand::RevParse,
        &["--abbrev-ref".to_string(), "HEAD".to_string()],
    )
    .await
    .trim()
    .to_string();
    let current_branch = if current_branch.is_empty() {
        "HEAD".to_string()
    } else {
        current_branch
    };

    let head_hash = collect_or_default(repo, GitCommand::RevParse, &["HEAD".to_string()])
        .await
        .trim()
        .to_string();

    let total_commits = collect_or_default(
        repo,
        GitCommand::RevList,
        &["--count".to_string(), "HEAD".to_string()],
    )
    .await
    .trim()
    .parse()
    .unwrap_or(0);

    let branches_raw = collect_or_default(
        repo,
        GitCommand::Branch,
        &[
            "-a".to_string(),
            "--format=%(refname)|%(objectname:short)|%(committerdate:short)|%(subject)"
                .to_string(),
        ],
    )
    .await;
    let branches = git::meta::parse_branches(&branches_raw, &current_branch);

    let tags_raw = collect_or_default(
        repo,
        GitCommand::ForEachRef,
        &[
            "--sort=-creatordate".to_string(),
            "--format=%(refname:short)|%(objecttype)|%(creatordate:short)|%(subject)|%(taggername)|%(objectname:short)"
                .to_string(),
            "refs/tags".to_string(),
        ],
    )
    .await;
    let tags = git::meta::parse_tags(&tags_raw);

    let contributors_raw = collect_or_default(
        repo,
        GitCommand::Shortlog,
        &[
            "-sne".to_string(),
            "--no-merges".to_string(),
            "HEAD".to_string(),
        ],
    )
    .await;
    let contributors = git::meta::parse_contributors(&contributors_raw);

    let latest_commit = if head_hash.is_empty() {
        None
    } else {
        commit_detail(repo, "HEAD").await.ok()
    };

    // Root commits carry the repository's birth date; multiple roots are
    // possible, take the oldest.
    let first_raw = collect_or_default(
        repo,
        GitCommand::Log,
        &[
            "--max-parents=0".to_string(),
            "--format=%at".to_string(),
            "HEAD".to_string(),
        ],
    )
    .await;
    let first_commit_date = first_raw
        .lines()
        .filter_map(|l| l.trim().parse::<i64>().ok())
        .min()
        .map(|ts| {
            crate::format_timestamp(ts)
                .chars()
                .take(10)
                .collect::<String>()
        })
        .unwrap_or_default();

    // Filesystem walks are blocking; keep them off the async workers.
    let worktree = repo.to_path_buf();
    let size_bytes = tokio::task::spawn_blocking(move || {
        git::meta::directory_size(&worktree, Some(".git"))
    })
    .await
    .unwrap_or(0);
    let git_dir = repo.join(".git");
    let git_size_bytes =
        tokio::task::spawn_blocking(move || git::meta::directory_size(&git_dir, None))
            .await
            .unwrap_or(0);

    RepoInfo {
        name,
        path: repo.display().to_string(),
        remote_url,
        remotes,
        head_short: short_hash(&head_hash),
        head_hash,
        total_commits,
        branch_count: branches.iter().filter(|b| !b.is_remote).count(),
        remote_branch_count: branches.iter().filter(|b| b.is_remote).count(),
        branches,
        tags,
        contributors,
        latest_commit,
        current_branch,
        size: human_size(size_bytes),
        size_bytes,
        git_size: human_size(git_size_bytes),
        git_size_bytes,
        first_commit_date,
    }
}

/// Collect a complete snapshot. Individual collectors degrade to empty
/// results rather than failing the whole pass.
pub async fn collect_snapshot(repo: &Path) -> Result<Snapshot, GitViewError> {
    info!("collecting repository metadata");
    let repo_info = collect_repo_info(repo).await;

    info!(limit = SNAPSHOT_COMMIT_LIMIT, "collecting commit history");
    let commits = commit_history(
        repo,
        &HistoryQuery {
            limit: SNAPSHOT_COMMIT_LIMIT,
            ..HistoryQuery::default()
        },
    )
    .await
    .map(|list| list.commits)
    .unwrap_or_default();

    info!("collecting working tree status");
    let status_raw = collect_or_default(
        repo,
        GitCommand::Status,
        &["--porcelain=v1".to_string(), "-u".to_string()],
    )
    .await;
    let status = git::meta::parse_status(&status_raw);

    info!("collecting staged and unstaged diffs");
    let staged = staged_diff(repo, DEFAULT_CONTEXT_LINES)
        .await
        .unwrap_or_else(|_| git::diff::parse_diff(""));
    let unstaged = unstaged_diff(repo, DEFAULT_CONTEXT_LINES)
        .await
        .unwrap_or_else(|_| git::diff::parse_diff(""));

    info!("collecting file tree");
    let tree_raw = collect_or_default(
        repo,
        GitCommand::LsTree,
        &["-r".to_string(), "--long".to_string(), "HEAD".to_string()],
    )
    .await;
    let file_tree = git::meta::parse_tree(&tree_raw);

    info!("collecting stashes");
    let stash_raw = collect_or_default(
        repo,
        GitCommand::Stash,
        &["list".to_string(), "--format=%gd|%H|%s|%cr|%at".to_string()],
    )
    .await;
    let stashes = git::meta::parse_stashes(&stash_raw);

    info!(days = SNAPSHOT_ACTIVITY_DAYS, "collecting activity histogram");
    let activity_days = activity(repo, SNAPSHOT_ACTIVITY_DAYS).await?;

    info!("collecting language stats");
    let languages = git::activity::language_stats(&file_tree);

    info!("collecting refs");
    let refs_raw = collect_or_default(
        repo,
        GitCommand::ForEachRef,
        &[
            "--format=%(refname:short)|%(objectname:short)|%(objecttype)".to_string(),
            "refs/".to_string(),
        ],
    )
    .await;
    let all_refs = git::meta::parse_refs(&refs_raw);

    info!(
        commits = commits.len(),
        files = file_tree.len(),
        contributors = repo_info.contributors.len(),
        "snapshot complete"
    );

    Ok(Snapshot {
        repo: repo_info,
        commits,
        status,
        staged_diff: staged,
        unstaged_diff: unstaged,
        file_tree,
        stashes,
        activity: activity_days,
        languages,
        all_refs,
        collected_at: Local::now().timestamp(),
    })
}

// ─── Snapshot store ──────────────────────────────────────────────────

/// In-memory snapshot with atomic-swap refresh semantics.
///
/// Readers clone the inner `Arc`, so an in-flight reader keeps a fully
/// consistent snapshot even while a refresh publishes a new one. The
/// `refreshing` flag makes refresh mutually exclusive — a second concurrent
/// request is rejected instead of racing two subprocess batches.
pub struct SnapshotStore {
    repo_root: PathBuf,
    current: RwLock<Arc<Snapshot>>,
    refreshing: AtomicBool,
}

impl SnapshotStore {
    pub fn new(repo_root: PathBuf, initial: Snapshot) -> Self {
        Self {
            repo_root,
            current: RwLock::new(Arc::new(initial)),
            refreshing: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// The current snapshot. Never blocks beyond the brief lock needed to
    /// clone the `Arc`.
    #[must_use]
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap())
    }

    /// Re-collect everything and publish the new snapshot atomically.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, GitViewError> {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(GitViewError::RefreshInProgress);
        }

        let result = collect_snapshot(&self.repo_root).await;
        self.refreshing.store(false, Ordering::Release);

        let snapshot = Arc::new(result?);
        *self.current.write().unwrap() = Arc::clone(&snapshot);
        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
