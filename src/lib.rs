//! # gitview — local GitHub-style git repository viewer
//!
//! Read-only viewer over a single git repository: diffs, commit history,
//! blame, branches, stashes, and activity statistics, served as JSON from a
//! local HTTP endpoint. All data is obtained by invoking the `git` binary and
//! parsing its output — the object database is never read directly.
//!
//! ## Library usage
//!
//! This crate is primarily a CLI tool / local server, but the data model and
//! a few pure helpers are exposed as a library for integration testing.

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// How many recent commits the startup snapshot holds.
pub const SNAPSHOT_COMMIT_LIMIT: usize = 500;

/// Default number of unified-diff context lines.
pub const DEFAULT_CONTEXT_LINES: u32 = 3;

/// Hard cap on file changes parsed out of a single diff. Anything past this
/// is dropped and [`DiffSummary::truncated`] is set, so a pathological diff
/// cannot buffer without bound.
pub const MAX_DIFF_FILES: usize = 400;

/// Trailing window of the snapshot's activity histogram, in days.
pub const SNAPSHOT_ACTIVITY_DAYS: u32 = 90;

// ─── Commits ─────────────────────────────────────────────────────────

/// A single commit parsed from delimited `git log` output.
///
/// Immutable once parsed; the full hash is its identity. `refs` holds the
/// branch/tag/HEAD decorations git attached at collection time.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Commit {
    pub hash: String,
    pub short_hash: String,
    /// Parent hashes in git's order: 0 for a root commit, ≥2 for a merge.
    pub parents: Vec<String>,
    pub is_merge: bool,
    pub author_name: String,
    pub author_email: String,
    pub author_timestamp: i64,
    pub committer_name: String,
    pub committer_email: String,
    pub committer_timestamp: i64,
    /// Author time formatted in the local timezone, `YYYY-MM-DD HH:MM:SS`.
    pub date: String,
    pub date_relative: String,
    pub subject: String,
    pub body: String,
    pub refs: Vec<String>,
}

/// Per-author commit count from `git shortlog -sne`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Contributor {
    pub name: String,
    pub email: String,
    pub commits: usize,
}

// ─── Diffs ───────────────────────────────────────────────────────────

/// What happened to a file within one diff.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Binary,
}

/// Classification of one line within a hunk.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Context,
    Added,
    Removed,
    /// The `\ No newline at end of file` marker. Consumes neither counter.
    NoNewline,
}

/// One line of a hunk with its old/new line-number columns.
///
/// `old_line` is `None` for added lines, `new_line` is `None` for removed
/// lines. Within a hunk both columns are strictly increasing across the
/// lines that carry them.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DiffLine {
    pub kind: LineKind,
    pub old_line: Option<u32>,
    pub new_line: Option<u32>,
    pub text: String,
}

/// A contiguous changed region of one file: `@@ -a,b +c,d @@ context`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Hunk {
    /// Trailing function/class context from the hunk header, if any.
    pub header: String,
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub lines: Vec<DiffLine>,
    pub additions: usize,
    pub deletions: usize,
}

/// One file's worth of a diff. Exists only within the context of a single
/// diff request — never persisted on its own.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileChange {
    pub old_path: String,
    pub new_path: String,
    pub kind: ChangeKind,
    /// Similarity percentage, renames and copies only.
    pub similarity: Option<u32>,
    pub old_mode: Option<String>,
    pub new_mode: Option<String>,
    pub hunks: Vec<Hunk>,
    pub additions: usize,
    pub deletions: usize,
}

/// A fully parsed diff plus aggregate counters.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DiffSummary {
    pub files: Vec<FileChange>,
    pub total_files: usize,
    pub total_additions: usize,
    pub total_deletions: usize,
    /// True when the parse stopped at [`MAX_DIFF_FILES`].
    pub truncated: bool,
}

// ─── Blame ───────────────────────────────────────────────────────────

/// Authorship of one physical source line at the queried ref.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BlameEntry {
    /// 1-based line number in the file as it exists at the ref.
    pub line: u32,
    pub hash: String,
    pub short_hash: String,
    pub author: String,
    pub date: String,
    pub summary: String,
    pub text: String,
}

// ─── Refs, stashes, working tree ─────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BranchRef {
    pub name: String,
    pub hash: String,
    /// Committer date of the branch tip, `YYYY-MM-DD`.
    pub date: String,
    pub subject: String,
    pub is_current: bool,
    pub is_remote: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TagRef {
    pub name: String,
    pub hash: String,
    /// `tag` for annotated tags, `commit` for lightweight ones.
    pub kind: String,
    pub date: String,
    /// Annotation message (annotated tags only).
    pub message: String,
    pub tagger: String,
}

/// Any ref under `refs/` — branches, tags, remotes.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefEntry {
    pub name: String,
    pub hash: String,
    pub kind: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StashEntry {
    /// 0 = most recent.
    pub index: usize,
    /// The selector git understands, e.g. `stash@{0}`.
    pub reference: String,
    pub hash: String,
    pub message: String,
    pub date_relative: String,
    pub timestamp: i64,
}

/// One line of `git status --porcelain=v1`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorkTreeEntry {
    /// Index-side status character (X of the XY pair).
    pub staged: char,
    /// Working-tree-side status character (Y of the XY pair).
    pub unstaged: char,
    pub path: String,
    pub old_path: Option<String>,
}

/// One tracked file from `git ls-tree -r --long`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TreeEntry {
    pub mode: String,
    pub kind: String,
    pub hash: String,
    pub size: u64,
    pub path: String,
    pub name: String,
    pub dir: String,
}

// ─── Statistics ──────────────────────────────────────────────────────

/// Commit count for one local-calendar day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ActivityDay {
    /// `YYYY-MM-DD` in the local calendar.
    pub date: String,
    pub commits: usize,
}

/// Tracked-file share of one extension. Percentages across a full breakdown
/// sum to exactly 100; the largest bucket absorbs the rounding remainder.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LanguageStat {
    pub extension: String,
    pub files: usize,
    pub percent: u32,
}

// ─── Repository info & snapshot ──────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RepoInfo {
    pub name: String,
    pub path: String,
    pub remote_url: String,
    /// Remote name → fetch URL.
    pub remotes: std::collections::BTreeMap<String, String>,
    pub current_branch: String,
    pub head_hash: String,
    pub head_short: String,
    pub total_commits: usize,
    pub branches: Vec<BranchRef>,
    pub branch_count: usize,
    pub remote_branch_count: usize,
    pub tags: Vec<TagRef>,
    pub contributors: Vec<Contributor>,
    pub latest_commit: Option<Commit>,
    pub size_bytes: u64,
    pub size: String,
    pub git_size_bytes: u64,
    pub git_size: String,
    pub first_commit_date: String,
}

/// The complete immutable result of one data-collection pass. A refresh
/// replaces the whole value — it is never patched in place.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Snapshot {
    pub repo: RepoInfo,
    pub commits: Vec<Commit>,
    pub status: Vec<WorkTreeEntry>,
    pub staged_diff: DiffSummary,
    pub unstaged_diff: DiffSummary,
    pub file_tree: Vec<TreeEntry>,
    pub stashes: Vec<StashEntry>,
    pub activity: Vec<ActivityDay>,
    pub languages: Vec<LanguageStat>,
    pub all_refs: Vec<RefEntry>,
    pub collected_at: i64,
}

// ─── Pure helpers ────────────────────────────────────────────────────

/// First 7 characters of a hash (or the whole thing when shorter).
#[must_use]
pub fn short_hash(hash: &str) -> String {
    hash.chars().take(7).collect()
}

/// Human-readable byte count: `1.5 KB`, `12.0 MB`, …
#[must_use]
pub fn human_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if value < 1024.0 {
            return format!("{:.1} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1} PB", value)
}

/// Format a unix timestamp in the local timezone as `YYYY-MM-DD HH:MM:SS`.
/// Returns an empty string for a zero/invalid timestamp.
#[must_use]
pub fn format_timestamp(ts: i64) -> String {
    if ts <= 0 {
        return String::new();
    }
    match Local.timestamp_opt(ts, 0) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => {
            dt.format("%Y-%m-%d %H:%M:%S").to_string()
        }
        chrono::LocalResult::None => String::new(),
    }
}

/// `"3 days ago"`-style rendering of the distance between two unix
/// timestamps. `now` is passed in so the function stays deterministic.
#[must_use]
pub fn relative_time(ts: i64, now: i64) -> String {
    if ts <= 0 {
        return String::new();
    }
    let diff = now.saturating_sub(ts);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };
    match diff {
        i64::MIN..=59 => "just now".to_string(),
        60..=3599 => plural(diff / 60, "minute"),
        3600..=86_399 => plural(diff / 3600, "hour"),
        86_400..=604_799 => plural(diff / 86_400, "day"),
        604_800..=2_591_999 => plural(diff / 604_800, "week"),
        2_592_000..=31_535_999 => plural(diff / 2_592_000, "month"),
        _ => plural(diff / 31_536_000, "year"),
    }
}


// ─── Property-based tests (proptest) ─────────────────────────────────

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// human_size always renders a number plus a known unit.
        #[test]
        fn human_size_has_unit(bytes in 0u64..u64::MAX / 2) {
            let s = human_size(bytes);
            prop_assert!(
                ["B", "KB", "MB", "GB", "TB", "PB"].iter().any(|u| s.ends_with(u)),
                "no unit in '{}'", s
            );
        }

        /// relative_time is never empty for a positive timestamp.
        #[test]
        fn relative_time_nonempty(ts in 1i64..2_000_000_000, skew in 0i64..1_000_000_000) {
            let s = relative_time(ts, ts + skew);
            prop_assert!(!s.is_empty());
        }

        /// short_hash never exceeds 7 characters.
        #[test]
        fn short_hash_bounded(hash in "[0-9a-f]{0,64}") {
            prop_assert!(short_hash(&hash).chars().count() <= 7);
        }
    }
}
