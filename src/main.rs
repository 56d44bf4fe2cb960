//! Local GitHub-style git repository viewer.
//!
//! Binary crate entry point. All startup logic is in the `cli` module.

// Re-export the data model from the library crate
pub use gitview::{
    ActivityDay, BlameEntry, BranchRef, ChangeKind, Commit, Contributor, DiffLine, DiffSummary,
    FileChange, Hunk, LanguageStat, LineKind, RefEntry, RepoInfo, Snapshot, StashEntry, TagRef,
    TreeEntry, WorkTreeEntry, DEFAULT_CONTEXT_LINES, MAX_DIFF_FILES, SNAPSHOT_ACTIVITY_DAYS,
    SNAPSHOT_COMMIT_LIMIT, format_timestamp, human_size, relative_time, short_hash,
};

mod api;
mod cli;
mod error;
mod git;
mod server;

pub use error::GitViewError;

fn main() {
    cli::run();
}
