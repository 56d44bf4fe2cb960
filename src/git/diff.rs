//! Unified-diff parser: raw `git diff` text → structured [`DiffSummary`].
//!
//! Line-number bookkeeping is explicit: two independent monotonic counters
//! (old, new) seeded from each hunk header and advanced per line kind —
//! context advances both, added only new, removed only old. A malformed hunk
//! header demotes that one file to binary instead of aborting the batch.

use std::sync::LazyLock;

use regex::Regex;

use crate::{ChangeKind, DiffLine, DiffSummary, FileChange, Hunk, LineKind, MAX_DIFF_FILES};

/// `@@ -a[,b] +c[,d] @@ optional-context` — omitted counts default to 1.
static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@ ?(.*)$")
        .expect("Invalid hunk header regex")
});

/// Parse a complete unified diff into per-file changes with hunks and
/// line-number columns. Never fails: unrecognized lines are skipped and a
/// file with an unparseable hunk header falls back to [`ChangeKind::Binary`].
#[must_use]
pub fn parse_diff(raw: &str) -> DiffSummary {
    let mut parser = DiffParser::default();
    for line in raw.lines() {
        if !parser.feed(line) {
            break;
        }
    }
    parser.finish()
}

#[derive(Default)]
struct DiffParser {
    files: Vec<FileChange>,
    current: Option<FileChange>,
    hunk: Option<Hunk>,
    old_line: u32,
    new_line: u32,
    in_hunk: bool,
    /// Set after a malformed hunk header; everything until the next file
    /// marker is ignored.
    demoted: bool,
    truncated: bool,
}

impl DiffParser {
    /// Consume one line. Returns false once the file cap is hit and parsing
    /// should stop.
    fn feed(&mut self, line: &str) -> bool {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            self.flush_file();
            if self.files.len() >= MAX_DIFF_FILES {
                self.truncated = true;
                return false;
            }
            let (old_path, new_path) = parse_file_pair(rest);
            self.current = Some(FileChange {
                old_path,
                new_path,
                kind: ChangeKind::Modified,
                similarity: None,
                old_mode: None,
                new_mode: None,
                hunks: Vec::new(),
                additions: 0,
                deletions: 0,
            });
            self.in_hunk = false;
            self.demoted = false;
            return true;
        }

        if self.current.is_none() || self.demoted {
            return true;
        }

        if line.starts_with("@@") {
            self.flush_hunk();
            self.start_hunk(line);
            return true;
        }

        if self.in_hunk {
            self.push_line(line);
            return true;
        }

        self.apply_file_marker(line);
        true
    }

    /// Seed the hunk counters from the header, or demote the file to binary
    /// when the counts are unparseable — isolating the one bad record.
    fn start_hunk(&mut self, line: &str) {
        match HUNK_HEADER.captures(line) {
            Some(caps) => {
                let old_start = capture_u32(&caps, 1, 0);
                let new_start = capture_u32(&caps, 3, 0);
                self.old_line = old_start;
                self.new_line = new_start;
                self.hunk = Some(Hunk {
                    header: caps.get(5).map_or("", |m| m.as_str()).trim().to_string(),
                    old_start,
                    old_count: capture_u32(&caps, 2, 1),
                    new_start,
                    new_count: capture_u32(&caps, 4, 1),
                    lines: Vec::new(),
                    additions: 0,
                    deletions: 0,
                });
                self.in_hunk = true;
            }
            None => {
                if let Some(file) = self.current.as_mut() {
                    file.kind = ChangeKind::Binary;
                    file.hunks.clear();
                }
                self.hunk = None;
                self.in_hunk = false;
                self.demoted = true;
            }
        }
    }

    /// Classify one hunk-body line and advance the matching counters.
    fn push_line(&mut self, line: &str) {
        let Some(hunk) = self.hunk.as_mut() else { return };
        if let Some(text) = line.strip_prefix('+') {
            hunk.lines.push(DiffLine {
                kind: LineKind::Added,
                old_line: None,
                new_line: Some(self.new_line),
                text: text.to_string(),
            });
            self.new_line += 1;
            hunk.additions += 1;
        } else if let Some(text) = line.strip_prefix('-') {
            hunk.lines.push(DiffLine {
                kind: LineKind::Removed,
                old_line: Some(self.old_line),
                new_line: None,
                text: text.to_string(),
            });
            self.old_line += 1;
            hunk.deletions += 1;
        } else if let Some(text) = line.strip_prefix(' ') {
            hunk.lines.push(DiffLine {
                kind: LineKind::Context,
                old_line: Some(self.old_line),
                new_line: Some(self.new_line),
                text: text.to_string(),
            });
            self.old_line += 1;
            self.new_line += 1;
        } else if let Some(text) = line.strip_prefix('\\') {
            hunk.lines.push(DiffLine {
                kind: LineKind::NoNewline,
                old_line: None,
                new_line: None,
                text: text.trim().to_string(),
            });
        }
        // Anything else between hunks (stray blank lines) is skipped.
    }

    /// Handle the extended-header lines preceding the first hunk.
    fn apply_file_marker(&mut self, line: &str) {
        let Some(file) = self.current.as_mut() else { return };

        if let Some(mode) = line.strip_prefix("new file mode ") {
            file.kind = ChangeKind::Added;
            file.new_mode = Some(mode.trim().to_string());
        } else if let Some(mode) = line.strip_prefix("deleted file mode ") {
            file.kind = ChangeKind::Deleted;
            file.old_mode = Some(mode.trim().to_string());
        } else if let Some(mode) = line.strip_prefix("old mode ") {
            file.old_mode = Some(mode.trim().to_string());
        } else if let Some(mode) = line.strip_prefix("new mode ") {
            file.new_mode = Some(mode.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("similarity index ") {
            file.similarity = rest.trim_end_matches('%').parse().ok();
        } else if let Some(path) = line.strip_prefix("rename from ") {
            file.kind = ChangeKind::Renamed;
            file.old_path = path.to_string();
        } else if let Some(path) = line.strip_prefix("rename to ") {
            file.kind = ChangeKind::Renamed;
            file.new_path = path.to_string();
        } else if let Some(path) = line.strip_prefix("copy from ") {
            file.kind = ChangeKind::Copied;
            file.old_path = path.to_string();
        } else if let Some(path) = line.strip_prefix("copy to ") {
            file.kind = ChangeKind::Copied;
            file.new_path = path.to_string();
        } else if line.starts_with("Binary files ") || line == "GIT binary patch" {
            file.kind = ChangeKind::Binary;
            file.hunks.clear();
            self.hunk = None;
        }
        // index lines, ---/+++ markers, and anything unrecognized: skipped.
    }

    fn flush_hunk(&mut self) {
        if let Some(hunk) = self.hunk.take()
            && let Some(file) = self.current.as_mut()
        {
            file.hunks.push(hunk);
        }
        self.in_hunk = false;
    }

    fn flush_file(&mut self) {
        self.flush_hunk();
        if let Some(mut file) = self.current.take() {
            file.additions = file.hunks.iter().map(|h| h.additions).sum();
            file.deletions = file.hunks.iter().map(|h| h.deletions).sum();
            self.files.push(file);
        }
    }

    fn finish(mut self) -> DiffSummary {
        self.flush_file();
        let total_additions = self.files.iter().map(|f| f.additions).sum();
        let total_deletions = self.files.iter().map(|f| f.deletions).sum();
        DiffSummary {
            total_files: self.files.len(),
            total_additions,
            total_deletions,
            truncated: self.truncated,
            files: self.files,
        }
    }
}

fn capture_u32(caps: &regex::Captures<'_>, idx: usize, default: u32) -> u32 {
    caps.get(idx)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(default)
}

/// Split the `a/OLD b/NEW` tail of a `diff --git` line.
///
/// Paths containing ` b/` are ambiguous in this format; splitting at the
/// last occurrence handles the common case where both sides are equal.
fn parse_file_pair(rest: &str) -> (String, String) {
    if let Some(idx) = rest.rfind(" b/") {
        let old = rest[..idx].strip_prefix("a/").unwrap_or(&rest[..idx]);
        let new = &rest[idx + 3..];
        (old.to_string(), new.to_string())
    } else {
        (rest.to_string(), rest.to_string())
    }
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
