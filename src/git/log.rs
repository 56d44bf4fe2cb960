//! Delimited `git log` output → [`Commit`] records.
//!
//! Log invocations use a fixed `--format` whose fields are separated by rare
//! Unicode characters, so free-text subjects and bodies can never collide
//! with the record structure. The parser splits on the record separator
//! first, fields second, and returns commits exactly in the order git emitted
//! them — it never reorders.

use std::collections::HashMap;

use crate::{Commit, format_timestamp, relative_time, short_hash};

/// Separator between fields of one commit record.
/// A rare Unicode character avoids collision with commit messages.
pub const FIELD_SEP: &str = "␞";
/// Prefix that starts each commit record.
pub const RECORD_SEP: &str = "␟";

/// `--format=` value producing one delimited record per commit.
///
/// Field order: hash, parents, author name/email/unix-time, committer
/// name/email/unix-time, subject, body. The body may span lines and even
/// contain the field separator — everything after the ninth separator
/// belongs to it.
#[must_use]
pub fn log_format() -> String {
    format!(
        "{RECORD_SEP}%H{FIELD_SEP}%P{FIELD_SEP}%an{FIELD_SEP}%ae{FIELD_SEP}%at\
         {FIELD_SEP}%cn{FIELD_SEP}%ce{FIELD_SEP}%ct{FIELD_SEP}%s{FIELD_SEP}%b"
    )
}

/// `--format=` value for the separate decoration pass (one line per commit).
#[must_use]
pub fn decoration_format() -> String {
    format!("%H{FIELD_SEP}%D")
}

/// Parse delimited log output. Malformed records are skipped, not fatal.
/// `now` is the current unix time, used for the relative-date rendering.
#[must_use]
pub fn parse_log(raw: &str, now: i64) -> Vec<Commit> {
    raw.split(RECORD_SEP)
        .filter(|r| !r.trim().is_empty())
        .filter_map(|r| parse_commit_record(r, now))
        .collect()
}

fn parse_commit_record(record: &str, now: i64) -> Option<Commit> {
    let fields: Vec<&str> = record.split(FIELD_SEP).collect();
    if fields.len() < 10 {
        return None;
    }

    let hash = fields[0].trim().to_string();
    if hash.is_empty() {
        return None;
    }
    let parents: Vec<String> = fields[1]
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let author_timestamp: i64 = fields[4].trim().parse().unwrap_or(0);
    let committer_timestamp: i64 = fields[7].trim().parse().unwrap_or(0);

    Some(Commit {
        short_hash: short_hash(&hash),
        is_merge: parents.len() > 1,
        date: format_timestamp(author_timestamp),
        date_relative: relative_time(author_timestamp, now),
        hash,
        parents,
        author_name: fields[2].trim().to_string(),
        author_email: fields[3].trim().to_string(),
        author_timestamp,
        committer_name: fields[5].trim().to_string(),
        committer_email: fields[6].trim().to_string(),
        committer_timestamp,
        subject: fields[8].trim().to_string(),
        // The body may legitimately contain the field separator.
        body: fields[9..].join(FIELD_SEP).trim().to_string(),
        refs: Vec::new(),
    })
}

// ─── Decorations ─────────────────────────────────────────────────────

/// Parse `%H<sep>%D` lines into a hash → labels map.
///
/// `%D` renders like `HEAD -> main, tag: v1.0, origin/main`; each
/// comma-separated segment becomes one label.
#[must_use]
pub fn parse_decorations(raw: &str) -> HashMap<String, Vec<String>> {
    let mut map = HashMap::new();
    for line in raw.lines() {
        let Some((hash, decorations)) = line.split_once(FIELD_SEP) else {
            continue;
        };
        let labels: Vec<String> = decorations
            .split(", ")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if !labels.is_empty() {
            map.insert(hash.trim().to_string(), labels);
        }
    }
    map
}

/// Attach decorations onto matching commits by hash equality.
pub fn merge_decorations(commits: &mut [Commit], mut decorations: HashMap<String, Vec<String>>) {
    for commit in commits {
        if let Some(labels) = decorations.remove(&commit.hash) {
            commit.refs = labels;
        }
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
