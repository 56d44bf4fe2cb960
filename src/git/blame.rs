//! Porcelain `git blame` output → per-line [`BlameEntry`] records.
//!
//! Porcelain grouping rules: a commit's full headers (author, times,
//! summary) appear only on its first occurrence; later lines from the same
//! commit carry just the hash line and the content. The parser keeps a
//! per-hash metadata cache and applies the current group's metadata to every
//! `\t`-prefixed content line.

use std::collections::HashMap;

use crate::{BlameEntry, format_timestamp, short_hash};

#[derive(Clone, Default)]
struct CommitMeta {
    author: String,
    time: i64,
    summary: String,
}

/// Parse `git blame --porcelain` output. Pure text transform — existence
/// and binary checks happen on the query side before blame is invoked.
#[must_use]
pub fn parse_blame(raw: &str) -> Vec<BlameEntry> {
    let mut entries = Vec::new();
    let mut seen: HashMap<String, CommitMeta> = HashMap::new();
    let mut lines = raw.lines();

    while let Some(line) = lines.next() {
        // Group header: "<40-hex> <orig_line> <final_line> [<num_lines>]"
        let mut parts = line.split_whitespace();
        let Some(hash) = parts.next() else { continue };
        if hash.len() != 40 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            continue;
        }
        let Some(final_line) = parts.nth(1).and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };

        let mut meta = seen.get(hash).cloned().unwrap_or_default();
        let mut content = None;

        // Header fields until the tab-prefixed content line.
        for header in lines.by_ref() {
            if let Some(text) = header.strip_prefix('\t') {
                content = Some(text.to_string());
                break;
            }
            if let Some(val) = header.strip_prefix("author ") {
                meta.author = val.to_string();
            } else if let Some(val) = header.strip_prefix("author-time ") {
                meta.time = val.parse().unwrap_or(0);
            } else if let Some(val) = header.strip_prefix("summary ") {
                meta.summary = val.to_string();
            }
            // committer*, author-mail, author-tz, filename, previous,
            // boundary — not surfaced.
        }

        seen.insert(hash.to_string(), meta.clone());

        entries.push(BlameEntry {
            line: final_line,
            hash: hash.to_string(),
            short_hash: short_hash(hash),
            author: meta.author,
            date: format_timestamp(meta.time),
            summary: meta.summary,
            text: content.unwrap_or_default(),
        });
    }

    entries
}

#[cfg(test)]
#[path = "blame_tests.rs"]
mod tests;
