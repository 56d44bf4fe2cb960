//! Narrow parsers over single git subcommands: branches, tags, contributors,
//! remotes, working-tree status, stashes, tracked-file tree, refs — plus the
//! on-disk size walk. Each parser is a pure function over one command's text.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use ignore::WalkBuilder;
use regex::Regex;

use crate::{
    BranchRef, Contributor, RefEntry, StashEntry, TagRef, TreeEntry, WorkTreeEntry,
};

/// `git shortlog -sne`: "   42  Alice Example <alice@example.com>"
static SHORTLOG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s+(.+?)\s+<(.+?)>\s*$").expect("Invalid shortlog regex")
});

/// `git ls-tree -r --long`: "<mode> <type> <hash> <size-or-dash>\t<path>"
static LS_TREE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+) (\w+) ([0-9a-f]+)\s+(\d+|-)\t(.+)$").expect("Invalid ls-tree regex")
});

// ─── Branches ────────────────────────────────────────────────────────

/// Expected format: `%(refname)|%(objectname:short)|%(committerdate:short)|%(subject)`
/// from `git branch -a --format=…`. The full refname distinguishes local
/// (`refs/heads/`) from remote (`refs/remotes/`) reliably.
#[must_use]
pub fn parse_branches(raw: &str, current_branch: &str) -> Vec<BranchRef> {
    let mut branches = Vec::new();
    for line in raw.lines().filter(|l| !l.trim().is_empty()) {
        let parts: Vec<&str> = line.splitn(4, '|').collect();
        let refname = parts[0].trim();
        if refname.is_empty() || refname.ends_with("/HEAD") {
            continue;
        }
        let (name, is_remote) = if let Some(rest) = refname.strip_prefix("refs/remotes/") {
            (rest, true)
        } else if let Some(rest) = refname.strip_prefix("refs/heads/") {
            (rest, false)
        } else {
            // Detached-HEAD placeholder lines like "(HEAD detached at …)"
            continue;
        };
        branches.push(BranchRef {
            name: name.to_string(),
            hash: parts.get(1).unwrap_or(&"").trim().to_string(),
            date: parts.get(2).unwrap_or(&"").trim().to_string(),
            subject: parts.get(3).unwrap_or(&"").trim().to_string(),
            is_current: !is_remote && name == current_branch,
            is_remote,
        });
    }
    branches
}

// ─── Tags ────────────────────────────────────────────────────────────

/// Expected format: `%(refname:short)|%(objecttype)|%(creatordate:short)|%(subject)|%(taggername)|%(objectname:short)`
/// from `git for-each-ref refs/tags --sort=-creatordate --format=…`.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<TagRef> {
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| {
            let parts: Vec<&str> = line.splitn(6, '|').collect();
            let field = |i: usize| parts.get(i).unwrap_or(&"").trim().to_string();
            TagRef {
                name: field(0),
                kind: field(1),
                date: field(2),
                message: field(3),
                tagger: field(4),
                hash: field(5),
            }
        })
        .filter(|t| !t.name.is_empty())
        .collect()
}

// ─── Contributors ────────────────────────────────────────────────────

/// Parse `git shortlog -sne --no-merges` aggregation lines.
#[must_use]
pub fn parse_contributors(raw: &str) -> Vec<Contributor> {
    raw.lines()
        .filter_map(|line| {
            let caps = SHORTLOG_LINE.captures(line)?;
            Some(Contributor {
                commits: caps[1].parse().ok()?,
                name: caps[2].trim().to_string(),
                email: caps[3].trim().to_string(),
            })
        })
        .collect()
}

// ─── Remotes ─────────────────────────────────────────────────────────

/// Parse `git remote -v` into name → fetch URL.
#[must_use]
pub fn parse_remotes(raw: &str) -> BTreeMap<String, String> {
    let mut remotes = BTreeMap::new();
    for line in raw.lines() {
        if !line.ends_with("(fetch)") {
            continue;
        }
        let mut parts = line.split_whitespace();
        if let (Some(name), Some(url)) = (parts.next(), parts.next()) {
            remotes.insert(name.to_string(), url.to_string());
        }
    }
    remotes
}

// ─── Working-tree status ─────────────────────────────────────────────

/// Parse `git status --porcelain=v1 -u` lines: `XY <path>[ -> <path>]`.
#[must_use]
pub fn parse_status(raw: &str) -> Vec<WorkTreeEntry> {
    let mut entries = Vec::new();
    for line in raw.lines() {
        if line.len() < 4 {
            continue;
        }
        let Some(xy) = line.get(..2) else { continue };
        let Some(rest) = line.get(3..) else { continue };
        let mut chars = xy.chars();
        let (Some(staged), Some(unstaged)) = (chars.next(), chars.next()) else {
            continue;
        };

        let (old, new) = match rest.split_once(" -> ") {
            Some((old, new)) => (Some(old), new),
            None => (None, rest),
        };
        entries.push(WorkTreeEntry {
            staged,
            unstaged,
            path: unquote(new),
            old_path: old.map(unquote),
        });
    }
    entries
}

/// Strip the quoting git applies to paths with special characters.
fn unquote(path: &str) -> String {
    path.trim().trim_matches('"').to_string()
}

// ─── Stashes ─────────────────────────────────────────────────────────

/// Expected format: `%gd|%H|%s|%cr|%at` from `git stash list --format=…`.
#[must_use]
pub fn parse_stashes(raw: &str) -> Vec<StashEntry> {
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .filter_map(|(index, line)| {
            let parts: Vec<&str> = line.splitn(5, '|').collect();
            if parts.len() < 3 {
                return None;
            }
            Some(StashEntry {
                index,
                reference: parts[0].trim().to_string(),
                hash: parts[1].trim().to_string(),
                message: parts[2].trim().to_string(),
                date_relative: parts.get(3).unwrap_or(&"").trim().to_string(),
                timestamp: parts
                    .get(4)
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(0),
            })
        })
        .collect()
}

// ─── File tree ───────────────────────────────────────────────────────

/// Parse `git ls-tree -r --long <ref>` into tracked-file entries.
#[must_use]
pub fn parse_tree(raw: &str) -> Vec<TreeEntry> {
    raw.lines()
        .filter_map(|line| {
            let caps = LS_TREE_LINE.captures(line)?;
            let path = caps[5].to_string();
            let (dir, name) = match path.rsplit_once('/') {
                Some((dir, name)) => (dir.to_string(), name.to_string()),
                None => (String::new(), path.clone()),
            };
            Some(TreeEntry {
                mode: caps[1].to_string(),
                kind: caps[2].to_string(),
                hash: caps[3].to_string(),
                size: caps[4].parse().unwrap_or(0),
                path,
                name,
                dir,
            })
        })
        .collect()
}

// ─── All refs ────────────────────────────────────────────────────────

/// Expected format: `%(refname:short)|%(objectname:short)|%(objecttype)`
/// from `git for-each-ref refs/ --format=…`.
#[must_use]
pub fn parse_refs(raw: &str) -> Vec<RefEntry> {
    raw.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.splitn(3, '|').collect();
            if parts.len() != 3 {
                return None;
            }
            Some(RefEntry {
                name: parts[0].trim().to_string(),
                hash: parts[1].trim().to_string(),
                kind: parts[2].trim().to_string(),
            })
        })
        .collect()
}

// ─── On-disk sizes ───────────────────────────────────────────────────

/// Sum of file sizes under `root`, skipping any path containing a component
/// named `skip`. Ignore rules are disabled — this measures what is actually
/// on disk.
#[must_use]
pub fn directory_size(root: &Path, skip: Option<&str>) -> u64 {
    let mut total = 0u64;
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build();
    for entry in walker.flatten() {
        if let Some(skip_name) = skip
            && entry.path().components().any(|c| c.as_os_str() == skip_name)
        {
            continue;
        }
        if entry.file_type().is_some_and(|ft| ft.is_file())
            && let Ok(md) = entry.metadata()
        {
            total += md.len();
        }
    }
    total
}

#[cfg(test)]
#[path = "meta_tests.rs"]
mod tests;
