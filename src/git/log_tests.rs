//! Unit tests for the delimited commit-log parser — canned text, no git.

use super::*;

const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const HASH_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const HASH_C: &str = "cccccccccccccccccccccccccccccccccccccccc";

fn record(hash: &str, parents: &str, subject: &str, body: &str) -> String {
    format!(
        "{RECORD_SEP}{hash}{FIELD_SEP}{parents}{FIELD_SEP}Alice{FIELD_SEP}alice@example.com\
         {FIELD_SEP}1700000000{FIELD_SEP}Bob{FIELD_SEP}bob@example.com{FIELD_SEP}1700000100\
         {FIELD_SEP}{subject}{FIELD_SEP}{body}"
    )
}

#[test]
fn test_parse_single_commit() {
    let raw = record(HASH_A, HASH_B, "Fix the thing", "Longer explanation.");
    let commits = parse_log(&raw, 1_700_000_500);
    assert_eq!(commits.len(), 1);

    let c = &commits[0];
    assert_eq!(c.hash, HASH_A);
    assert_eq!(c.short_hash, "aaaaaaa");
    assert_eq!(c.parents, vec![HASH_B.to_string()]);
    assert!(!c.is_merge);
    assert_eq!(c.author_name, "Alice");
    assert_eq!(c.author_email, "alice@example.com");
    assert_eq!(c.author_timestamp, 1_700_000_000);
    assert_eq!(c.committer_name, "Bob");
    assert_eq!(c.committer_timestamp, 1_700_000_100);
    assert_eq!(c.subject, "Fix the thing");
    assert_eq!(c.body, "Longer explanation.");
    assert_eq!(c.date_relative, "8 minutes ago");
}

#[test]
fn test_merge_commit_detection() {
    let raw = record(HASH_A, &format!("{HASH_B} {HASH_C}"), "Merge branch 'dev'", "");
    let commits = parse_log(&raw, 0);
    assert_eq!(commits[0].parents.len(), 2);
    assert!(commits[0].is_merge);
}

#[test]
fn test_root_commit_has_no_parents() {
    let raw = record(HASH_A, "", "Initial commit", "");
    let commits = parse_log(&raw, 0);
    assert!(commits[0].parents.is_empty());
    assert!(!commits[0].is_merge);
}

#[test]
fn test_multiline_body_survives() {
    let body = "First paragraph.\n\nSecond paragraph\nwith a second line.";
    let raw = record(HASH_A, HASH_B, "Subject", body);
    let commits = parse_log(&raw, 0);
    assert_eq!(commits[0].body, body);
}

#[test]
fn test_body_containing_field_separator() {
    // A body that happens to contain the field separator must stay intact.
    let body = format!("weird{FIELD_SEP}body");
    let raw = record(HASH_A, HASH_B, "Subject", &body);
    let commits = parse_log(&raw, 0);
    assert_eq!(commits[0].body, body);
}

#[test]
fn test_order_preserved() {
    let raw = format!(
        "{}{}{}",
        record(HASH_A, HASH_B, "newest", ""),
        record(HASH_B, HASH_C, "middle", ""),
        record(HASH_C, "", "oldest", "")
    );
    let commits = parse_log(&raw, 0);
    let subjects: Vec<&str> = commits.iter().map(|c| c.subject.as_str()).collect();
    assert_eq!(subjects, vec!["newest", "middle", "oldest"]);
}

#[test]
fn test_ancestor_ordering_in_unbounded_log() {
    // Each parent hash refers to a commit appearing later in the log.
    let raw = format!(
        "{}{}{}",
        record(HASH_A, HASH_B, "newest", ""),
        record(HASH_B, HASH_C, "middle", ""),
        record(HASH_C, "", "oldest", "")
    );
    let commits = parse_log(&raw, 0);
    for (i, commit) in commits.iter().enumerate() {
        for parent in &commit.parents {
            let pos = commits.iter().position(|c| &c.hash == parent);
            assert!(pos.is_some_and(|p| p > i), "parent {} not after {}", parent, commit.hash);
        }
    }
}

#[test]
fn test_malformed_record_skipped() {
    let raw = format!(
        "{}{RECORD_SEP}not-enough-fields{}",
        record(HASH_A, "", "good", ""),
        record(HASH_B, "", "also good", "")
    );
    let commits = parse_log(&raw, 0);
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].subject, "good");
    assert_eq!(commits[1].subject, "also good");
}

#[test]
fn test_empty_input() {
    assert!(parse_log("", 0).is_empty());
}

// ─── Decorations ────────────────────────────────────────────────────

#[test]
fn test_parse_decorations() {
    let raw = format!(
        "{HASH_A}{FIELD_SEP}HEAD -> main, tag: v1.0, origin/main\n{HASH_B}{FIELD_SEP}\n"
    );
    let map = parse_decorations(&raw);
    assert_eq!(map.len(), 1);
    assert_eq!(
        map[HASH_A],
        vec!["HEAD -> main".to_string(), "tag: v1.0".to_string(), "origin/main".to_string()]
    );
    // Undecorated commits get no entry at all.
    assert!(!map.contains_key(HASH_B));
}

#[test]
fn test_merge_decorations_by_hash() {
    let raw = format!(
        "{}{}",
        record(HASH_A, HASH_B, "tip", ""),
        record(HASH_B, "", "old", "")
    );
    let mut commits = parse_log(&raw, 0);
    let decorations =
        parse_decorations(&format!("{HASH_A}{FIELD_SEP}HEAD -> main\n"));
    merge_decorations(&mut commits, decorations);

    assert_eq!(commits[0].refs, vec!["HEAD -> main".to_string()]);
    assert!(commits[1].refs.is_empty());
}

#[test]
fn test_log_format_field_count() {
    // 9 separators → 10 fields before the free-text body begins.
    let fmt = log_format();
    assert_eq!(fmt.matches(FIELD_SEP).count(), 9);
    assert!(fmt.starts_with(RECORD_SEP));
}
