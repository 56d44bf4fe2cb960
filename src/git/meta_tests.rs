//! Unit tests for the metadata parsers — canned subcommand output.

use super::*;

// ─── Branches ───────────────────────────────────────────────────────

#[test]
fn test_parse_branches_local_and_remote() {
    let raw = "\
refs/heads/main|abc1234|2026-08-01|Latest work
refs/heads/feature/blame|def5678|2026-07-15|WIP blame view
refs/remotes/origin/main|abc1234|2026-08-01|Latest work
refs/remotes/origin/HEAD|abc1234|2026-08-01|Latest work
";
    let branches = parse_branches(raw, "main");
    assert_eq!(branches.len(), 3, "origin/HEAD alias should be dropped");

    assert_eq!(branches[0].name, "main");
    assert!(branches[0].is_current);
    assert!(!branches[0].is_remote);

    assert_eq!(branches[1].name, "feature/blame");
    assert!(!branches[1].is_current);

    assert_eq!(branches[2].name, "origin/main");
    assert!(branches[2].is_remote);
    assert!(!branches[2].is_current, "remote branch is never current");
}

#[test]
fn test_parse_branches_subject_with_pipes() {
    let raw = "refs/heads/main|abc1234|2026-08-01|Add a | b | c table\n";
    let branches = parse_branches(raw, "main");
    assert_eq!(branches[0].subject, "Add a | b | c table");
}

#[test]
fn test_parse_branches_empty() {
    assert!(parse_branches("", "main").is_empty());
}

// ─── Tags ───────────────────────────────────────────────────────────

#[test]
fn test_parse_tags() {
    let raw = "\
v1.2.0|tag|2026-06-01|Release 1.2.0|Alice|abc1234
v1.1.0|commit|2026-03-10|||def5678
";
    let tags = parse_tags(raw);
    assert_eq!(tags.len(), 2);

    assert_eq!(tags[0].name, "v1.2.0");
    assert_eq!(tags[0].kind, "tag");
    assert_eq!(tags[0].message, "Release 1.2.0");
    assert_eq!(tags[0].tagger, "Alice");
    assert_eq!(tags[0].hash, "abc1234");

    // Lightweight tag: no annotation, no tagger.
    assert_eq!(tags[1].kind, "commit");
    assert_eq!(tags[1].message, "");
    assert_eq!(tags[1].tagger, "");
}

// ─── Contributors ───────────────────────────────────────────────────

#[test]
fn test_parse_contributors() {
    let raw = "\
   120  Alice Example <alice@example.com>
     7  Bob O'Brien <bob@example.com>
";
    let contributors = parse_contributors(raw);
    assert_eq!(contributors.len(), 2);
    assert_eq!(contributors[0].commits, 120);
    assert_eq!(contributors[0].name, "Alice Example");
    assert_eq!(contributors[0].email, "alice@example.com");
    assert_eq!(contributors[1].name, "Bob O'Brien");
}

#[test]
fn test_parse_contributors_skips_garbage() {
    let contributors = parse_contributors("not a shortlog line\n");
    assert!(contributors.is_empty());
}

// ─── Remotes ────────────────────────────────────────────────────────

#[test]
fn test_parse_remotes_fetch_only() {
    let raw = "\
origin\thttps://example.com/repo.git (fetch)
origin\thttps://example.com/repo.git (push)
mirror\tgit@example.com:repo.git (fetch)
";
    let remotes = parse_remotes(raw);
    assert_eq!(remotes.len(), 2);
    assert_eq!(remotes["origin"], "https://example.com/repo.git");
    assert_eq!(remotes["mirror"], "git@example.com:repo.git");
}

// ─── Status ─────────────────────────────────────────────────────────

#[test]
fn test_parse_status() {
    let raw = "\
M  staged.rs
 M unstaged.rs
MM both.rs
?? untracked.txt
R  old_name.rs -> new_name.rs
";
    let entries = parse_status(raw);
    assert_eq!(entries.len(), 5);

    assert_eq!((entries[0].staged, entries[0].unstaged), ('M', ' '));
    assert_eq!(entries[0].path, "staged.rs");

    assert_eq!((entries[1].staged, entries[1].unstaged), (' ', 'M'));
    assert_eq!((entries[2].staged, entries[2].unstaged), ('M', 'M'));
    assert_eq!((entries[3].staged, entries[3].unstaged), ('?', '?'));

    assert_eq!(entries[4].path, "new_name.rs");
    assert_eq!(entries[4].old_path.as_deref(), Some("old_name.rs"));
}

#[test]
fn test_parse_status_quoted_path() {
    let entries = parse_status("?? \"with space.txt\"\n");
    assert_eq!(entries[0].path, "with space.txt");
}

// ─── Stashes ────────────────────────────────────────────────────────

#[test]
fn test_parse_stashes() {
    let raw = "\
stash@{0}|aaaa111|WIP on main: quick fix|2 hours ago|1700000000
stash@{1}|bbbb222|On feature: half-done refactor|3 days ago|1699000000
";
    let stashes = parse_stashes(raw);
    assert_eq!(stashes.len(), 2);

    assert_eq!(stashes[0].index, 0);
    assert_eq!(stashes[0].reference, "stash@{0}");
    assert_eq!(stashes[0].hash, "aaaa111");
    assert_eq!(stashes[0].message, "WIP on main: quick fix");
    assert_eq!(stashes[0].timestamp, 1_700_000_000);

    assert_eq!(stashes[1].index, 1);
}

#[test]
fn test_parse_stashes_short_line_skipped() {
    let stashes = parse_stashes("stash@{0}|onlytwo\n");
    assert!(stashes.is_empty());
}

// ─── File tree ──────────────────────────────────────────────────────

#[test]
fn test_parse_tree() {
    let raw = "\
100644 blob 8f94139338f9404f26296befa88755fc2598c289    1294\tsrc/main.rs
100755 blob aaaa139338f9404f26296befa88755fc2598c289      88\trun.sh
160000 commit bbbb139338f9404f26296befa88755fc2598c289       -\tvendor/dep
";
    let tree = parse_tree(raw);
    assert_eq!(tree.len(), 3);

    assert_eq!(tree[0].mode, "100644");
    assert_eq!(tree[0].kind, "blob");
    assert_eq!(tree[0].size, 1294);
    assert_eq!(tree[0].path, "src/main.rs");
    assert_eq!(tree[0].name, "main.rs");
    assert_eq!(tree[0].dir, "src");

    // Top-level file has an empty dir.
    assert_eq!(tree[1].dir, "");
    assert_eq!(tree[1].name, "run.sh");

    // Submodule entry: size is "-" → 0.
    assert_eq!(tree[2].size, 0);
}

// ─── Refs ───────────────────────────────────────────────────────────

#[test]
fn test_parse_refs() {
    let raw = "\
main|abc1234|commit
v1.0|def5678|tag
origin/main|abc1234|commit
";
    let refs = parse_refs(raw);
    assert_eq!(refs.len(), 3);
    assert_eq!(refs[1].name, "v1.0");
    assert_eq!(refs[1].kind, "tag");
}

// ─── Directory sizes ────────────────────────────────────────────────

#[test]
fn test_directory_size_skips_named_component() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"12345").unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    std::fs::write(dir.path().join(".git").join("big"), vec![0u8; 1000]).unwrap();

    assert_eq!(directory_size(dir.path(), Some(".git")), 5);
    assert_eq!(directory_size(dir.path(), None), 1005);
}
