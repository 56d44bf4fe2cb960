//! Activity histogram and language breakdown.
//!
//! Pure aggregation over already-parsed data — these functions never invoke
//! git. Day bucketing uses the local calendar so the heatmap matches the
//! user's wall clock, and missing days are zero-filled so the output always
//! has exactly the requested length.

use std::collections::HashMap;

use chrono::{Days, Local, NaiveDate, TimeZone};

use crate::{ActivityDay, Commit, LanguageStat, TreeEntry};

/// Bucket commit author timestamps into the trailing `days`-day window
/// ending at `today` (inclusive). Commits outside the window are ignored;
/// days without commits appear with a zero count.
#[must_use]
pub fn activity_histogram(commits: &[Commit], days: u32, today: NaiveDate) -> Vec<ActivityDay> {
    let days = days.max(1);
    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    for commit in commits {
        if let chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) =
            Local.timestamp_opt(commit.author_timestamp, 0)
        {
            *counts.entry(dt.date_naive()).or_default() += 1;
        }
    }

    let start = today
        .checked_sub_days(Days::new(u64::from(days) - 1))
        .unwrap_or(today);
    let mut histogram = Vec::with_capacity(days as usize);
    let mut day = start;
    while day <= today {
        histogram.push(ActivityDay {
            date: day.format("%Y-%m-%d").to_string(),
            commits: counts.get(&day).copied().unwrap_or(0),
        });
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    histogram
}

/// Bucket tracked files by extension and assign integer percentages.
///
/// Percentages sum to exactly 100; the largest bucket absorbs the rounding
/// remainder. An empty tree yields an empty sequence, not a division error.
#[must_use]
pub fn language_stats(tree: &[TreeEntry]) -> Vec<LanguageStat> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for entry in tree.iter().filter(|e| e.kind == "blob") {
        let ext = match entry.name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
            _ => "none".to_string(),
        };
        *counts.entry(ext).or_default() += 1;
    }

    let total: usize = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut stats: Vec<LanguageStat> = counts
        .into_iter()
        .map(|(extension, files)| LanguageStat {
            percent: ((files * 100 + total / 2) / total) as u32,
            extension,
            files,
        })
        .collect();
    // Largest bucket first; ties broken by name for deterministic output.
    stats.sort_by(|a, b| b.files.cmp(&a.files).then_with(|| a.extension.cmp(&b.extension)));

    let sum: i64 = stats.iter().map(|s| i64::from(s.percent)).sum();
    let drift = 100 - sum;
    if let Some(largest) = stats.first_mut() {
        largest.percent = (i64::from(largest.percent) + drift).max(0) as u32;
    }
    stats
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
