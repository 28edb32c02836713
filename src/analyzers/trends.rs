use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::types::{DailyPoint, MonthlyTrend, NormalizedCommit};

/// `(year, month)` of a workday.
pub type MonthKey = (i32, u32);

pub fn month_key(date: NaiveDate) -> MonthKey {
    (date.year(), date.month())
}

pub fn format_month((year, month): MonthKey) -> String {
    format!("{year:04}-{month:02}")
}

/// Every month from `first` to `last` inclusive.
pub fn month_range(first: MonthKey, last: MonthKey) -> Vec<MonthKey> {
    let mut months = Vec::new();
    let (mut year, mut month) = first;
    while (year, month) <= last {
        months.push((year, month));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

/// Commits per workday from the first to the last active workday, with
/// idle days present at zero.
pub fn daily_series(commits: &[NormalizedCommit]) -> Vec<DailyPoint> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for commit in commits {
        *per_day.entry(commit.workday).or_default() += 1;
    }
    let (Some(&first), Some(&last)) = (per_day.keys().next(), per_day.keys().next_back()) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| DailyPoint {
            date,
            commits: per_day.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Monthly headcount: commits, distinct authors, authors whose first commit
/// falls in the month, and the running total of authors seen so far.
pub fn monthly_trends(commits: &[NormalizedCommit]) -> Vec<MonthlyTrend> {
    let mut commit_counts: BTreeMap<MonthKey, usize> = BTreeMap::new();
    let mut authors: BTreeMap<MonthKey, BTreeSet<&str>> = BTreeMap::new();
    let mut first_month: HashMap<&str, MonthKey> = HashMap::new();

    for commit in commits {
        let key = month_key(commit.workday);
        let author = commit.record.author.as_str();
        *commit_counts.entry(key).or_default() += 1;
        authors.entry(key).or_default().insert(author);
        first_month
            .entry(author)
            .and_modify(|m| *m = (*m).min(key))
            .or_insert(key);
    }

    let mut new_per_month: BTreeMap<MonthKey, usize> = BTreeMap::new();
    for month in first_month.values() {
        *new_per_month.entry(*month).or_default() += 1;
    }

    let (Some(&first), Some(&last)) = (commit_counts.keys().next(), commit_counts.keys().next_back()) else {
        return Vec::new();
    };

    let mut cumulative = 0;
    month_range(first, last)
        .into_iter()
        .map(|key| {
            let new_authors = new_per_month.get(&key).copied().unwrap_or(0);
            cumulative += new_authors;
            MonthlyTrend {
                month: format_month(key),
                commits: commit_counts.get(&key).copied().unwrap_or(0),
                active_authors: authors.get(&key).map_or(0, |s| s.len()),
                new_authors,
                cumulative_authors: cumulative,
            }
        })
        .collect()
}
