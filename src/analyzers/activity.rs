use chrono::Datelike;
use std::collections::BTreeMap;

use crate::analyzers::trends::{format_month, month_key, month_range, MonthKey};
use crate::classify::{add_ratio, stability_phase};
use crate::types::{MonthlyActivity, NormalizedCommit, QuarterStability};

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    commits: usize,
    insertions: u64,
    deletions: u64,
}

impl Totals {
    fn add(&mut self, commit: &NormalizedCommit) {
        self.commits += 1;
        self.insertions += commit.record.insertions;
        self.deletions += commit.record.deletions;
    }
}

/// Lines added and removed per month, zero-filled across the active span.
pub fn code_activity(commits: &[NormalizedCommit]) -> Vec<MonthlyActivity> {
    let mut per_month: BTreeMap<MonthKey, Totals> = BTreeMap::new();
    for commit in commits {
        per_month.entry(month_key(commit.workday)).or_default().add(commit);
    }
    let (Some(&first), Some(&last)) = (per_month.keys().next(), per_month.keys().next_back()) else {
        return Vec::new();
    };

    month_range(first, last)
        .into_iter()
        .map(|key| {
            let t = per_month.get(&key).copied().unwrap_or_default();
            MonthlyActivity {
                month: format_month(key),
                commits: t.commits,
                insertions: t.insertions,
                deletions: t.deletions,
                net_lines: t.insertions as i64 - t.deletions as i64,
                churn: t.insertions + t.deletions,
            }
        })
        .collect()
}

/// `(year, quarter)` with quarter in 1..=4.
type QuarterKey = (i32, u32);

/// Add/delete balance per quarter, zero-filled. Quarters with no churn are `Idle`.
pub fn code_stability(commits: &[NormalizedCommit]) -> Vec<QuarterStability> {
    let mut per_quarter: BTreeMap<QuarterKey, Totals> = BTreeMap::new();
    for commit in commits {
        let key = (commit.workday.year(), (commit.workday.month() - 1) / 3 + 1);
        per_quarter.entry(key).or_default().add(commit);
    }
    let (Some(&first), Some(&last)) = (per_quarter.keys().next(), per_quarter.keys().next_back()) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let (mut year, mut quarter) = first;
    while (year, quarter) <= last {
        let t = per_quarter.get(&(year, quarter)).copied().unwrap_or_default();
        out.push(QuarterStability {
            quarter: format!("{year:04}-Q{quarter}"),
            commits: t.commits,
            insertions: t.insertions,
            deletions: t.deletions,
            add_ratio: add_ratio(t.insertions, t.deletions),
            phase: stability_phase(t.insertions, t.deletions),
        });
        if quarter == 4 {
            year += 1;
            quarter = 1;
        } else {
            quarter += 1;
        }
    }
    out
}
