use chrono::NaiveDate;

use crate::types::{ContributionLevel, Phase, StabilityPhase};

/// Authors whose first commit is this recent are `New`.
pub const NEW_AUTHOR_DAYS: i64 = 90;
/// Width of the two windows compared to detect a decline.
pub const TREND_WINDOW_DAYS: i64 = 90;

const CORE_PERCENTILE: f64 = 0.8;
const REGULAR_PERCENTILE: f64 = 0.2;

const FEATURE_ADD_RATIO: f64 = 0.7;
const REFACTOR_ADD_RATIO: f64 = 0.4;

/// `numerator / denominator`, or exactly 0.0 when the denominator is 0.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 { 0.0 } else { numerator / denominator }
}

/// Share of churn that is additions; 0.0 when there is no churn.
pub fn add_ratio(insertions: u64, deletions: u64) -> f64 {
    safe_ratio(insertions as f64, (insertions + deletions) as f64)
}

pub fn is_active(last_workday: NaiveDate, as_of: NaiveDate, activity_window_days: i64) -> bool {
    (as_of - last_workday).num_days() <= activity_window_days
}

/// Lifecycle label from an author's commit workdays, checked in order:
/// `Dormant` (nothing inside the activity window), `New` (first commit in the
/// last 90 days), `Declining` (last 90 days has fewer than half the commits of
/// the 90 days before), otherwise `Steady`.
pub fn classify_phase(workdays: &[NaiveDate], as_of: NaiveDate, activity_window_days: i64) -> Phase {
    let (Some(first), Some(last)) = (workdays.iter().min(), workdays.iter().max()) else {
        return Phase::Dormant;
    };

    if !is_active(*last, as_of, activity_window_days) {
        return Phase::Dormant;
    }
    if (as_of - *first).num_days() < NEW_AUTHOR_DAYS {
        return Phase::New;
    }

    let mut recent = 0usize;
    let mut previous = 0usize;
    for day in workdays {
        let days_ago = (as_of - *day).num_days();
        if days_ago < TREND_WINDOW_DAYS {
            recent += 1;
        } else if days_ago < 2 * TREND_WINDOW_DAYS {
            previous += 1;
        }
    }
    if recent * 2 < previous {
        Phase::Declining
    } else {
        Phase::Steady
    }
}

pub fn contribution_level(rank_pct: f64) -> ContributionLevel {
    if rank_pct > CORE_PERCENTILE { ContributionLevel::Core }
    else if rank_pct > REGULAR_PERCENTILE { ContributionLevel::Regular }
    else { ContributionLevel::Occasional }
}

/// Percentile rank of each value (ascending, ties share their average rank),
/// divided by the number of values. Output order matches input order.
pub fn rank_percentiles(values: &[usize]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| values[i]);

    let mut pct = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // ranks start+1 ..= end share their mean
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            pct[i] = avg_rank / n as f64;
        }
        start = end;
    }
    pct
}

pub fn stability_phase(insertions: u64, deletions: u64) -> StabilityPhase {
    if insertions + deletions == 0 {
        return StabilityPhase::Idle;
    }
    let ratio = add_ratio(insertions, deletions);
    if ratio >= FEATURE_ADD_RATIO { StabilityPhase::FeatureDevelopment }
    else if ratio <= REFACTOR_ADD_RATIO { StabilityPhase::Refactoring }
    else { StabilityPhase::Stable }
}
