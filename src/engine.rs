//! Commits in, report out.
//!
//! [`analyze`] is a pure function of its inputs: the same records (in any
//! order), config and `as_of` date always produce an identical report.

use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::analyzers::{activity, authors, heatmap, rankings, time_of_day, trends};
use crate::classify::safe_ratio;
use crate::config::EngineConfig;
use crate::error::InsightError;
use crate::filters::filter_automated;
use crate::periods::is_night;
use crate::temporal::normalize_all;
use crate::types::{CommitRecord, FileChangeRecord, InsightReport, Summary};

pub fn analyze(
    commits: &[CommitRecord],
    file_changes: &[FileChangeRecord],
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Result<InsightReport, InsightError> {
    config.validate()?;

    let (kept, filter_stats) = filter_automated(commits, &config.automation_suffix);
    info!(
        before = filter_stats.before,
        removed = filter_stats.removed,
        "filtered automated commits"
    );

    let normalized = normalize_all(kept.iter().copied(), config)?;
    debug!(commits = normalized.len(), offset = %config.utc_offset, "normalized timestamps");

    let boundary = config.day_boundary_hour;
    let author_stats = authors::analyze_authors(&normalized, config, as_of);

    let kept_hashes: HashSet<&str> = kept.iter().map(|c| c.hash.as_str()).collect();
    let known_hashes: HashSet<&str> = commits.iter().map(|c| c.hash.as_str()).collect();
    let (file_heatmap, file_changes_counts) =
        heatmap::analyze_file_heat(file_changes, &kept_hashes, &known_hashes);
    if file_changes_counts.orphaned > 0 {
        warn!(
            orphaned = file_changes_counts.orphaned,
            "file-change rows reference unknown commits; excluded from file aggregates"
        );
    }
    let file_tree =
        heatmap::build_file_tree(&file_heatmap, heatmap::TREE_FILE_LIMIT, heatmap::TREE_MAX_DEPTH);

    let first_workday = normalized.iter().map(|c| c.workday).min();
    let last_workday = normalized.iter().map(|c| c.workday).max();
    let total_insertions: u64 = normalized.iter().map(|c| c.record.insertions).sum();
    let total_deletions: u64 = normalized.iter().map(|c| c.record.deletions).sum();
    let night_commits = normalized
        .iter()
        .filter(|c| is_night(c.minutes_into_workday, boundary))
        .count();

    let summary = Summary {
        as_of,
        timezone: config.utc_offset.to_string(),
        commits_before_filter: filter_stats.before,
        automated_removed: filter_stats.removed,
        total_commits: normalized.len(),
        total_authors: author_stats.len(),
        active_authors: author_stats.iter().filter(|a| a.is_active).count(),
        total_insertions,
        total_deletions,
        net_lines: total_insertions as i64 - total_deletions as i64,
        first_workday,
        last_workday,
        lifecycle_days: match (first_workday, last_workday) {
            (Some(first), Some(last)) => (last - first).num_days(),
            _ => 0,
        },
        night_commits,
        night_ratio: safe_ratio(night_commits as f64, normalized.len() as f64),
        file_changes: file_changes_counts,
    };

    let report = InsightReport {
        summary,
        rankings: rankings::rank_authors(&author_stats, config.top_n),
        authors: author_stats,
        night_periods: time_of_day::count_periods(&normalized, boundary),
        hourly: time_of_day::hourly_distribution(&normalized),
        daily: trends::daily_series(&normalized),
        monthly: trends::monthly_trends(&normalized),
        code_activity: activity::code_activity(&normalized),
        stability: activity::code_stability(&normalized),
        file_heatmap,
        file_tree,
    };

    info!(
        commits = report.summary.total_commits,
        authors = report.summary.total_authors,
        files = report.file_heatmap.len(),
        "insight report assembled"
    );
    Ok(report)
}
