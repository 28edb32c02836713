use chrono::{Months, NaiveDate};
use std::collections::BTreeMap;

use crate::analyzers::time_of_day::{count_periods, hourly_distribution};
use crate::classify::{classify_phase, contribution_level, is_active, rank_percentiles, safe_ratio};
use crate::config::EngineConfig;
use crate::periods::is_night;
use crate::types::{AuthorStats, NormalizedCommit};

/// Commits on workdays after this date count as "recent".
pub fn recent_cutoff(as_of: NaiveDate, recent_months: u32) -> NaiveDate {
    as_of
        .checked_sub_months(Months::new(recent_months))
        .unwrap_or(NaiveDate::MIN)
}

/// Per-author statistics, sorted by total commits (desc) then name.
pub fn analyze_authors(
    commits: &[NormalizedCommit],
    config: &EngineConfig,
    as_of: NaiveDate,
) -> Vec<AuthorStats> {
    let mut by_author: BTreeMap<&str, Vec<&NormalizedCommit>> = BTreeMap::new();
    for commit in commits {
        by_author.entry(commit.record.author.as_str()).or_default().push(commit);
    }

    let cutoff = recent_cutoff(as_of, config.recent_months);
    let boundary = config.day_boundary_hour;

    let mut stats: Vec<AuthorStats> = by_author
        .into_iter()
        .map(|(author, group)| {
            let workdays: Vec<NaiveDate> = group.iter().map(|c| c.workday).collect();
            let first = workdays.iter().copied().min().unwrap_or(as_of);
            let last = workdays.iter().copied().max().unwrap_or(as_of);
            let total = group.len();
            let night = group
                .iter()
                .filter(|c| is_night(c.minutes_into_workday, boundary))
                .count();

            // Email as used on the author's latest commit; hash breaks ties so
            // input order never matters.
            let email = group
                .iter()
                .max_by(|a, b| {
                    a.local_time
                        .cmp(&b.local_time)
                        .then_with(|| a.record.hash.cmp(&b.record.hash))
                })
                .map(|c| c.record.email.clone())
                .unwrap_or_default();

            AuthorStats {
                author: author.to_string(),
                email,
                total_commits: total,
                first_workday: first,
                last_workday: last,
                maintenance_days: (last - first).num_days(),
                insertions: group.iter().map(|c| c.record.insertions).sum(),
                deletions: group.iter().map(|c| c.record.deletions).sum(),
                night_commits: night,
                night_ratio: safe_ratio(night as f64, total as f64),
                period_counts: count_periods(group.iter().copied(), boundary),
                hourly: hourly_distribution(group.iter().copied()),
                recent_commits: workdays.iter().filter(|d| **d > cutoff).count(),
                is_active: is_active(last, as_of, config.activity_window_days),
                phase: classify_phase(&workdays, as_of, config.activity_window_days),
                // filled in below once every author's total is known
                contribution_level: contribution_level(0.0),
            }
        })
        .collect();

    let totals: Vec<usize> = stats.iter().map(|s| s.total_commits).collect();
    for (s, pct) in stats.iter_mut().zip(rank_percentiles(&totals)) {
        s.contribution_level = contribution_level(pct);
    }

    stats.sort_by(|a, b| {
        b.total_commits
            .cmp(&a.total_commits)
            .then_with(|| a.author.cmp(&b.author))
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periods::NightPeriod;
    use crate::temporal::normalize_all;
    use crate::types::{CommitRecord, ContributionLevel, Phase};

    fn make_commit(hash: &str, author: &str, raw: &str) -> CommitRecord {
        CommitRecord {
            hash: hash.to_string(),
            author: author.to_string(),
            email: format!("{author}@test.com"),
            raw_timestamp: raw.to_string(),
            message: "change".to_string(),
            insertions: 10,
            deletions: 2,
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    #[test]
    fn test_evening_author_has_full_night_ratio() {
        let records = vec![
            make_commit("a", "owl", "2024-03-10 19:00:00 +0800"),
            make_commit("b", "owl", "2024-03-10 21:00:00 +0800"),
        ];
        let cfg = EngineConfig::default();
        let commits = normalize_all(&records, &cfg).unwrap();
        let stats = analyze_authors(&commits, &cfg, as_of());
        let owl = &stats[0];
        assert_eq!(owl.night_ratio, 1.0);
        assert_eq!(owl.night_commits, 2);
        let count = |p: NightPeriod| owl.period_counts.iter().find(|c| c.period == p).unwrap().commits;
        assert_eq!(count(NightPeriod::EarlyEvening), 0);
        assert_eq!(count(NightPeriod::Evening), 1);
        assert_eq!(count(NightPeriod::LateNight), 1);
    }

    #[test]
    fn test_per_author_hourly_distribution() {
        let records = vec![
            make_commit("a", "owl", "2024-03-10 23:10:00 +0800"),
            make_commit("b", "owl", "2024-03-11 02:30:00 +0800"),
            make_commit("c", "owl", "2024-03-12 23:59:00 +0800"),
            make_commit("d", "lark", "2024-03-10 08:00:00 +0800"),
        ];
        let cfg = EngineConfig::default();
        let commits = normalize_all(&records, &cfg).unwrap();
        let stats = analyze_authors(&commits, &cfg, as_of());
        let get = |name: &str| stats.iter().find(|s| s.author == name).unwrap();

        let owl = &get("owl").hourly;
        assert_eq!(owl.len(), 24);
        assert_eq!(owl[23].commits, 2);
        assert_eq!(owl[2].commits, 1, "local clock hour, not the workday");
        assert_eq!(owl[8].commits, 0, "another author's commits are not mixed in");
        assert_eq!(get("lark").hourly[8].commits, 1);
        assert_eq!(get("lark").hourly.iter().map(|h| h.commits).sum::<usize>(), 1);
    }

    #[test]
    fn test_daytime_author_has_zero_night_ratio() {
        let records = vec![
            make_commit("a", "lark", "2024-03-10 09:00:00 +0800"),
            make_commit("b", "lark", "2024-03-10 17:59:00 +0800"),
        ];
        let cfg = EngineConfig::default();
        let commits = normalize_all(&records, &cfg).unwrap();
        let stats = analyze_authors(&commits, &cfg, as_of());
        assert_eq!(stats[0].night_ratio, 0.0);
        assert_eq!(stats[0].night_commits, 0);
    }

    #[test]
    fn test_night_buckets_sum_to_total_for_night_only_author() {
        let records: Vec<CommitRecord> = ["18:10", "18:59", "19:30", "20:00", "23:45"]
            .iter()
            .enumerate()
            .map(|(i, t)| make_commit(&i.to_string(), "owl", &format!("2024-03-10 {t}:00 +0800")))
            .chain(std::iter::once(make_commit("x", "owl", "2024-03-11 05:59:00 +0800")))
            .collect();
        let cfg = EngineConfig::default();
        let commits = normalize_all(&records, &cfg).unwrap();
        let stats = analyze_authors(&commits, &cfg, as_of());
        let sum: usize = stats[0].period_counts.iter().map(|p| p.commits).sum();
        assert_eq!(sum, stats[0].total_commits);
        assert_eq!(stats[0].night_ratio, 1.0);
    }

    #[test]
    fn test_first_last_use_workday() {
        let records = vec![
            // 01:00 on the 10th belongs to the 9th
            make_commit("a", "dev", "2024-03-10 01:00:00 +0800"),
            make_commit("b", "dev", "2024-03-20 12:00:00 +0800"),
        ];
        let cfg = EngineConfig::default();
        let commits = normalize_all(&records, &cfg).unwrap();
        let stats = analyze_authors(&commits, &cfg, as_of());
        assert_eq!(stats[0].first_workday, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(stats[0].last_workday, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        assert_eq!(stats[0].maintenance_days, 11);
        assert_eq!(stats[0].insertions, 20);
        assert_eq!(stats[0].deletions, 4);
    }

    #[test]
    fn test_email_taken_from_latest_commit_regardless_of_order() {
        let mut old = make_commit("a", "dev", "2024-03-01 12:00:00 +0800");
        old.email = "old@test.com".to_string();
        let mut new = make_commit("b", "dev", "2024-03-02 12:00:00 +0800");
        new.email = "new@test.com".to_string();
        let cfg = EngineConfig::default();

        for records in [vec![old.clone(), new.clone()], vec![new.clone(), old.clone()]] {
            let commits = normalize_all(&records, &cfg).unwrap();
            let stats = analyze_authors(&commits, &cfg, as_of());
            assert_eq!(stats[0].email, "new@test.com");
        }
    }

    #[test]
    fn test_sorted_by_commits_then_name_with_levels() {
        let mut records = Vec::new();
        for i in 0..5 {
            records.push(make_commit(&format!("a{i}"), "alice", &format!("2024-03-1{i} 10:00:00 +0800")));
        }
        records.push(make_commit("b0", "bob", "2024-03-10 10:00:00 +0800"));
        records.push(make_commit("c0", "carol", "2024-03-10 10:00:00 +0800"));
        let cfg = EngineConfig::default();
        let commits = normalize_all(&records, &cfg).unwrap();
        let stats = analyze_authors(&commits, &cfg, as_of());
        let names: Vec<&str> = stats.iter().map(|s| s.author.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert_eq!(stats[0].contribution_level, ContributionLevel::Core);
        // bob and carol tie at ranks 1 and 2 → 1.5 / 3 = 0.5
        assert_eq!(stats[1].contribution_level, ContributionLevel::Regular);
        assert_eq!(stats[2].contribution_level, ContributionLevel::Regular);
    }

    #[test]
    fn test_activity_and_recent_window() {
        let records = vec![
            make_commit("a", "old", "2023-01-10 10:00:00 +0800"),
            make_commit("b", "fresh", "2024-03-01 10:00:00 +0800"),
            make_commit("c", "fresh", "2023-11-01 10:00:00 +0800"),
        ];
        let cfg = EngineConfig::default();
        let commits = normalize_all(&records, &cfg).unwrap();
        let stats = analyze_authors(&commits, &cfg, as_of());
        let get = |name: &str| stats.iter().find(|s| s.author == name).unwrap();
        assert!(!get("old").is_active);
        assert_eq!(get("old").phase, Phase::Dormant);
        assert!(get("fresh").is_active);
        // cutoff is 2023-12-31: only the March commit is recent
        assert_eq!(get("fresh").recent_commits, 1);
    }

    #[test]
    fn test_recent_cutoff_clamps_month_end() {
        let as_of = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(recent_cutoff(as_of, 3), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_empty_input() {
        let stats = analyze_authors(&[], &EngineConfig::default(), as_of());
        assert!(stats.is_empty());
    }
}
