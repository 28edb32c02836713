use crate::types::{AuthorStats, RankEntry, Rankings};

/// Top-`n` authors by a count, highest first, ties by name. Zero counts are
/// left out.
fn top_by<F>(authors: &[AuthorStats], n: usize, metric: F) -> Vec<RankEntry>
where
    F: Fn(&AuthorStats) -> usize,
{
    let mut entries: Vec<RankEntry> = authors
        .iter()
        .map(|a| RankEntry { author: a.author.clone(), commits: metric(a) })
        .filter(|e| e.commits > 0)
        .collect();
    entries.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.author.cmp(&b.author)));
    entries.truncate(n);
    entries
}

pub fn rank_authors(authors: &[AuthorStats], n: usize) -> Rankings {
    Rankings {
        by_commits:        top_by(authors, n, |a| a.total_commits),
        by_night_commits:  top_by(authors, n, |a| a.night_commits),
        by_recent_commits: top_by(authors, n, |a| a.recent_commits),
        by_maintenance_days: top_by(authors, n, |a| a.maintenance_days.max(0) as usize),
    }
}
