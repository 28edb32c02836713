use crate::classify::safe_ratio;
use crate::periods::NightPeriod;
use crate::types::{HourCount, NormalizedCommit, PeriodCount};

/// Commit counts per night bucket, always one entry per bucket in
/// [`NightPeriod::ALL`] order.
pub fn count_periods<'c, 'r: 'c, I>(commits: I, day_boundary_hour: u32) -> Vec<PeriodCount>
where
    I: IntoIterator<Item = &'c NormalizedCommit<'r>>,
{
    let mut counts = [0usize; NightPeriod::ALL.len()];
    let mut total = 0usize;
    for commit in commits {
        total += 1;
        if let Some(period) = NightPeriod::classify(commit.minutes_into_workday, day_boundary_hour) {
            counts[period as usize] += 1;
        }
    }
    NightPeriod::ALL
        .iter()
        .map(|p| PeriodCount {
            period: *p,
            label: p.label(day_boundary_hour),
            commits: counts[*p as usize],
            share: safe_ratio(counts[*p as usize] as f64, total as f64),
        })
        .collect()
}

/// Commits per local clock hour, 24 entries from 0 to 23.
pub fn hourly_distribution<'c, 'r: 'c, I>(commits: I) -> Vec<HourCount>
where
    I: IntoIterator<Item = &'c NormalizedCommit<'r>>,
{
    let mut counts = [0usize; 24];
    for commit in commits {
        counts[commit.local_hour() as usize] += 1;
    }
    counts
        .iter()
        .enumerate()
        .map(|(hour, &commits)| HourCount { hour: hour as u32, commits })
        .collect()
}
