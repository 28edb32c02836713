use crate::types::{CommitRecord, FilterStats};

/// Human commits carry their author's local offset; CI systems and merge bots
/// usually stamp UTC. A timestamp ending with `suffix` (default `+0000`) marks
/// the commit as automated.
pub fn is_automated(record: &CommitRecord, suffix: &str) -> bool {
    record.raw_timestamp.trim_end().ends_with(suffix)
}

/// Removes automated commits by plain string match on the raw timestamp.
/// Runs before normalization so removed commits are never parsed or counted.
pub fn filter_automated<'a>(
    commits: &'a [CommitRecord],
    suffix: &str,
) -> (Vec<&'a CommitRecord>, FilterStats) {
    let kept: Vec<&CommitRecord> = commits
        .iter()
        .filter(|c| !is_automated(c, suffix))
        .collect();
    let stats = FilterStats {
        before: commits.len(),
        removed: commits.len() - kept.len(),
        after: kept.len(),
    };
    (kept, stats)
}
