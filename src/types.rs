use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use serde::Serialize;

use crate::periods::NightPeriod;

// ─── Raw Git Data ─────────────────────────────────────────────────────────────

/// One commit as read from `git log`, before any filtering or time handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    pub email: String,
    /// `YYYY-MM-DD HH:MM:SS ±HHMM`, exactly as git printed it.
    pub raw_timestamp: String,
    pub message: String,
    pub insertions: u64,
    pub deletions: u64,
}

/// One `--numstat` row. `hash` refers back to a [`CommitRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChangeRecord {
    pub hash: String,
    pub filepath: String,
    pub insertions: u64,
    pub deletions: u64,
}

// ─── Normalized Data ──────────────────────────────────────────────────────────

/// A commit placed in the target timezone and attributed to a workday.
///
/// Borrows the record it was derived from; the record itself is never touched.
#[derive(Debug, Clone)]
pub struct NormalizedCommit<'a> {
    pub record: &'a CommitRecord,
    pub local_time: DateTime<FixedOffset>,
    pub calendar_date: NaiveDate,
    pub workday: NaiveDate,
    /// Minutes elapsed since the start of `workday` (0..1440).
    pub minutes_into_workday: u32,
}

impl NormalizedCommit<'_> {
    pub fn local_hour(&self) -> u32 {
        self.local_time.hour()
    }
}

/// Outcome of the automation filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub before: usize,
    pub removed: usize,
    pub after: usize,
}

// ─── Classification Labels ────────────────────────────────────────────────────

/// Where an author sits in their participation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    New,
    Steady,
    Declining,
    Dormant,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::New       => write!(f, "NEW"),
            Phase::Steady    => write!(f, "STEADY"),
            Phase::Declining => write!(f, "DECLINING"),
            Phase::Dormant   => write!(f, "DORMANT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContributionLevel {
    Core,
    Regular,
    Occasional,
}

impl std::fmt::Display for ContributionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContributionLevel::Core       => write!(f, "CORE"),
            ContributionLevel::Regular    => write!(f, "REGULAR"),
            ContributionLevel::Occasional => write!(f, "OCCASIONAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StabilityPhase {
    FeatureDevelopment,
    Stable,
    Refactoring,
    Idle,
}

impl std::fmt::Display for StabilityPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StabilityPhase::FeatureDevelopment => write!(f, "FEATURE DEVELOPMENT"),
            StabilityPhase::Stable             => write!(f, "STABLE"),
            StabilityPhase::Refactoring        => write!(f, "REFACTORING"),
            StabilityPhase::Idle               => write!(f, "IDLE"),
        }
    }
}

// ─── Analyzer Outputs ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodCount {
    pub period: NightPeriod,
    pub label: String,
    pub commits: usize,
    /// commits / all commits counted over, unrounded.
    pub share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub commits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorStats {
    pub author: String,
    pub email: String,
    pub total_commits: usize,
    pub first_workday: NaiveDate,
    pub last_workday: NaiveDate,
    pub maintenance_days: i64,
    pub insertions: u64,
    pub deletions: u64,
    pub night_commits: usize,
    /// night_commits / total_commits, unrounded.
    pub night_ratio: f64,
    pub period_counts: Vec<PeriodCount>,
    /// 24 entries, local hours 0-23.
    pub hourly: Vec<HourCount>,
    pub recent_commits: usize,
    pub is_active: bool,
    pub phase: Phase,
    pub contribution_level: ContributionLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub commits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub commits: usize,
    pub active_authors: usize,
    pub new_authors: usize,
    pub cumulative_authors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyActivity {
    pub month: String,
    pub commits: usize,
    pub insertions: u64,
    pub deletions: u64,
    pub net_lines: i64,
    pub churn: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterStability {
    /// `YYYY-Qn`
    pub quarter: String,
    pub commits: usize,
    pub insertions: u64,
    pub deletions: u64,
    pub add_ratio: f64,
    pub phase: StabilityPhase,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileHeat {
    pub path: String,
    /// Distinct commits that touched the file.
    pub touches: usize,
    pub insertions: u64,
    pub deletions: u64,
    pub churn: u64,
    pub add_ratio: f64,
}

/// Directory tree of the hottest files, shaped for a sunburst chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTreeNode {
    pub name: String,
    pub value: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileTreeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankEntry {
    pub author: String,
    pub commits: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rankings {
    pub by_commits: Vec<RankEntry>,
    pub by_night_commits: Vec<RankEntry>,
    pub by_recent_commits: Vec<RankEntry>,
    /// Counts are days between first and last workday.
    pub by_maintenance_days: Vec<RankEntry>,
}

/// How file-change rows were accounted for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileChangeCounts {
    pub counted: usize,
    /// Rows whose commit was removed by the automation filter.
    pub automated: usize,
    /// Rows whose hash matches no commit at all.
    pub orphaned: usize,
}

// ─── Report ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub as_of: NaiveDate,
    pub timezone: String,
    pub commits_before_filter: usize,
    pub automated_removed: usize,
    pub total_commits: usize,
    pub total_authors: usize,
    pub active_authors: usize,
    pub total_insertions: u64,
    pub total_deletions: u64,
    pub net_lines: i64,
    pub first_workday: Option<NaiveDate>,
    pub last_workday: Option<NaiveDate>,
    pub lifecycle_days: i64,
    pub night_commits: usize,
    /// night_commits / total_commits, unrounded.
    pub night_ratio: f64,
    pub file_changes: FileChangeCounts,
}

/// Everything the presentation layer needs. Built once per run and never
/// modified afterwards; reporters only format what is in here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightReport {
    pub summary: Summary,
    pub authors: Vec<AuthorStats>,
    pub night_periods: Vec<PeriodCount>,
    pub hourly: Vec<HourCount>,
    pub daily: Vec<DailyPoint>,
    pub monthly: Vec<MonthlyTrend>,
    pub code_activity: Vec<MonthlyActivity>,
    pub stability: Vec<QuarterStability>,
    pub file_heatmap: Vec<FileHeat>,
    pub file_tree: Vec<FileTreeNode>,
    pub rankings: Rankings,
}
