//! Timezone conversion and workday attribution.
//!
//! [`workday_of`] is the only place that decides which day a commit belongs
//! to. Every per-day, per-month and per-quarter aggregate reads the
//! `workday` field it produces.

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};

use crate::config::EngineConfig;
use crate::error::InsightError;
use crate::types::{CommitRecord, NormalizedCommit};

/// Layout of `git log --date=iso` timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Parses a raw timestamp keeping its UTC offset.
pub fn parse_timestamp(record: &CommitRecord) -> Result<DateTime<FixedOffset>, InsightError> {
    DateTime::parse_from_str(record.raw_timestamp.trim(), TIMESTAMP_FORMAT).map_err(|_| {
        InsightError::MalformedTimestamp {
            hash: record.hash.clone(),
            field: "raw_timestamp",
            raw: record.raw_timestamp.clone(),
        }
    })
}

/// The workday a local time belongs to: before `day_boundary_hour` it is
/// still the previous day.
pub fn workday_of<T: Timelike>(local_date: NaiveDate, local_time: &T, day_boundary_hour: u32) -> NaiveDate {
    if local_time.hour() < day_boundary_hour {
        local_date.pred_opt().unwrap_or(local_date)
    } else {
        local_date
    }
}

/// Offset into the workday, in minutes. 06:00 → 0 and 05:59 → 1439 with a
/// 06:00 boundary.
pub fn minutes_into_workday<T: Timelike>(local_time: &T, day_boundary_hour: u32) -> u32 {
    ((local_time.hour() + 24 - day_boundary_hour) % 24) * 60 + local_time.minute()
}

/// Workday of the given instant in the configured timezone.
pub fn current_workday(now: DateTime<Utc>, config: &EngineConfig) -> NaiveDate {
    let local = now.with_timezone(&config.utc_offset);
    workday_of(local.date_naive(), &local, config.day_boundary_hour)
}

pub fn normalize<'a>(
    record: &'a CommitRecord,
    config: &EngineConfig,
) -> Result<NormalizedCommit<'a>, InsightError> {
    let local_time = parse_timestamp(record)?.with_timezone(&config.utc_offset);
    let calendar_date = local_time.date_naive();
    Ok(NormalizedCommit {
        record,
        local_time,
        calendar_date,
        workday: workday_of(calendar_date, &local_time, config.day_boundary_hour),
        minutes_into_workday: minutes_into_workday(&local_time, config.day_boundary_hour),
    })
}

/// Normalizes a whole batch. The first malformed timestamp rejects the batch;
/// nothing is dropped silently.
pub fn normalize_all<'a, I>(records: I, config: &EngineConfig) -> Result<Vec<NormalizedCommit<'a>>, InsightError>
where
    I: IntoIterator<Item = &'a CommitRecord>,
{
    records.into_iter().map(|r| normalize(r, config)).collect()
}
