use serde::Serialize;

/// The fixed, ordered night sub-windows.
///
/// Every consumer of period statistics (report fields, table columns, chart
/// labels) iterates [`NightPeriod::ALL`] and labels through
/// [`NightPeriod::label`]; nothing else defines bucket edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NightPeriod {
    /// 18:00-19:00
    EarlyEvening,
    /// 19:00-20:00
    Evening,
    /// 20:00 until the day boundary
    LateNight,
}

impl NightPeriod {
    pub const ALL: [NightPeriod; 3] = [
        NightPeriod::EarlyEvening,
        NightPeriod::Evening,
        NightPeriod::LateNight,
    ];

    pub fn start_hour(self) -> u32 {
        match self {
            NightPeriod::EarlyEvening => NIGHT_START_HOUR,
            NightPeriod::Evening      => 19,
            NightPeriod::LateNight    => 20,
        }
    }

    /// The last bucket runs up to the workday boundary on the next calendar day.
    pub fn end_hour(self, day_boundary_hour: u32) -> u32 {
        match self {
            NightPeriod::EarlyEvening => 19,
            NightPeriod::Evening      => 20,
            NightPeriod::LateNight    => day_boundary_hour,
        }
    }

    pub fn label(self, day_boundary_hour: u32) -> String {
        let start = self.start_hour();
        let end = self.end_hour(day_boundary_hour);
        if end <= start {
            format!("{start:02}:00-{end:02}:00(next day)")
        } else {
            format!("{start:02}:00-{end:02}:00")
        }
    }

    /// Buckets a commit by its offset into the workday. `None` means daytime.
    pub fn classify(minutes_into_workday: u32, day_boundary_hour: u32) -> Option<NightPeriod> {
        Self::ALL
            .iter()
            .rev()
            .find(|p| minutes_into_workday >= offset_minutes(p.start_hour(), day_boundary_hour))
            .copied()
    }
}

/// Start of the night window, local clock hour.
pub const NIGHT_START_HOUR: u32 = 18;

pub fn is_night(minutes_into_workday: u32, day_boundary_hour: u32) -> bool {
    NightPeriod::classify(minutes_into_workday, day_boundary_hour).is_some()
}

/// Minutes from the workday start to `hour` on the same workday.
fn offset_minutes(hour: u32, day_boundary_hour: u32) -> u32 {
    ((hour + 24 - day_boundary_hour) % 24) * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: u32 = 6;

    fn minutes_at(hour: u32, minute: u32) -> u32 {
        offset_minutes(hour, BOUNDARY) + minute
    }

    #[test]
    fn test_labels_follow_fixed_order() {
        let labels: Vec<String> = NightPeriod::ALL.iter().map(|p| p.label(BOUNDARY)).collect();
        assert_eq!(labels, vec!["18:00-19:00", "19:00-20:00", "20:00-06:00(next day)"]);
    }

    #[test]
    fn test_first_bucket_starts_at_night_start() {
        assert_eq!(NightPeriod::ALL[0].start_hour(), NIGHT_START_HOUR);
    }

    #[test]
    fn test_bucket_edges() {
        assert_eq!(NightPeriod::classify(minutes_at(17, 59), BOUNDARY), None);
        assert_eq!(NightPeriod::classify(minutes_at(18, 0), BOUNDARY), Some(NightPeriod::EarlyEvening));
        assert_eq!(NightPeriod::classify(minutes_at(18, 59), BOUNDARY), Some(NightPeriod::EarlyEvening));
        assert_eq!(NightPeriod::classify(minutes_at(19, 0), BOUNDARY), Some(NightPeriod::Evening));
        assert_eq!(NightPeriod::classify(minutes_at(20, 0), BOUNDARY), Some(NightPeriod::LateNight));
        assert_eq!(NightPeriod::classify(minutes_at(23, 59), BOUNDARY), Some(NightPeriod::LateNight));
        assert_eq!(NightPeriod::classify(minutes_at(0, 0), BOUNDARY), Some(NightPeriod::LateNight));
        assert_eq!(NightPeriod::classify(minutes_at(5, 59), BOUNDARY), Some(NightPeriod::LateNight));
        assert_eq!(NightPeriod::classify(minutes_at(6, 0), BOUNDARY), None);
    }

    #[test]
    fn test_buckets_partition_the_night_window() {
        // Every minute of a workday falls in at most one bucket, and every
        // minute from 18:00 to the boundary falls in exactly one.
        let night_start = offset_minutes(NIGHT_START_HOUR, BOUNDARY);
        for m in 0..1440 {
            let hits = NightPeriod::ALL
                .iter()
                .filter(|p| NightPeriod::classify(m, BOUNDARY) == Some(**p))
                .count();
            if m >= night_start {
                assert_eq!(hits, 1, "minute {m} should be in exactly one bucket");
            } else {
                assert_eq!(hits, 0, "minute {m} is daytime");
            }
        }
    }

    #[test]
    fn test_midnight_boundary_label_and_classification() {
        assert_eq!(NightPeriod::LateNight.label(0), "20:00-00:00(next day)");
        assert_eq!(NightPeriod::classify(20 * 60, 0), Some(NightPeriod::LateNight));
        assert_eq!(NightPeriod::classify(17 * 60, 0), None);
        assert!(is_night(18 * 60 + 30, 0));
    }
}
