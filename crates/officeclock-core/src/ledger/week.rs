//! Calendar-week bucketing.
//!
//! Weeks run Monday 00:00 through the following Monday 00:00 (exclusive)
//! in whatever time zone the caller passes in.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Half-open `[start_ms, end_ms)` interval of one calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekBounds {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl WeekBounds {
    /// The week containing `at`, evaluated in `at`'s own time zone.
    pub fn containing<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        let tz = at.timezone();
        let date = at.date_naive();
        // Sunday belongs to the week that started six days earlier.
        let back = u64::from(date.weekday().num_days_from_monday());
        let monday = date - Days::new(back);
        let next_monday = monday + Days::new(7);
        Self {
            start_ms: local_midnight_ms(&tz, monday),
            end_ms: local_midnight_ms(&tz, next_monday),
        }
    }

    pub fn contains(&self, ms: i64) -> bool {
        ms >= self.start_ms && ms < self.end_ms
    }
}

/// Summary of one week of office presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub week: WeekBounds,
    pub total_ms: i64,
    /// Distinct local calendar days with any session start.
    pub worked_days: usize,
    pub session_count: usize,
    pub avg_per_worked_day_ms: i64,
    /// Always the total over seven days, however far into the week `now` is.
    pub avg_per_week_day_ms: i64,
    pub avg_session_ms: i64,
}

/// Epoch milliseconds of 00:00 on `date` in `tz`.
///
/// When a DST transition skips midnight, the first valid instant of the
/// day is used instead.
fn local_midnight_ms<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    let mut naive = date.and_time(NaiveTime::MIN);
    for _ in 0..24 {
        if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
            return dt.timestamp_millis();
        }
        naive += chrono::Duration::hours(1);
    }
    tz.from_utc_datetime(&date.and_time(NaiveTime::MIN))
        .timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn monday_is_first_day() {
        // 2024-06-10 is a Monday.
        let week = WeekBounds::containing(&utc(2024, 6, 12, 15));
        assert_eq!(week.start_ms, utc(2024, 6, 10, 0).timestamp_millis());
        assert_eq!(week.end_ms, utc(2024, 6, 17, 0).timestamp_millis());
    }

    #[test]
    fn sunday_belongs_to_previous_monday() {
        let week = WeekBounds::containing(&utc(2024, 6, 16, 23));
        assert_eq!(week.start_ms, utc(2024, 6, 10, 0).timestamp_millis());
    }

    #[test]
    fn monday_midnight_starts_new_week() {
        let at = utc(2024, 6, 17, 0);
        let week = WeekBounds::containing(&at);
        assert_eq!(week.start_ms, at.timestamp_millis());
        assert!(week.contains(at.timestamp_millis()));
        assert!(!week.contains(week.end_ms));
    }

    #[test]
    fn bounds_follow_local_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        // Monday 01:00 local is still Sunday 23:00 UTC.
        let at = tz.with_ymd_and_hms(2024, 6, 10, 1, 0, 0).unwrap();
        let week = WeekBounds::containing(&at);
        assert_eq!(
            week.start_ms,
            tz.with_ymd_and_hms(2024, 6, 10, 0, 0, 0)
                .unwrap()
                .timestamp_millis()
        );
    }
}
