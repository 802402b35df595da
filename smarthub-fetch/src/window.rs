//! Report time window.
//!
//! Every poll asks for the same rolling month: it ends today at 17:00 local
//! time and starts 30 days earlier plus one hour. Only the last data point of
//! the report is kept, so a fixed window is enough.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Local hour at which the window ends.
pub const END_HOUR: i64 = 17;

/// Length of the window in days, before the one-hour start offset.
pub const WINDOW_DAYS: i64 = 30;

/// The start and end of a usage query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Window start.
    pub start: DateTime<Utc>,
    /// Window end.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window ending at 17:00 on `date` in time zone `tz`.
    ///
    /// Arithmetic is done on wall-clock time, so the start is 17:00 + 1h,
    /// 30 calendar days earlier, even across a DST change.
    pub fn ending_on<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        let end = date.and_time(NaiveTime::default()) + Duration::hours(END_HOUR);
        let start = end - Duration::days(WINDOW_DAYS) + Duration::hours(1);

        Self {
            start: localize(tz, start),
            end: localize(tz, end),
        }
    }

    /// Window ending at 17:00 today, local time.
    pub fn current() -> Self {
        Self::ending_on(Local::now().date_naive(), &Local)
    }

    /// Window start as milliseconds since the Unix epoch.
    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    /// Window end as milliseconds since the Unix epoch.
    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

/// Resolves a wall-clock time in `tz`.
///
/// Ambiguous times take the earlier instant. Times skipped by a DST jump are
/// moved forward one hour.
fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map_or_else(|| naive.and_utc(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_in_utc() {
        let window = TimeWindow::ending_on(date(2024, 3, 31), &Utc);

        assert_eq!(window.end_millis(), 1_711_904_400_000);
        assert_eq!(window.start_millis(), 1_709_316_000_000);
    }

    #[test]
    fn test_window_in_fixed_offset() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let window = TimeWindow::ending_on(date(2024, 7, 15), &tz);

        assert_eq!(window.end_millis(), 1_721_080_800_000);
        assert_eq!(window.start_millis(), 1_718_492_400_000);
    }

    #[test]
    fn test_window_length() {
        let window = TimeWindow::ending_on(date(2024, 1, 10), &Utc);
        assert_eq!(window.end - window.start, Duration::days(30) - Duration::hours(1));
    }

    #[test]
    fn test_current_window_ends_at_five_pm_local() {
        let window = TimeWindow::current();
        let end = window.end.with_timezone(&Local);

        assert_eq!(end.hour(), 17);
        assert_eq!(end.minute(), 0);
        assert_eq!(end.second(), 0);
        assert_eq!(end.nanosecond(), 0);
        assert!(window.start < window.end);
    }
}
