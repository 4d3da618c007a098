//! Calendar-day windows for the daily upload quota.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse a timezone name, falling back to UTC when it is unknown.
pub fn parse_timezone(name: &str) -> Tz {
    name.parse().unwrap_or(Tz::UTC)
}

/// First instant of `date` in `tz`, as UTC.
///
/// When local midnight does not exist (a DST gap), the first valid local
/// instant after it is used.
fn start_of_local_day(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let mut local = date.and_time(chrono::NaiveTime::MIN);
    // Gaps are at most a few hours; step forward until the wall clock exists.
    for _ in 0..24 * 4 {
        if let Some(dt) = tz.from_local_datetime(&local).earliest() {
            return dt.with_timezone(&Utc);
        }
        local += chrono::Duration::minutes(15);
    }
    local.and_utc()
}

/// The half-open `[start, end)` calendar day containing `now` in `tz`.
pub fn day_window(now: DateTime<Utc>, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.with_timezone(tz).date_naive();
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    (start_of_local_day(today, tz), start_of_local_day(tomorrow, tz))
}

/// Format a UTC instant the way SQLite's `datetime('now')` stores it.
pub fn to_sqlite(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
