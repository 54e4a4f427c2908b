//! Local-calendar helpers shared by the scheduler and the statistics engine.
//! All persisted timestamps are epoch milliseconds; all calendar decisions
//! (day windows, weekdays, streaks) are made in local time.

use chrono::{DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

pub fn now_ms() -> i64 {
    Local::now().timestamp_millis()
}

/// Local wall-clock view of an epoch-ms timestamp.
pub fn to_local(ms: i64) -> DateTime<Local> {
    match Local.timestamp_millis_opt(ms) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => Local::now(),
    }
}

pub fn local_date_of(ms: i64) -> NaiveDate {
    to_local(ms).date_naive()
}

/// Reattaches the local zone to a naive wall-clock time. Around DST jumps an
/// ambiguous time resolves to its earlier instant; a skipped time slides
/// forward one hour.
pub fn from_local(naive: NaiveDateTime) -> DateTime<Local> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => from_local(naive + chrono::Duration::hours(1)),
    }
}

/// Start of the local calendar day, epoch ms.
pub fn day_start_ms(date: NaiveDate) -> i64 {
    from_local(date.and_time(NaiveTime::MIN)).timestamp_millis()
}

/// Half-open [start, end) window of a local calendar day, epoch ms.
pub fn day_bounds(date: NaiveDate) -> (i64, i64) {
    (day_start_ms(date), day_start_ms(date + chrono::Duration::days(1)))
}

pub fn in_day(ms: i64, date: NaiveDate) -> bool {
    let (start, end) = day_bounds(date);
    ms >= start && ms < end
}

/// True when both timestamps fall on the same local calendar date.
pub fn same_local_day(a_ms: i64, b_ms: i64) -> bool {
    local_date_of(a_ms) == local_date_of(b_ms)
}

/// Sunday of the week containing `date` (weeks run Sunday through Saturday).
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_sunday() as i64;
    date - chrono::Duration::days(back)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (next, NaiveDate::from_ymd_opt(year, month, 1)) {
        (Some(next), Some(first)) => (next - first).num_days() as u32,
        _ => 30,
    }
}
