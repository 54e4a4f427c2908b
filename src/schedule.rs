//! Task scheduling: one-per-day completion gating, due-date advancement for
//! recurring tasks, spaced-repetition interval growth, and focus-session
//! crediting. Every function takes a task by reference and returns an updated
//! value; callers replace the stored record.

use chrono::{Datelike, NaiveDate, Timelike};

use crate::dates;
use crate::model::{MonthlyPattern, RecurrencePattern, Recurring, Task, WeeklyPattern};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Eligibility precondition for [`complete_task`]. Recurring and
/// spaced-repetition tasks can be completed at most once per local calendar
/// day; plain tasks carry no such restriction (their terminal `completed`
/// flag gates them instead).
pub fn can_complete_today(task: &Task, now_ms: i64) -> bool {
    if let Some(sr) = task.spaced_repetition.as_ref().filter(|s| s.enabled) {
        return !sr
            .last_reviewed
            .is_some_and(|last| dates::same_local_day(last, now_ms));
    }
    if let Some(rec) = task.recurring.as_ref().filter(|r| r.enabled) {
        return !rec
            .last_completed
            .is_some_and(|last| dates::same_local_day(last, now_ms));
    }
    true
}

/// Registers one completion against the task.
///
/// Plain tasks reach their terminal completed state. Recurring and
/// spaced-repetition tasks instead advance their due/review schedule and stay
/// incomplete forever. When `can_complete_today` does not hold the call is a
/// silent no-op and the task comes back unchanged.
pub fn complete_task(task: &Task, now_ms: i64) -> Task {
    if !can_complete_today(task, now_ms) {
        return task.clone();
    }
    let mut task = task.clone();
    task.sessions_completed += 1;

    if let Some(sr) = task.spaced_repetition.as_mut().filter(|s| s.enabled) {
        sr.review_count += 1;
        sr.last_reviewed = Some(now_ms);
        let grown = (f64::from(sr.interval.max(1)) * sr.difficulty.multiplier()).ceil();
        sr.interval = grown as u32;
        sr.next_review_date = now_ms + i64::from(sr.interval) * DAY_MS;
        task.completed = false;
    } else if let Some(rec) = task.recurring.as_mut().filter(|r| r.enabled) {
        rec.last_completed = Some(now_ms);
        rec.next_due = next_due_from(now_ms, rec);
        task.completed = false;
    } else {
        task.completed = true;
        task.completed_at = Some(now_ms);
    }
    task
}

/// Reverses the counters of a completion when the user unchecks a task.
/// The due/review date advance is deliberately not rewound; the schedule
/// keeps its forward progress.
pub fn uncomplete_task(task: &Task) -> Task {
    let mut task = task.clone();
    task.sessions_completed = task.sessions_completed.saturating_sub(1);

    if let Some(sr) = task.spaced_repetition.as_mut().filter(|s| s.enabled) {
        sr.review_count = sr.review_count.saturating_sub(1);
        sr.last_reviewed = None;
    } else if let Some(rec) = task.recurring.as_mut().filter(|r| r.enabled) {
        rec.last_completed = None;
    } else {
        task.completed = false;
        task.completed_at = None;
    }
    task
}

/// Credits one completed focus session: bumps the lifetime counter and the
/// per-day counter (which resets when the date changes).
pub fn record_focus_session(task: &Task, now_ms: i64) -> Task {
    let mut task = task.clone();
    task.sessions_completed += 1;
    let today = dates::local_date_of(now_ms).format("%Y-%m-%d").to_string();
    let count = task.sessions_today(&today) + 1;
    task.daily_sessions = Some(crate::model::DailySessions { date: today, count });
    task
}

/// Estimate-driven auto-completion trigger, uniform across task kinds.
pub fn should_auto_complete(task: &Task) -> bool {
    task.estimated_sessions > 0 && task.sessions_completed >= task.estimated_sessions
}

/// A task is due today when it is plain and incomplete, or its next
/// due/review instant falls within today's local-time window.
pub fn is_due_today(task: &Task, today: NaiveDate) -> bool {
    if task.archived_at.is_some() {
        return false;
    }
    if let Some(sr) = task.spaced_repetition.as_ref().filter(|s| s.enabled) {
        return dates::in_day(sr.next_review_date, today);
    }
    if let Some(rec) = task.recurring.as_ref().filter(|r| r.enabled) {
        return dates::in_day(rec.next_due, today);
    }
    !task.completed
}

/// Next due instant for a recurring config, seeded from `from_ms`. The
/// wall-clock time of day is preserved; only the date advances.
pub fn next_due_from(from_ms: i64, rec: &Recurring) -> i64 {
    let from = dates::to_local(from_ms).naive_local();
    let interval = i64::from(rec.interval.max(1));

    let next_date = match rec.pattern {
        RecurrencePattern::Daily | RecurrencePattern::Custom => {
            from.date() + chrono::Duration::days(interval)
        }
        RecurrencePattern::Weekdays => {
            let mut d = from.date() + chrono::Duration::days(1);
            while matches!(d.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
                d += chrono::Duration::days(1);
            }
            d
        }
        RecurrencePattern::Weekly => {
            let days = if rec.weekly_pattern == Some(WeeklyPattern::EveryOtherWeek) {
                14
            } else {
                7 * interval
            };
            from.date() + chrono::Duration::days(days)
        }
        RecurrencePattern::SpecificDays => next_specific_day(from.date(), rec),
        RecurrencePattern::Monthly => next_monthly(from.date(), rec),
    };

    dates::from_local(next_date.and_hms_opt(from.hour(), from.minute(), from.second()).unwrap_or(
        next_date.and_time(chrono::NaiveTime::MIN),
    ))
    .timestamp_millis()
}

/// Next selected day-of-week strictly after today; wraps to the first
/// selected day next week when none remains this week. Days are 0-6,
/// Sunday through Saturday.
fn next_specific_day(from: NaiveDate, rec: &Recurring) -> NaiveDate {
    let mut days: Vec<u32> = rec
        .days_of_week
        .clone()
        .unwrap_or_default()
        .into_iter()
        .filter(|d| *d < 7)
        .collect();
    if days.is_empty() {
        return from;
    }
    days.sort_unstable();
    days.dedup();

    let today = from.weekday().num_days_from_sunday();
    let step = match days.iter().find(|d| **d > today) {
        Some(next) => i64::from(next - today),
        None => i64::from(7 - today + days[0]),
    };
    from + chrono::Duration::days(step)
}

fn next_monthly(from: NaiveDate, rec: &Recurring) -> NaiveDate {
    let months = chrono::Months::new(rec.interval.max(1));
    match rec.monthly_pattern {
        Some(MonthlyPattern::SameWeekday) => {
            // Preserve weekday and ordinal week-of-month ("3rd Tuesday").
            let weekday = from.weekday();
            let week_of_month = (from.day() - 1) / 7; // 0-based ordinal
            let shifted = from.checked_add_months(months).unwrap_or(from);
            let mut d = shifted.with_day(1).unwrap_or(shifted);
            while d.weekday() != weekday {
                d += chrono::Duration::days(1);
            }
            d + chrono::Duration::days(i64::from(week_of_month) * 7)
        }
        // Same-date is the default monthly behavior; a landing day past the
        // end of a short month clamps to its last day.
        _ => from.checked_add_months(months).unwrap_or(from),
    }
}
