//! Read-time statistics. Rollups are pure functions of the session, task and
//! reminder-completion logs; nothing here is stored back as ground truth, so
//! a fresh recomputation can never diverge from a cached value.

use chrono::{Datelike, NaiveDate};

use crate::dates;
use crate::model::{ReminderCompletion, Session, SessionType, Task};

#[derive(Clone, Debug, PartialEq)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub sessions: u32,
    pub work_sessions: u32,
    pub short_break_sessions: u32,
    pub long_break_sessions: u32,
    /// Minutes of completed work sessions; breaks do not count.
    pub focus_minutes: u32,
    pub tasks_completed: u32,
    pub reminders_shown: u32,
    pub reminders_completed: u32,
    /// Trailing run of consecutive completed work sessions within the day.
    pub streak: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeeklyStats {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_sessions: u32,
    pub total_focus_minutes: u32,
    pub total_tasks_completed: u32,
    pub average_sessions_per_day: f64,
    pub best_day: NaiveDate,
    pub daily: Vec<DailyStats>,
}

/// Seven-calendar-day slice of a month, counted from the 1st. Not aligned to
/// Sunday weeks; the last bucket of a month may be short.
#[derive(Clone, Debug, PartialEq)]
pub struct WeekBucket {
    pub start: NaiveDate,
    pub sessions: u32,
    pub focus_minutes: u32,
    pub tasks_completed: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyStats {
    pub year: i32,
    pub month: u32,
    pub total_sessions: u32,
    pub total_focus_minutes: u32,
    pub total_tasks_completed: u32,
    pub average_sessions_per_day: f64,
    pub best_day: NaiveDate,
    pub daily: Vec<DailyStats>,
    pub weekly: Vec<WeekBucket>,
}

/// Aggregates one local calendar day from the raw logs.
pub fn daily(
    date: NaiveDate,
    sessions: &[Session],
    tasks: &[Task],
    completions: &[ReminderCompletion],
) -> DailyStats {
    let (start, end) = dates::day_bounds(date);
    let in_window = |ms: i64| ms >= start && ms < end;

    let day_sessions: Vec<&Session> = sessions
        .iter()
        .filter(|s| in_window(s.timestamp))
        .collect();

    let count_kind = |kind: SessionType| day_sessions.iter().filter(|s| s.kind == kind).count() as u32;

    let focus_minutes = day_sessions
        .iter()
        .filter(|s| s.kind == SessionType::Work)
        .map(|s| s.duration)
        .sum();

    // Plain tasks count by their terminal completion; recurring and spaced
    // tasks by the day of their last completion/review.
    let tasks_completed = tasks
        .iter()
        .filter(|t| {
            t.completed_at.is_some_and(in_window)
                || t.recurring
                    .as_ref()
                    .filter(|r| r.enabled)
                    .and_then(|r| r.last_completed)
                    .is_some_and(in_window)
                || t.spaced_repetition
                    .as_ref()
                    .filter(|s| s.enabled)
                    .and_then(|s| s.last_reviewed)
                    .is_some_and(in_window)
        })
        .count() as u32;

    let reminders_shown = day_sessions
        .iter()
        .map(|s| s.break_reminders_shown.len() as u32)
        .sum();

    let reminders_completed = completions
        .iter()
        .filter(|c| in_window(c.completed_at))
        .count() as u32;

    // Most recent work sessions first; stop at the first incomplete one.
    let mut work: Vec<&&Session> = day_sessions
        .iter()
        .filter(|s| s.kind == SessionType::Work)
        .collect();
    work.sort_by_key(|s| std::cmp::Reverse(s.timestamp));
    let streak = work.iter().take_while(|s| s.completed).count() as u32;

    DailyStats {
        date,
        sessions: day_sessions.len() as u32,
        work_sessions: count_kind(SessionType::Work),
        short_break_sessions: count_kind(SessionType::ShortBreak),
        long_break_sessions: count_kind(SessionType::LongBreak),
        focus_minutes,
        tasks_completed,
        reminders_shown,
        reminders_completed,
        streak,
    }
}

/// Sunday-to-Saturday week containing `date`.
pub fn weekly(
    date: NaiveDate,
    sessions: &[Session],
    tasks: &[Task],
    completions: &[ReminderCompletion],
) -> WeeklyStats {
    let week_start = dates::week_start(date);
    let days: Vec<DailyStats> = (0..7)
        .map(|i| {
            daily(
                week_start + chrono::Duration::days(i),
                sessions,
                tasks,
                completions,
            )
        })
        .collect();
    summarize_week(week_start, days)
}

fn summarize_week(week_start: NaiveDate, days: Vec<DailyStats>) -> WeeklyStats {
    let total_sessions: u32 = days.iter().map(|d| d.sessions).sum();
    let mut best_day = week_start;
    let mut best = 0;
    for d in &days {
        if d.sessions > best {
            best = d.sessions;
            best_day = d.date;
        }
    }
    WeeklyStats {
        week_start,
        week_end: week_start + chrono::Duration::days(6),
        total_sessions,
        total_focus_minutes: days.iter().map(|d| d.focus_minutes).sum(),
        total_tasks_completed: days.iter().map(|d| d.tasks_completed).sum(),
        average_sessions_per_day: f64::from(total_sessions) / 7.0,
        best_day,
        daily: days,
    }
}

pub fn monthly(
    year: i32,
    month: u32,
    sessions: &[Session],
    tasks: &[Task],
    completions: &[ReminderCompletion],
) -> MonthlyStats {
    let day_count = dates::days_in_month(year, month);
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or_else(|| dates::local_date_of(dates::now_ms()).with_day(1).unwrap_or_default());

    let days: Vec<DailyStats> = (0..day_count)
        .map(|i| daily(first + chrono::Duration::days(i64::from(i)), sessions, tasks, completions))
        .collect();

    let total_sessions: u32 = days.iter().map(|d| d.sessions).sum();
    let mut best_day = first;
    let mut best = 0;
    for d in &days {
        if d.sessions > best {
            best = d.sessions;
            best_day = d.date;
        }
    }

    let weekly = days
        .chunks(7)
        .map(|chunk| WeekBucket {
            start: chunk[0].date,
            sessions: chunk.iter().map(|d| d.sessions).sum(),
            focus_minutes: chunk.iter().map(|d| d.focus_minutes).sum(),
            tasks_completed: chunk.iter().map(|d| d.tasks_completed).sum(),
        })
        .collect();

    MonthlyStats {
        year,
        month,
        total_sessions,
        total_focus_minutes: days.iter().map(|d| d.focus_minutes).sum(),
        total_tasks_completed: days.iter().map(|d| d.tasks_completed).sum(),
        average_sessions_per_day: f64::from(total_sessions) / f64::from(day_count.max(1)),
        best_day,
        daily: days,
        weekly,
    }
}

/// Percentage, zero when nothing was attempted.
pub fn completion_rate(completed: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(completed) / f64::from(total) * 100.0
    }
}

/// Longest run after the cap is irrelevant; the cap guards against corrupted
/// date sequences producing a runaway scan.
const STREAK_CAP: u32 = 365;

/// Consecutive calendar days with at least one session, counting backward
/// from today, or from yesterday when today is still empty.
pub fn current_streak(sessions: &[Session], today: NaiveDate) -> u32 {
    let active: std::collections::HashSet<NaiveDate> = sessions
        .iter()
        .map(|s| dates::local_date_of(s.timestamp))
        .collect();

    let mut cursor = if active.contains(&today) {
        today
    } else {
        today - chrono::Duration::days(1)
    };
    let mut streak = 0;
    while active.contains(&cursor) && streak < STREAK_CAP {
        streak += 1;
        cursor -= chrono::Duration::days(1);
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Task, prefixed_id};
    use crate::schedule;

    fn session_at(date: NaiveDate, minute_offset: i64, kind: SessionType, duration: u32) -> Session {
        let (start, _) = dates::day_bounds(date);
        Session {
            id: prefixed_id("session"),
            kind,
            duration,
            completed: true,
            timestamp: start + minute_offset * 60_000,
            task_id: None,
            break_reminders_shown: Vec::new(),
            break_reminders_completed: Vec::new(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn focus_time_sums_work_sessions_in_window_only() {
        let date = day(2025, 6, 11);
        let sessions = vec![
            session_at(date, 60, SessionType::Work, 25),
            session_at(date, 120, SessionType::Work, 25),
            session_at(date, 180, SessionType::ShortBreak, 5),
            session_at(date, 240, SessionType::LongBreak, 15),
            session_at(day(2025, 6, 12), 60, SessionType::Work, 25),
        ];
        let stats = daily(date, &sessions, &[], &[]);
        assert_eq!(stats.focus_minutes, 50);
        assert_eq!(stats.sessions, 4);
        assert_eq!(stats.work_sessions, 2);
        assert_eq!(stats.short_break_sessions, 1);
        assert_eq!(stats.long_break_sessions, 1);
    }

    #[test]
    fn daily_counts_task_completions_of_all_kinds() {
        let date = day(2025, 6, 11);
        let (start, _) = dates::day_bounds(date);
        let noon = start + 12 * 3_600_000;

        let plain = schedule::complete_task(&Task::new("plain"), noon);
        let recurring = schedule::complete_task(
            &Task::new("daily").with_recurring(crate::model::Recurring {
                enabled: true,
                pattern: crate::model::RecurrencePattern::Daily,
                interval: 1,
                days_of_week: None,
                day_of_month: None,
                weekly_pattern: None,
                monthly_pattern: None,
                next_due: noon,
                last_completed: None,
            }),
            noon,
        );
        let spaced = schedule::complete_task(
            &Task::new("cards").with_spaced_repetition(Difficulty::Medium),
            noon,
        );
        let untouched = Task::new("untouched");
        let other_day = schedule::complete_task(&Task::new("yesterday"), noon - 24 * 3_600_000);

        let tasks = vec![plain, recurring, spaced, untouched, other_day];
        let stats = daily(date, &[], &tasks, &[]);
        assert_eq!(stats.tasks_completed, 3);
    }

    #[test]
    fn daily_streak_stops_at_incomplete_work_session() {
        let date = day(2025, 6, 11);
        let mut abandoned = session_at(date, 120, SessionType::Work, 25);
        abandoned.completed = false;
        let sessions = vec![
            session_at(date, 60, SessionType::Work, 25),
            abandoned,
            session_at(date, 180, SessionType::Work, 25),
            session_at(date, 240, SessionType::Work, 25),
        ];
        let stats = daily(date, &sessions, &[], &[]);
        assert_eq!(stats.streak, 2);
    }

    #[test]
    fn daily_reminder_counters() {
        let date = day(2025, 6, 11);
        let (start, _) = dates::day_bounds(date);
        let mut brk = session_at(date, 60, SessionType::ShortBreak, 5);
        brk.break_reminders_shown = vec!["r1".into(), "r2".into()];
        let completions = vec![
            crate::model::ReminderCompletion::new("r1", &brk.id, crate::model::BreakKind::Short, start + 61 * 60_000),
        ];
        let stats = daily(date, &[brk], &[], &completions);
        assert_eq!(stats.reminders_shown, 2);
        assert_eq!(stats.reminders_completed, 1);
    }

    #[test]
    fn weekly_totals_equal_sum_of_daily_parts() {
        // Week of Sunday 2025-06-08 .. Saturday 2025-06-14.
        let mut sessions = Vec::new();
        for (d, n) in [(8, 2u32), (9, 3), (11, 1), (14, 4)] {
            for i in 0..n {
                sessions.push(session_at(day(2025, 6, d), 60 + i64::from(i) * 30, SessionType::Work, 25));
            }
        }
        sessions.push(session_at(day(2025, 6, 9), 300, SessionType::ShortBreak, 5));

        let week = weekly(day(2025, 6, 11), &sessions, &[], &[]);
        assert_eq!(week.week_start, day(2025, 6, 8));
        assert_eq!(week.week_end, day(2025, 6, 14));
        assert_eq!(week.daily.len(), 7);

        let sum_sessions: u32 = week.daily.iter().map(|d| d.sessions).sum();
        let sum_focus: u32 = week.daily.iter().map(|d| d.focus_minutes).sum();
        let sum_tasks: u32 = week.daily.iter().map(|d| d.tasks_completed).sum();
        assert_eq!(week.total_sessions, sum_sessions);
        assert_eq!(week.total_focus_minutes, sum_focus);
        assert_eq!(week.total_tasks_completed, sum_tasks);
        assert_eq!(week.total_sessions, 11);
        assert!((week.average_sessions_per_day - 11.0 / 7.0).abs() < 1e-9);
        assert_eq!(week.best_day, day(2025, 6, 14));
    }

    #[test]
    fn weekly_best_day_tie_resolves_to_earliest() {
        let sessions = vec![
            session_at(day(2025, 6, 9), 60, SessionType::Work, 25),
            session_at(day(2025, 6, 12), 60, SessionType::Work, 25),
        ];
        let week = weekly(day(2025, 6, 11), &sessions, &[], &[]);
        assert_eq!(week.best_day, day(2025, 6, 9));
    }

    #[test]
    fn monthly_buckets_are_seven_calendar_days_from_the_first() {
        let sessions = vec![
            session_at(day(2025, 6, 1), 60, SessionType::Work, 25),
            session_at(day(2025, 6, 8), 60, SessionType::Work, 25),
            session_at(day(2025, 6, 30), 60, SessionType::Work, 25),
        ];
        let month = monthly(2025, 6, &sessions, &[], &[]);
        assert_eq!(month.daily.len(), 30);
        // 30 days: four full buckets plus a 2-day tail.
        assert_eq!(month.weekly.len(), 5);
        assert_eq!(month.weekly[0].start, day(2025, 6, 1));
        assert_eq!(month.weekly[4].start, day(2025, 6, 29));
        assert_eq!(month.weekly[0].sessions, 1);
        assert_eq!(month.weekly[1].sessions, 1);
        assert_eq!(month.weekly[4].sessions, 1);

        let bucket_total: u32 = month.weekly.iter().map(|w| w.sessions).sum();
        assert_eq!(bucket_total, month.total_sessions);
        assert!((month.average_sessions_per_day - 3.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn completion_rate_never_divides_by_zero() {
        assert_eq!(completion_rate(0, 0), 0.0);
        assert_eq!(completion_rate(3, 4), 75.0);
        assert_eq!(completion_rate(4, 4), 100.0);
    }

    #[test]
    fn streak_counts_back_from_today() {
        let today = day(2025, 6, 11);
        let sessions = vec![
            session_at(day(2025, 6, 9), 60, SessionType::Work, 25),
            session_at(day(2025, 6, 10), 60, SessionType::Work, 25),
            session_at(today, 60, SessionType::Work, 25),
        ];
        assert_eq!(current_streak(&sessions, today), 3);
    }

    #[test]
    fn streak_starts_yesterday_when_today_is_empty() {
        let today = day(2025, 6, 11);
        let sessions = vec![
            session_at(day(2025, 6, 9), 60, SessionType::Work, 25),
            session_at(day(2025, 6, 10), 60, SessionType::Work, 25),
        ];
        assert_eq!(current_streak(&sessions, today), 2);
    }

    #[test]
    fn streak_breaks_on_a_gap() {
        let today = day(2025, 6, 11);
        let sessions = vec![
            session_at(day(2025, 6, 7), 60, SessionType::Work, 25),
            session_at(day(2025, 6, 10), 60, SessionType::Work, 25),
            session_at(today, 60, SessionType::Work, 25),
        ];
        assert_eq!(current_streak(&sessions, today), 2);
    }

    #[test]
    fn streak_is_capped() {
        let today = day(2026, 6, 11);
        let sessions: Vec<Session> = (0..400)
            .map(|i| session_at(today - chrono::Duration::days(i), 60, SessionType::Work, 25))
            .collect();
        assert_eq!(current_streak(&sessions, today), 365);
    }

    #[test]
    fn daily_goal_reached_exactly_at_nth_completion() {
        let date = day(2025, 6, 11);
        let goal = 8u32;
        let mut sessions = Vec::new();
        for i in 0..goal {
            sessions.push(session_at(date, 30 + i64::from(i) * 30, SessionType::Work, 25));
            let stats = daily(date, &sessions, &[], &[]);
            if i + 1 < goal {
                assert!(stats.sessions < goal);
            } else {
                assert_eq!(stats.sessions, goal);
                assert!(stats.sessions >= goal);
            }
        }
    }
}
