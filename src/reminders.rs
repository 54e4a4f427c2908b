//! Break reminder scheduling: which reminders surface on a given break, and
//! the rolling retention window for their completion events.

use crate::model::{
    BreakKind, BreakReminder, Frequency, FrequencyUnit, ReminderCompletion,
};

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Completion events older than this are pruned whenever a new one is added.
pub const COMPLETION_RETENTION_DAYS: i64 = 30;

/// Minimum milliseconds between showings, or `None` for "every break".
/// A custom frequency in `breaks` units has no break-count tracking behind
/// it and collapses to every-break, as does a custom frequency left
/// unconfigured.
pub fn frequency_interval_ms(reminder: &BreakReminder) -> Option<i64> {
    match reminder.frequency {
        Frequency::EveryBreak => None,
        Frequency::Every30Min => Some(30 * MINUTE_MS),
        Frequency::Hourly => Some(HOUR_MS),
        Frequency::Every2Hours => Some(2 * HOUR_MS),
        Frequency::Every3Hours => Some(3 * HOUR_MS),
        Frequency::Custom => {
            let custom = reminder.custom_frequency?;
            match custom.unit {
                FrequencyUnit::Minutes => Some(i64::from(custom.interval) * MINUTE_MS),
                FrequencyUnit::Hours => Some(i64::from(custom.interval) * HOUR_MS),
                FrequencyUnit::Breaks => None,
            }
        }
    }
}

/// Whether a reminder should surface on a break starting now.
pub fn should_show(reminder: &BreakReminder, kind: BreakKind, now_ms: i64) -> bool {
    if !reminder.enabled || !reminder.break_type.applies_to(kind) {
        return false;
    }
    let Some(interval) = frequency_interval_ms(reminder) else {
        return true;
    };
    match reminder.last_shown {
        None => true,
        Some(last) => now_ms - last >= interval,
    }
}

/// Records the showing. Must be applied exactly once per surfaced instance,
/// however many UI surfaces display it, or the reminder re-prompts within
/// its own interval.
pub fn mark_shown(reminder: &BreakReminder, now_ms: i64) -> BreakReminder {
    let mut reminder = reminder.clone();
    reminder.last_shown = Some(now_ms);
    reminder
}

/// Appends a completion event and drops entries outside the retention
/// window.
pub fn push_completion(
    completions: &mut Vec<ReminderCompletion>,
    completion: ReminderCompletion,
    now_ms: i64,
) {
    completions.push(completion);
    let cutoff = now_ms - COMPLETION_RETENTION_DAYS * DAY_MS;
    completions.retain(|c| c.completed_at >= cutoff);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomFrequency, ReminderCategory, ReminderScope};

    fn reminder(frequency: Frequency, scope: ReminderScope) -> BreakReminder {
        BreakReminder::new(
            "Drink Water",
            "Stay hydrated",
            scope,
            ReminderCategory::Hydration,
            frequency,
        )
    }

    #[test]
    fn disabled_reminders_never_show() {
        let mut r = reminder(Frequency::EveryBreak, ReminderScope::Both);
        r.enabled = false;
        assert!(!should_show(&r, BreakKind::Short, 0));
    }

    #[test]
    fn scope_filters_break_kind() {
        let r = reminder(Frequency::EveryBreak, ReminderScope::Long);
        assert!(!should_show(&r, BreakKind::Short, 0));
        assert!(should_show(&r, BreakKind::Long, 0));
        let r = reminder(Frequency::EveryBreak, ReminderScope::Both);
        assert!(should_show(&r, BreakKind::Short, 0));
        assert!(should_show(&r, BreakKind::Long, 0));
    }

    #[test]
    fn every_break_ignores_last_shown() {
        let mut r = reminder(Frequency::EveryBreak, ReminderScope::Both);
        r.last_shown = Some(999_999_999);
        assert!(should_show(&r, BreakKind::Short, 1_000_000_000));
    }

    #[test]
    fn timed_frequency_waits_out_the_interval() {
        let mut r = reminder(Frequency::Every30Min, ReminderScope::Both);
        assert!(should_show(&r, BreakKind::Short, 0), "never shown before");

        r = mark_shown(&r, 1_000_000);
        assert_eq!(r.last_shown, Some(1_000_000));
        assert!(!should_show(&r, BreakKind::Short, 1_000_000 + 29 * MINUTE_MS));
        assert!(should_show(&r, BreakKind::Short, 1_000_000 + 30 * MINUTE_MS));
    }

    #[test]
    fn named_intervals() {
        let r = reminder(Frequency::Hourly, ReminderScope::Both);
        assert_eq!(frequency_interval_ms(&r), Some(HOUR_MS));
        let r = reminder(Frequency::Every2Hours, ReminderScope::Both);
        assert_eq!(frequency_interval_ms(&r), Some(2 * HOUR_MS));
        let r = reminder(Frequency::Every3Hours, ReminderScope::Both);
        assert_eq!(frequency_interval_ms(&r), Some(3 * HOUR_MS));
    }

    #[test]
    fn custom_minutes_and_hours() {
        let mut r = reminder(Frequency::Custom, ReminderScope::Both);
        r.custom_frequency = Some(CustomFrequency {
            interval: 45,
            unit: FrequencyUnit::Minutes,
        });
        assert_eq!(frequency_interval_ms(&r), Some(45 * MINUTE_MS));
        r.custom_frequency = Some(CustomFrequency {
            interval: 4,
            unit: FrequencyUnit::Hours,
        });
        assert_eq!(frequency_interval_ms(&r), Some(4 * HOUR_MS));
    }

    #[test]
    fn custom_breaks_unit_behaves_as_every_break() {
        let mut r = reminder(Frequency::Custom, ReminderScope::Both);
        r.custom_frequency = Some(CustomFrequency {
            interval: 3,
            unit: FrequencyUnit::Breaks,
        });
        r.last_shown = Some(0);
        assert_eq!(frequency_interval_ms(&r), None);
        assert!(should_show(&r, BreakKind::Long, 1));
    }

    #[test]
    fn unconfigured_custom_frequency_shows_every_break() {
        let r = reminder(Frequency::Custom, ReminderScope::Both);
        assert_eq!(frequency_interval_ms(&r), None);
        assert!(should_show(&r, BreakKind::Short, 0));
    }

    #[test]
    fn completions_prune_beyond_thirty_days() {
        let now = 100 * DAY_MS;
        let mut log = vec![
            ReminderCompletion::new("r1", "s1", BreakKind::Short, now - 31 * DAY_MS),
            ReminderCompletion::new("r1", "s2", BreakKind::Short, now - 30 * DAY_MS),
            ReminderCompletion::new("r1", "s3", BreakKind::Long, now - DAY_MS),
        ];
        push_completion(
            &mut log,
            ReminderCompletion::new("r2", "s4", BreakKind::Long, now),
            now,
        );
        assert_eq!(log.len(), 3);
        assert!(log.iter().all(|c| c.completed_at >= now - 30 * DAY_MS));
        assert!(log.iter().any(|c| c.reminder_id == "r2"));
    }
}
