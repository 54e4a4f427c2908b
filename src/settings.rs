//! Timer configuration. Loaded from the store, overridable from the CLI,
//! always sanitized back to the 25/5/15/4 defaults when a field is unusable.

use serde::{Deserialize, Serialize};

use crate::model::SessionType;

pub const DEFAULT_WORK_MINS: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MINS: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINS: u32 = 15;
pub const DEFAULT_SESSIONS_UNTIL_LONG_BREAK: u32 = 4;
pub const DEFAULT_DAILY_SESSION_GOAL: u32 = 8;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Work session length in minutes.
    pub work_duration: u32,
    /// Short break length in minutes.
    pub short_break_duration: u32,
    /// Long break length in minutes.
    pub long_break_duration: u32,
    /// Work sessions between long breaks.
    pub sessions_until_long_break: u32,
    /// Enter the break already running when a work session completes.
    pub auto_start_breaks: bool,
    /// Enter work already running when a break completes.
    pub auto_start_work: bool,
    /// Desktop notifications on session completion and break reminders.
    pub notifications: bool,
    /// Work sessions per day considered a "goal reached" day.
    pub daily_session_goal: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_duration: DEFAULT_WORK_MINS,
            short_break_duration: DEFAULT_SHORT_BREAK_MINS,
            long_break_duration: DEFAULT_LONG_BREAK_MINS,
            sessions_until_long_break: DEFAULT_SESSIONS_UNTIL_LONG_BREAK,
            auto_start_breaks: false,
            auto_start_work: false,
            notifications: true,
            daily_session_goal: DEFAULT_DAILY_SESSION_GOAL,
        }
    }
}

impl Settings {
    /// Replaces zeroed or out-of-range fields with the documented defaults.
    /// Bad configuration never stops the timer.
    pub fn sanitized(mut self) -> Self {
        if self.work_duration == 0 || self.work_duration > 240 {
            self.work_duration = DEFAULT_WORK_MINS;
        }
        if self.short_break_duration == 0 || self.short_break_duration > 60 {
            self.short_break_duration = DEFAULT_SHORT_BREAK_MINS;
        }
        if self.long_break_duration == 0 || self.long_break_duration > 120 {
            self.long_break_duration = DEFAULT_LONG_BREAK_MINS;
        }
        if self.sessions_until_long_break == 0 || self.sessions_until_long_break > 10 {
            self.sessions_until_long_break = DEFAULT_SESSIONS_UNTIL_LONG_BREAK;
        }
        if self.daily_session_goal == 0 {
            self.daily_session_goal = DEFAULT_DAILY_SESSION_GOAL;
        }
        self
    }

    /// Configured length in minutes for a session type.
    pub fn duration_mins(&self, kind: SessionType) -> u32 {
        match kind {
            SessionType::Work => self.work_duration,
            SessionType::ShortBreak => self.short_break_duration,
            SessionType::LongBreak => self.long_break_duration,
        }
    }

    pub fn duration_secs(&self, kind: SessionType) -> u64 {
        u64::from(self.duration_mins(kind)) * 60
    }
}
