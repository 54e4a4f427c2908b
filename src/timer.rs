//! Countdown state machine: work / short break / long break, each idle,
//! running or paused. The composing layer calls [`Timer::tick`] once per
//! elapsed second while running; a completed countdown emits an immutable
//! [`Session`] record and the machine advances to the next session type.

use crate::model::{Session, SessionType, prefixed_id};
use crate::settings::Settings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Running,
    Paused,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct TimerSnapshot {
    pub kind: SessionType,
    pub time_left_secs: u64,
    pub session_ordinal: u32,
    pub in_progress: bool,
}

pub struct Timer {
    settings: Settings,
    kind: SessionType,
    activity: Activity,
    time_left_secs: u64,
    total_secs: u64,
    /// Ordinal of the current work session, 1-based. Drives the long-break
    /// cadence; breaks do not count.
    session_ordinal: u32,
    session_id: Option<String>,
    task_id: Option<String>,
    reminders_shown: Vec<String>,
    reminders_completed: Vec<String>,
}

impl Timer {
    pub fn new(settings: Settings) -> Self {
        let total = settings.duration_secs(SessionType::Work);
        Self {
            settings,
            kind: SessionType::Work,
            activity: Activity::Idle,
            time_left_secs: total,
            total_secs: total,
            session_ordinal: 1,
            session_id: None,
            task_id: None,
            reminders_shown: Vec::new(),
            reminders_completed: Vec::new(),
        }
    }

    pub fn kind(&self) -> SessionType {
        self.kind
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn time_left_secs(&self) -> u64 {
        self.time_left_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn session_ordinal(&self) -> u32 {
        self.session_ordinal
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        let elapsed = self.total_secs.saturating_sub(self.time_left_secs);
        (elapsed as f64 / self.total_secs as f64).clamp(0.0, 1.0)
    }

    /// New durations take effect on the next fresh countdown; an in-progress
    /// or paused session keeps the length it started with.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if self.activity == Activity::Idle {
            self.reset_countdown();
        }
    }

    pub fn select_task(&mut self, task_id: Option<String>) {
        self.task_id = task_id;
    }

    pub fn note_reminder_shown(&mut self, reminder_id: &str) {
        if !self.reminders_shown.iter().any(|r| r == reminder_id) {
            self.reminders_shown.push(reminder_id.to_string());
        }
    }

    pub fn note_reminder_completed(&mut self, reminder_id: &str) {
        if !self.reminders_completed.iter().any(|r| r == reminder_id) {
            self.reminders_completed.push(reminder_id.to_string());
        }
    }

    /// Begin or resume the countdown. The first start of a fresh session
    /// assigns its session id.
    pub fn start(&mut self) {
        match self.activity {
            Activity::Idle | Activity::Paused => {
                if self.session_id.is_none() {
                    self.session_id = Some(prefixed_id("session"));
                }
                self.activity = Activity::Running;
            }
            Activity::Running => {}
        }
    }

    /// Freeze the countdown without losing elapsed time.
    pub fn pause(&mut self) {
        if self.activity == Activity::Running {
            self.activity = Activity::Paused;
        }
    }

    /// Abandon the in-progress session: countdown back to full, session id
    /// discarded, no record emitted.
    pub fn stop(&mut self) {
        self.activity = Activity::Idle;
        self.session_id = None;
        self.reminders_shown.clear();
        self.reminders_completed.clear();
        self.reset_countdown();
    }

    /// Back to work/idle with the session counter at 1.
    pub fn reset(&mut self) {
        self.kind = SessionType::Work;
        self.session_ordinal = 1;
        self.stop();
    }

    /// Switch session type. A running or paused countdown is implicitly
    /// stopped first; nothing is recorded for it.
    pub fn change_kind(&mut self, kind: SessionType) {
        if self.activity != Activity::Idle {
            self.stop();
        }
        self.kind = kind;
        self.reset_countdown();
    }

    /// Advance the countdown by one second of running time. Returns the
    /// completed session record when the countdown reaches zero; the machine
    /// has already moved to the next session type by then.
    pub fn tick(&mut self, now_ms: i64) -> Option<Session> {
        if self.activity != Activity::Running {
            return None;
        }
        self.time_left_secs = self.time_left_secs.saturating_sub(1);
        if self.time_left_secs == 0 {
            return Some(self.complete(now_ms));
        }
        None
    }

    fn complete(&mut self, now_ms: i64) -> Session {
        let finished = self.kind;
        let record = Session {
            id: self
                .session_id
                .take()
                .unwrap_or_else(|| prefixed_id("session")),
            kind: finished,
            // Length this countdown started with; settings edits mid-session
            // never retroactively change the record.
            duration: (self.total_secs / 60) as u32,
            completed: true,
            timestamp: now_ms,
            task_id: match finished {
                SessionType::Work => self.task_id.clone(),
                _ => None,
            },
            break_reminders_shown: if finished.is_break() {
                std::mem::take(&mut self.reminders_shown)
            } else {
                Vec::new()
            },
            break_reminders_completed: if finished.is_break() {
                std::mem::take(&mut self.reminders_completed)
            } else {
                Vec::new()
            },
        };
        self.reminders_shown.clear();
        self.reminders_completed.clear();

        let auto_start = match finished {
            SessionType::Work => {
                // Long-break cadence runs off the work-session ordinal, not
                // elapsed session count including breaks.
                self.kind = if self.session_ordinal % self.settings.sessions_until_long_break == 0 {
                    SessionType::LongBreak
                } else {
                    SessionType::ShortBreak
                };
                self.settings.auto_start_breaks
            }
            SessionType::ShortBreak | SessionType::LongBreak => {
                self.kind = SessionType::Work;
                self.session_ordinal += 1;
                self.settings.auto_start_work
            }
        };

        self.reset_countdown();
        if auto_start {
            self.session_id = Some(prefixed_id("session"));
            self.activity = Activity::Running;
        } else {
            self.activity = Activity::Idle;
        }
        record
    }

    fn reset_countdown(&mut self) {
        self.total_secs = self.settings.duration_secs(self.kind);
        self.time_left_secs = self.total_secs;
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            kind: self.kind,
            time_left_secs: self.time_left_secs,
            session_ordinal: self.session_ordinal,
            in_progress: self.activity != Activity::Idle,
        }
    }

    /// Rebuild from a saved snapshot. An in-progress countdown comes back
    /// paused so no time elapses before the user confirms.
    pub fn restore(settings: Settings, snap: TimerSnapshot) -> Self {
        let mut timer = Self::new(settings);
        timer.kind = snap.kind;
        timer.session_ordinal = snap.session_ordinal.max(1);
        timer.reset_countdown();
        if snap.in_progress && snap.time_left_secs > 0 && snap.time_left_secs <= timer.total_secs {
            timer.time_left_secs = snap.time_left_secs;
            timer.session_id = Some(prefixed_id("session"));
            timer.activity = Activity::Paused;
        }
        timer
    }
}
