//! Application state: composes the timer, scheduler, reminders, stats and
//! store, and maps key events onto them. Persistence failures are logged and
//! never interrupt a running countdown.

use std::time::{Duration, Instant};

use crossterm::event::{self, KeyCode, KeyModifiers};
use notify_rust::{Notification, Urgency};
use tracing::warn;

use crate::dates;
use crate::model::{BreakReminder, ReminderCompletion, Session, SessionType, Task};
use crate::reminders;
use crate::schedule;
use crate::settings::Settings;
use crate::store::Store;
use crate::timer::{Activity, Timer};

const AUTO_SAVE_INTERVAL: Duration = Duration::from_secs(5);

#[derive(PartialEq, Clone, Copy)]
pub enum View {
    Timer,
    Tasks,
    Stats,
    Help,
}

#[derive(PartialEq, Clone, Copy)]
pub enum StatsRange {
    Daily,
    Weekly,
    Monthly,
}

impl StatsRange {
    fn next(self) -> Self {
        match self {
            Self::Daily => Self::Weekly,
            Self::Weekly => Self::Monthly,
            Self::Monthly => Self::Daily,
        }
    }
}

pub struct App {
    pub settings: Settings,
    pub timer: Timer,
    store: Store,
    pub sessions: Vec<Session>,
    pub tasks: Vec<Task>,
    pub reminders: Vec<BreakReminder>,
    pub completions: Vec<ReminderCompletion>,
    pub view: View,
    pub stats_range: StatsRange,
    pub task_cursor: usize,
    /// `Some` while the task title prompt is open.
    pub task_input: Option<String>,
    /// Reminder ids surfaced for the break in progress, in display order.
    pub due_reminders: Vec<String>,
    pub status: Option<String>,
    needs_save: bool,
    last_save: Instant,
    last_second: Instant,
}

impl App {
    pub fn new(store: Store, settings: Settings, resume: bool) -> Self {
        let sessions = store.load_sessions();
        let tasks = store.load_tasks();
        let reminders = store.load_reminders();
        let completions = store.load_reminder_completions();

        let timer = match store.load_timer_snapshot().filter(|_| resume) {
            Some(snap) => Timer::restore(settings.clone(), snap),
            None => Timer::new(settings.clone()),
        };

        Self {
            settings,
            timer,
            store,
            sessions,
            tasks,
            reminders,
            completions,
            view: View::Timer,
            stats_range: StatsRange::Daily,
            task_cursor: 0,
            task_input: None,
            due_reminders: Vec::new(),
            status: None,
            needs_save: false,
            last_save: Instant::now(),
            last_second: Instant::now(),
        }
    }

    // ------------------------------------------------------------------
    // Run loop hooks
    // ------------------------------------------------------------------

    /// Called every poll cycle; advances the countdown one second at a time.
    pub fn update(&mut self) {
        while self.last_second.elapsed() >= Duration::from_secs(1) {
            self.last_second += Duration::from_secs(1);
            let now = dates::now_ms();
            if let Some(session) = self.timer.tick(now) {
                self.on_session_complete(session, now);
            }
        }

        if self.needs_save && self.last_save.elapsed() >= AUTO_SAVE_INTERVAL {
            self.flush_tasks();
            self.last_save = Instant::now();
        }
    }

    pub fn save_on_quit(&mut self) {
        self.flush_tasks();
        if let Err(err) = self.store.save_settings(&self.settings) {
            warn!(%err, "could not save settings");
        }
        if let Err(err) = self.store.save_timer_snapshot(&self.timer.snapshot()) {
            warn!(%err, "could not save timer state");
        }
    }

    fn flush_tasks(&mut self) {
        match self.store.save_tasks(&self.tasks) {
            Ok(()) => self.needs_save = false,
            Err(err) => warn!(%err, "could not save tasks"),
        }
    }

    fn on_session_complete(&mut self, session: Session, now_ms: i64) {
        let kind = session.kind;
        let task_id = session.task_id.clone();
        if let Err(err) = self.store.append_session(&mut self.sessions, session) {
            warn!(%err, "could not record session");
        }

        match kind {
            SessionType::Work => {
                self.notify(
                    "Work session complete",
                    &format!("Time for a {}.", self.timer.kind().label().to_lowercase()),
                );
                if let Some(id) = task_id {
                    self.credit_focus_session(&id, now_ms);
                }
            }
            SessionType::ShortBreak | SessionType::LongBreak => {
                self.due_reminders.clear();
                self.notify("Break over", "Ready for the next work session.");
            }
        }

        // Auto-start may have rolled straight into a break.
        if self.timer.activity() == Activity::Running && self.timer.kind().is_break() {
            self.surface_break_reminders(now_ms);
        }

        let today = stats_sessions_today(&self.sessions, now_ms);
        if kind == SessionType::Work && today == self.settings.daily_session_goal {
            self.notify(
                "Daily goal reached",
                &format!("{today} work sessions today. Well done!"),
            );
        }
    }

    /// Adds a focus session to the task and completes it when the estimate
    /// is met.
    fn credit_focus_session(&mut self, task_id: &str, now_ms: i64) {
        let Some(idx) = self.tasks.iter().position(|t| t.id == task_id) else {
            return;
        };
        let mut task = schedule::record_focus_session(&self.tasks[idx], now_ms);
        if schedule::should_auto_complete(&task) && schedule::can_complete_today(&task, now_ms) {
            task = schedule::complete_task(&task, now_ms);
            self.status = Some(format!("Completed: {}", task.title));
            if task.is_plain() {
                self.timer.select_task(None);
            }
        }
        self.tasks[idx] = task;
        self.needs_save = true;
    }

    /// Picks the reminders due for a break that just started, records the
    /// showing exactly once and notifies.
    fn surface_break_reminders(&mut self, now_ms: i64) {
        let Some(kind) = self.timer.kind().break_kind() else {
            return;
        };
        self.due_reminders.clear();
        for i in 0..self.reminders.len() {
            if reminders::should_show(&self.reminders[i], kind, now_ms) {
                self.reminders[i] = reminders::mark_shown(&self.reminders[i], now_ms);
                self.due_reminders.push(self.reminders[i].id.clone());
                self.timer.note_reminder_shown(&self.reminders[i].id.clone());
                self.notify(&self.reminders[i].title.clone(), &self.reminders[i].description.clone());
            }
        }
        if !self.due_reminders.is_empty() {
            if let Err(err) = self.store.save_reminders(&self.reminders) {
                warn!(%err, "could not save reminders");
            }
        }
    }

    /// Number-key acknowledgement of the nth surfaced reminder, 1-based.
    fn complete_due_reminder(&mut self, n: usize) {
        if !self.timer.kind().is_break() || self.timer.activity() == Activity::Idle {
            return;
        }
        let Some(reminder_id) = self.due_reminders.get(n.wrapping_sub(1)).cloned() else {
            return;
        };
        let Some(kind) = self.timer.kind().break_kind() else {
            return;
        };
        let Some(session_id) = self.timer.session_id().map(String::from) else {
            return;
        };
        self.timer.note_reminder_completed(&reminder_id);
        let now = dates::now_ms();
        let completion = ReminderCompletion::new(reminder_id, session_id, kind, now);
        if let Err(err) =
            self.store
                .append_reminder_completion(&mut self.completions, completion, now)
        {
            warn!(%err, "could not record reminder completion");
        }
    }

    fn notify(&self, title: &str, body: &str) {
        if !self.settings.notifications {
            return;
        }
        let _ = Notification::new()
            .summary(title)
            .body(body)
            .appname("tomatino")
            .icon("alarm-clock")
            .urgency(Urgency::Normal)
            .show();
    }

    // ------------------------------------------------------------------
    // Timer controls
    // ------------------------------------------------------------------

    fn toggle_timer(&mut self) {
        match self.timer.activity() {
            Activity::Running => self.timer.pause(),
            Activity::Paused => self.timer.start(),
            Activity::Idle => {
                self.timer.start();
                if self.timer.kind().is_break() {
                    self.surface_break_reminders(dates::now_ms());
                }
            }
        }
    }

    fn skip_to_kind(&mut self, kind: SessionType) {
        self.due_reminders.clear();
        self.timer.change_kind(kind);
    }

    // ------------------------------------------------------------------
    // Task list
    // ------------------------------------------------------------------

    /// Indices of tasks shown in the list; archived tasks are hidden.
    pub fn visible_tasks(&self) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.archived_at.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    fn selected_task_index(&self) -> Option<usize> {
        self.visible_tasks().get(self.task_cursor).copied()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_task_index().map(|i| &self.tasks[i])
    }

    fn add_task(&mut self, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }
        self.tasks.push(Task::new(title));
        self.task_cursor = self.visible_tasks().len().saturating_sub(1);
        self.needs_save = true;
    }

    fn complete_selected(&mut self) {
        let Some(idx) = self.selected_task_index() else {
            return;
        };
        let now = dates::now_ms();
        let task = &self.tasks[idx];
        if task.completed {
            self.tasks[idx] = schedule::uncomplete_task(task);
        } else if schedule::can_complete_today(task, now) {
            self.tasks[idx] = schedule::complete_task(task, now);
        } else {
            self.status = Some(format!("Already done today: {}", task.title));
            return;
        }
        self.needs_save = true;
    }

    fn archive_selected(&mut self) {
        let Some(idx) = self.selected_task_index() else {
            return;
        };
        self.tasks[idx].archived_at = Some(dates::now_ms());
        if self.timer.task_id() == Some(self.tasks[idx].id.as_str()) {
            self.timer.select_task(None);
        }
        let visible = self.visible_tasks().len();
        self.task_cursor = self.task_cursor.min(visible.saturating_sub(1));
        self.needs_save = true;
    }

    fn select_for_timer(&mut self) {
        let Some(idx) = self.selected_task_index() else {
            return;
        };
        let id = self.tasks[idx].id.clone();
        if self.timer.task_id() == Some(id.as_str()) {
            self.timer.select_task(None);
        } else if self.tasks[idx].is_active() {
            self.timer.select_task(Some(id));
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, key: event::KeyEvent) -> bool {
        // Title prompt captures everything.
        if let Some(input) = self.task_input.as_mut() {
            match key.code {
                KeyCode::Char(c) => input.push(c),
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Enter => {
                    let title = self.task_input.take().unwrap_or_default();
                    self.add_task(&title);
                }
                KeyCode::Esc => self.task_input = None,
                _ => {}
            }
            return false;
        }

        if matches!(key.code, KeyCode::Char('q'))
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return true;
        }

        self.status = None;
        match self.view {
            View::Tasks => self.handle_tasks_key(key),
            _ => self.handle_main_key(key),
        }
        false
    }

    fn handle_main_key(&mut self, key: event::KeyEvent) {
        match key.code {
            KeyCode::Char(' ') => self.toggle_timer(),
            KeyCode::Char('s') => self.timer.stop(),
            KeyCode::Char('r') => {
                self.due_reminders.clear();
                self.timer.reset();
                self.store.clear_timer_snapshot();
            }
            KeyCode::Char('w') => self.skip_to_kind(SessionType::Work),
            KeyCode::Char('b') => self.skip_to_kind(SessionType::ShortBreak),
            KeyCode::Char('l') => self.skip_to_kind(SessionType::LongBreak),
            KeyCode::Char('t') => self.view = View::Tasks,
            KeyCode::Char('v') => {
                self.view = if self.view == View::Stats {
                    View::Timer
                } else {
                    View::Stats
                };
            }
            KeyCode::Tab => {
                if self.view == View::Stats {
                    self.stats_range = self.stats_range.next();
                }
            }
            KeyCode::Char('h') | KeyCode::Char('?') => {
                self.view = if self.view == View::Help {
                    View::Timer
                } else {
                    View::Help
                };
            }
            KeyCode::Esc => self.view = View::Timer,
            KeyCode::Char(c @ '1'..='9') => {
                self.complete_due_reminder(c as usize - '0' as usize);
            }
            _ => {}
        }
    }

    fn handle_tasks_key(&mut self, key: event::KeyEvent) {
        let visible = self.visible_tasks().len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('t') => self.view = View::Timer,
            KeyCode::Char('a') | KeyCode::Char('n') => self.task_input = Some(String::new()),
            KeyCode::Down | KeyCode::Char('j') => {
                if visible > 0 {
                    self.task_cursor = (self.task_cursor + 1).min(visible - 1);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.task_cursor = self.task_cursor.saturating_sub(1);
            }
            KeyCode::Enter => self.select_for_timer(),
            KeyCode::Char('c') => self.complete_selected(),
            KeyCode::Char('d') => self.archive_selected(),
            KeyCode::Char(' ') => self.toggle_timer(),
            _ => {}
        }
    }
}

/// Completed work sessions recorded today.
pub fn stats_sessions_today(sessions: &[Session], now_ms: i64) -> u32 {
    let today = dates::local_date_of(now_ms);
    sessions
        .iter()
        .filter(|s| s.kind == SessionType::Work && dates::in_day(s.timestamp, today))
        .count() as u32
}
