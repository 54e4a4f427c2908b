//! JSON-file persistence. One pretty-printed file per collection under a
//! single data directory; reads tolerate missing or malformed files by
//! falling back to defaults so a bad disk state never blocks the timer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::model::{BreakReminder, ReminderCompletion, Session, Task};
use crate::reminders;
use crate::settings::Settings;
use crate::timer::TimerSnapshot;

const SETTINGS_FILE: &str = "settings.json";
const SESSIONS_FILE: &str = "sessions.json";
const TASKS_FILE: &str = "tasks.json";
const REMINDERS_FILE: &str = "reminders.json";
const COMPLETIONS_FILE: &str = "reminder_completions.json";
const TIMER_FILE: &str = "timer.json";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("data directory unavailable: {0}")]
    Io(#[from] io::Error),
    #[error("serialize failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Mirror for writes, called after the local file has been updated. Failures
/// are logged and swallowed; local data is the source of truth and a dead
/// mirror must never block or corrupt it.
pub trait SyncSink {
    fn publish(&self, collection: &str, json: &str) -> Result<(), Box<dyn std::error::Error>>;
}

/// Default sink: no mirroring.
pub struct NoSync;

impl SyncSink for NoSync {
    fn publish(&self, _collection: &str, _json: &str) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

pub struct Store {
    dir: PathBuf,
    sink: Box<dyn SyncSink>,
}

impl Store {
    /// Opens the store at the platform data directory, creating it on first
    /// run.
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = default_data_dir();
        Self::open(dir)
    }

    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            sink: Box::new(NoSync),
        })
    }

    pub fn with_sink(mut self, sink: Box<dyn SyncSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_settings(&self) -> Settings {
        self.load_or_default::<Settings>(SETTINGS_FILE).sanitized()
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.save(SETTINGS_FILE, settings)
    }

    pub fn load_sessions(&self) -> Vec<Session> {
        self.load_or_default(SESSIONS_FILE)
    }

    /// Appends one completed session to the history file.
    pub fn append_session(
        &self,
        sessions: &mut Vec<Session>,
        session: Session,
    ) -> Result<(), StoreError> {
        sessions.push(session);
        self.save(SESSIONS_FILE, sessions)
    }

    pub fn load_tasks(&self) -> Vec<Task> {
        self.load_or_default(TASKS_FILE)
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        self.save(TASKS_FILE, &tasks)
    }

    /// Loads reminders, installing the starter set the first time the
    /// collection is empty. An explicitly emptied collection stays empty on
    /// disk only if the file holds `[]`; that distinction is preserved by
    /// seeding only when the file is absent.
    pub fn load_reminders(&self) -> Vec<BreakReminder> {
        let path = self.dir.join(REMINDERS_FILE);
        if !path.exists() {
            let seed = BreakReminder::default_seed();
            if let Err(err) = self.save(REMINDERS_FILE, &seed) {
                warn!(%err, "could not write reminder seed");
            }
            return seed;
        }
        self.load_or_default(REMINDERS_FILE)
    }

    pub fn save_reminders(&self, reminders: &[BreakReminder]) -> Result<(), StoreError> {
        self.save(REMINDERS_FILE, &reminders)
    }

    pub fn load_reminder_completions(&self) -> Vec<ReminderCompletion> {
        self.load_or_default(COMPLETIONS_FILE)
    }

    /// Appends a completion event, pruning entries past the retention window.
    pub fn append_reminder_completion(
        &self,
        completions: &mut Vec<ReminderCompletion>,
        completion: ReminderCompletion,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        reminders::push_completion(completions, completion, now_ms);
        self.save(COMPLETIONS_FILE, completions)
    }

    pub fn load_timer_snapshot(&self) -> Option<TimerSnapshot> {
        let path = self.dir.join(TIMER_FILE);
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(snap) => Some(snap),
            Err(err) => {
                warn!(%err, file = TIMER_FILE, "ignoring malformed timer snapshot");
                None
            }
        }
    }

    pub fn save_timer_snapshot(&self, snap: &TimerSnapshot) -> Result<(), StoreError> {
        self.save(TIMER_FILE, snap)
    }

    pub fn clear_timer_snapshot(&self) {
        let _ = fs::remove_file(self.dir.join(TIMER_FILE));
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, file: &str) -> T {
        let path = self.dir.join(file);
        match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(err) => {
                    warn!(%err, %file, "malformed data file, starting from defaults");
                    T::default()
                }
            },
            Err(_) => T::default(),
        }
    }

    fn save<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(self.dir.join(file), &json)?;
        if let Err(err) = self.sink.publish(file, &json) {
            warn!(%err, %file, "sync mirror rejected write");
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tomatino")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BreakKind, SessionType, prefixed_id};
    use std::cell::RefCell;

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        (dir, store)
    }

    fn session(ts: i64) -> Session {
        Session {
            id: prefixed_id("session"),
            kind: SessionType::Work,
            duration: 25,
            completed: true,
            timestamp: ts,
            task_id: None,
            break_reminders_shown: Vec::new(),
            break_reminders_completed: Vec::new(),
        }
    }

    #[test]
    fn missing_files_load_as_defaults() {
        let (_dir, store) = temp_store();
        assert_eq!(store.load_settings(), Settings::default());
        assert!(store.load_sessions().is_empty());
        assert!(store.load_tasks().is_empty());
        assert!(store.load_reminder_completions().is_empty());
        assert!(store.load_timer_snapshot().is_none());
    }

    #[test]
    fn malformed_files_load_as_defaults() {
        let (dir, store) = temp_store();
        fs::write(dir.path().join(SESSIONS_FILE), "{ not json").unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "[1,2,3]").unwrap();
        fs::write(dir.path().join(TIMER_FILE), "garbage").unwrap();
        assert!(store.load_sessions().is_empty());
        assert_eq!(store.load_settings(), Settings::default());
        assert!(store.load_timer_snapshot().is_none());
    }

    #[test]
    fn settings_roundtrip_is_sanitized_on_load() {
        let (dir, store) = temp_store();
        let bad = Settings {
            work_duration: 0,
            ..Settings::default()
        };
        // Bypass sanitize on write to simulate a hand-edited file.
        fs::write(
            dir.path().join(SETTINGS_FILE),
            serde_json::to_string_pretty(&bad).unwrap(),
        )
        .unwrap();
        assert_eq!(store.load_settings().work_duration, 25);

        let good = Settings {
            work_duration: 50,
            ..Settings::default()
        };
        store.save_settings(&good).unwrap();
        assert_eq!(store.load_settings(), good);
    }

    #[test]
    fn sessions_append_and_survive_reload() {
        let (_dir, store) = temp_store();
        let mut sessions = store.load_sessions();
        store.append_session(&mut sessions, session(1_000)).unwrap();
        store.append_session(&mut sessions, session(2_000)).unwrap();
        let reloaded = store.load_sessions();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded, sessions);
    }

    #[test]
    fn reminders_seed_only_when_file_is_absent() {
        let (_dir, store) = temp_store();
        let first = store.load_reminders();
        assert_eq!(first.len(), 4);

        // Emptying the collection sticks; no re-seed.
        store.save_reminders(&[]).unwrap();
        assert!(store.load_reminders().is_empty());
    }

    #[test]
    fn reminder_completions_respect_retention() {
        let (_dir, store) = temp_store();
        const DAY_MS: i64 = 24 * 60 * 60 * 1000;
        let now = 100 * DAY_MS;
        let mut log = store.load_reminder_completions();
        store
            .append_reminder_completion(
                &mut log,
                ReminderCompletion::new("r1", "s1", BreakKind::Short, now - 40 * DAY_MS),
                now - 40 * DAY_MS,
            )
            .unwrap();
        store
            .append_reminder_completion(
                &mut log,
                ReminderCompletion::new("r2", "s2", BreakKind::Long, now),
                now,
            )
            .unwrap();
        let reloaded = store.load_reminder_completions();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].reminder_id, "r2");
    }

    #[test]
    fn timer_snapshot_roundtrip_and_clear() {
        let (_dir, store) = temp_store();
        let snap = TimerSnapshot {
            kind: SessionType::ShortBreak,
            time_left_secs: 120,
            session_ordinal: 3,
            in_progress: true,
        };
        store.save_timer_snapshot(&snap).unwrap();
        let loaded = store.load_timer_snapshot().unwrap();
        assert_eq!(loaded.time_left_secs, 120);
        assert_eq!(loaded.session_ordinal, 3);
        assert!(loaded.in_progress);

        store.clear_timer_snapshot();
        assert!(store.load_timer_snapshot().is_none());
    }

    struct RecordingSink(RefCell<Vec<String>>);

    impl SyncSink for RecordingSink {
        fn publish(&self, collection: &str, _json: &str) -> Result<(), Box<dyn std::error::Error>> {
            self.0.borrow_mut().push(collection.to_string());
            Ok(())
        }
    }

    struct FailingSink;

    impl SyncSink for FailingSink {
        fn publish(&self, _collection: &str, _json: &str) -> Result<(), Box<dyn std::error::Error>> {
            Err("mirror offline".into())
        }
    }

    #[test]
    fn sink_sees_every_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path())
            .unwrap()
            .with_sink(Box::new(RecordingSink(RefCell::new(Vec::new()))));
        store.save_settings(&Settings::default()).unwrap();
        store.save_tasks(&[]).unwrap();
        // Writes landed on disk regardless of what the sink does.
        assert_eq!(store.load_settings(), Settings::default());
    }

    #[test]
    fn sink_failure_never_fails_the_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path())
            .unwrap()
            .with_sink(Box::new(FailingSink));
        store.save_settings(&Settings::default()).unwrap();
        assert_eq!(store.load_settings(), Settings::default());
    }
}
