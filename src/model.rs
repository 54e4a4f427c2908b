//! Data models: sessions, tasks, break reminders and their completion events.
//! Records are immutable values once persisted; updates return new values and
//! callers replace the stored copy.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates;

pub fn prefixed_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

// ============================================================================
// Sessions
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Self::ShortBreak | Self::LongBreak)
    }

    pub fn break_kind(&self) -> Option<BreakKind> {
        match self {
            Self::Work => None,
            Self::ShortBreak => Some(BreakKind::Short),
            Self::LongBreak => Some(BreakKind::Long),
        }
    }
}

/// A completed timer interval. Append-only history; never mutated after
/// creation, only filtered and aggregated for reads.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Session {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SessionType,
    /// Configured length in minutes for the type at creation time. Later
    /// settings changes never touch recorded sessions.
    pub duration: u32,
    pub completed: bool,
    /// Epoch ms at completion.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub break_reminders_shown: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub break_reminders_completed: Vec<String>,
}

// ============================================================================
// Tasks
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Spaced-repetition interval growth factor. `Hard` holds the interval
    /// constant, it never shrinks.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Easy => 2.5,
            Self::Medium => 1.3,
            Self::Hard => 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RecurrencePattern {
    Daily,
    Weekdays,
    Weekly,
    SpecificDays,
    Monthly,
    Custom,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WeeklyPattern {
    EveryWeek,
    EveryOtherWeek,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MonthlyPattern {
    SameDate,
    SameWeekday,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Recurring {
    pub enabled: bool,
    pub pattern: RecurrencePattern,
    /// Step for daily/weekly/monthly/custom patterns, in pattern units.
    pub interval: u32,
    /// 0-6, Sunday through Saturday, for the specific-days pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_pattern: Option<WeeklyPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_pattern: Option<MonthlyPattern>,
    /// Epoch ms of the next due instant.
    pub next_due: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpacedRepetition {
    pub enabled: bool,
    pub difficulty: Difficulty,
    /// Epoch ms of the next review instant.
    pub next_review_date: i64,
    pub review_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<i64>,
    /// Days until the next review, grown by the difficulty multiplier.
    pub interval: u32,
}

/// Focus sessions credited to a task on a single calendar date. The count
/// restarts from zero when the date changes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DailySessions {
    /// YYYY-MM-DD, local time.
    pub date: String,
    pub count: u32,
}

/// A unit of work, optionally recurring or spaced-repetition. The two
/// scheduling modes are mutually exclusive; the constructors enforce it and
/// the scheduler gives spaced repetition precedence on malformed input.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub sessions_completed: u32,
    pub estimated_sessions: u32,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_sessions: Option<DailySessions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<Recurring>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spaced_repetition: Option<SpacedRepetition>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: prefixed_id("task"),
            title: title.into(),
            description: None,
            completed: false,
            sessions_completed: 0,
            estimated_sessions: 0,
            created_at: dates::now_ms(),
            completed_at: None,
            archived_at: None,
            priority: None,
            category: None,
            daily_sessions: None,
            recurring: None,
            spaced_repetition: None,
        }
    }

    pub fn with_recurring(mut self, recurring: Recurring) -> Self {
        self.spaced_repetition = None;
        self.recurring = Some(recurring);
        self
    }

    /// Starts a review schedule at a one-day interval, first review tomorrow.
    pub fn with_spaced_repetition(mut self, difficulty: Difficulty) -> Self {
        self.recurring = None;
        self.spaced_repetition = Some(SpacedRepetition {
            enabled: true,
            difficulty,
            next_review_date: self.created_at + 24 * 60 * 60 * 1000,
            review_count: 0,
            last_reviewed: None,
            interval: 1,
        });
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring.as_ref().is_some_and(|r| r.enabled)
    }

    pub fn is_spaced(&self) -> bool {
        self.spaced_repetition.as_ref().is_some_and(|s| s.enabled)
    }

    pub fn is_plain(&self) -> bool {
        !self.is_recurring() && !self.is_spaced()
    }

    pub fn is_active(&self) -> bool {
        !self.completed && self.archived_at.is_none()
    }

    /// Credited focus sessions today, honoring the daily reset.
    pub fn sessions_today(&self, today: &str) -> u32 {
        match &self.daily_sessions {
            Some(d) if d.date == today => d.count,
            _ => 0,
        }
    }
}

// ============================================================================
// Break reminders
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    Short,
    Long,
}

/// Which breaks a reminder applies to.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReminderScope {
    Short,
    Long,
    Both,
}

impl ReminderScope {
    pub fn applies_to(&self, kind: BreakKind) -> bool {
        match self {
            Self::Both => true,
            Self::Short => kind == BreakKind::Short,
            Self::Long => kind == BreakKind::Long,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReminderCategory {
    Hydration,
    Movement,
    Rest,
    Custom,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    EveryBreak,
    #[serde(rename = "every-30min")]
    Every30Min,
    Hourly,
    #[serde(rename = "every-2hours")]
    Every2Hours,
    #[serde(rename = "every-3hours")]
    Every3Hours,
    Custom,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    Minutes,
    Hours,
    Breaks,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CustomFrequency {
    pub interval: u32,
    pub unit: FrequencyUnit,
}

/// A recurring prompt surfaced during breaks.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BreakReminder {
    pub id: String,
    pub title: String,
    pub description: String,
    pub break_type: ReminderScope,
    pub category: ReminderCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_category: Option<String>,
    pub enabled: bool,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_frequency: Option<CustomFrequency>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_shown: Option<i64>,
}

impl BreakReminder {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        break_type: ReminderScope,
        category: ReminderCategory,
        frequency: Frequency,
    ) -> Self {
        Self {
            id: prefixed_id("reminder"),
            title: title.into(),
            description: description.into(),
            break_type,
            category,
            custom_category: None,
            enabled: true,
            frequency,
            custom_frequency: None,
            created_at: dates::now_ms(),
            last_shown: None,
        }
    }

    /// Starter set installed when the reminder collection is first empty.
    pub fn default_seed() -> Vec<Self> {
        vec![
            Self::new(
                "Drink Water",
                "Stay hydrated! Take a sip of water.",
                ReminderScope::Both,
                ReminderCategory::Hydration,
                Frequency::Every30Min,
            ),
            Self::new(
                "Stretch",
                "Stand up and do some light stretching.",
                ReminderScope::Short,
                ReminderCategory::Movement,
                Frequency::EveryBreak,
            ),
            Self::new(
                "Deep Breathing",
                "Take 5 deep breaths to relax.",
                ReminderScope::Both,
                ReminderCategory::Rest,
                Frequency::Hourly,
            ),
            Self::new(
                "Walk Around",
                "Take a short walk to get your blood flowing.",
                ReminderScope::Long,
                ReminderCategory::Movement,
                Frequency::Every2Hours,
            ),
        ]
    }
}

/// Acknowledgement of a surfaced reminder. Append-only, retained 30 days.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReminderCompletion {
    pub id: String,
    pub reminder_id: String,
    pub completed_at: i64,
    pub session_id: String,
    pub break_type: BreakKind,
    pub user_interaction: bool,
}

impl ReminderCompletion {
    pub fn new(
        reminder_id: impl Into<String>,
        session_id: impl Into<String>,
        break_type: BreakKind,
        completed_at: i64,
    ) -> Self {
        Self {
            id: prefixed_id("completion"),
            reminder_id: reminder_id.into(),
            completed_at,
            session_id: session_id.into(),
            break_type,
            user_interaction: true,
        }
    }
}
