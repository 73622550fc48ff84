//! Event domain model.
//!
//! # Responsibility
//! - Define the canonical scheduling unit and its user-editable draft.
//! - Provide interval helpers used by the rescheduling engine and views.
//!
//! # Invariants
//! - `id` is stable across edits and never reused for another event.
//! - `title` and `location` are non-blank.
//! - `end_time`, when set, must be later than `start_time`.
//! - `notification_lead_time` is never negative.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one event.
pub type EventId = Uuid;

/// Priority bucket shown as the list scope and on the progress screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Urgent,
    NotUrgent,
}

impl Category {
    /// Stable text form used by storage and the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::NotUrgent => "not_urgent",
        }
    }

    /// Parses the stable text form. Accepts `not-urgent` as an alias.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "urgent" => Some(Self::Urgent),
            "not_urgent" | "not-urgent" => Some(Self::NotUrgent),
            _ => None,
        }
    }
}

/// Validation failures for event fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    NilId,
    EmptyTitle,
    EmptyLocation,
    MissingEndTime,
    InvalidTimeWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    NegativeLeadTime {
        seconds: i64,
    },
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "event id must not be nil"),
            Self::EmptyTitle => write!(f, "event title must not be empty"),
            Self::EmptyLocation => write!(f, "event location must not be empty"),
            Self::MissingEndTime => write!(f, "event end time is required"),
            Self::InvalidTimeWindow { start, end } => write!(
                f,
                "event end time ({end}) must be later than start time ({start})"
            ),
            Self::NegativeLeadTime { seconds } => {
                write!(f, "notification lead time must not be negative ({seconds}s)")
            }
        }
    }
}

impl Error for EventValidationError {}

/// User-editable event fields used by create and edit flows.
///
/// A draft always carries an end time; only imported rows may lack one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub location: String,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub category: Category,
    pub notification_enabled: bool,
    pub notification_lead_time: Duration,
    pub completed: bool,
}

impl EventDraft {
    /// Creates a draft with notifications off and `completed = false`.
    ///
    /// `date` is derived from the UTC calendar day of `start_time`.
    pub fn new(
        title: impl Into<String>,
        location: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            location: location.into(),
            date: start_time.date_naive(),
            start_time,
            end_time,
            category: Category::NotUrgent,
            notification_enabled: false,
            notification_lead_time: Duration::zero(),
            completed: false,
        }
    }

    /// Checks required fields and the time window.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        validate_fields(
            &self.title,
            &self.location,
            self.start_time,
            Some(self.end_time),
            self.notification_lead_time,
        )
    }
}

/// Canonical scheduling record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub location: String,
    /// Calendar day used for day-view filtering.
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    /// Absent only for imported point events.
    pub end_time: Option<DateTime<Utc>>,
    pub category: Category,
    pub notification_enabled: bool,
    /// Serialized as whole seconds.
    #[serde(with = "lead_time_seconds")]
    pub notification_lead_time: Duration,
    pub completed: bool,
}

impl Event {
    /// Builds a validated event with a freshly generated id.
    pub fn new(draft: EventDraft) -> Result<Self, EventValidationError> {
        Self::with_id(Uuid::new_v4(), draft)
    }

    /// Builds a validated event with a caller-provided id.
    ///
    /// Used by import paths and by edits that must keep identity.
    pub fn with_id(id: EventId, draft: EventDraft) -> Result<Self, EventValidationError> {
        if id.is_nil() {
            return Err(EventValidationError::NilId);
        }
        draft.validate()?;
        Ok(Self {
            id,
            title: draft.title,
            location: draft.location,
            date: draft.date,
            start_time: draft.start_time,
            end_time: Some(draft.end_time),
            category: draft.category,
            notification_enabled: draft.notification_enabled,
            notification_lead_time: draft.notification_lead_time,
            completed: draft.completed,
        })
    }

    /// Validates a fully built record, e.g. one read back from storage.
    ///
    /// Unlike [`EventDraft::validate`], a missing end time is accepted here.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.id.is_nil() {
            return Err(EventValidationError::NilId);
        }
        validate_fields(
            &self.title,
            &self.location,
            self.start_time,
            self.end_time,
            self.notification_lead_time,
        )
    }

    /// Returns editable fields. A missing end time is filled with the start.
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            location: self.location.clone(),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_or_start(),
            category: self.category,
            notification_enabled: self.notification_enabled,
            notification_lead_time: self.notification_lead_time,
            completed: self.completed,
        }
    }

    /// Length of the event; zero when the end is missing or not after start.
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) if end > self.start_time => end - self.start_time,
            _ => Duration::zero(),
        }
    }

    /// End time, or the start time for point events.
    pub fn end_or_start(&self) -> DateTime<Utc> {
        self.end_time.unwrap_or(self.start_time)
    }

    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end_or_start() && end > self.start_time
    }

    /// Moment a reminder should fire.
    pub fn reminder_time(&self) -> DateTime<Utc> {
        self.start_time - self.notification_lead_time
    }
}

fn validate_fields(
    title: &str,
    location: &str,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    lead_time: Duration,
) -> Result<(), EventValidationError> {
    if title.trim().is_empty() {
        return Err(EventValidationError::EmptyTitle);
    }
    if location.trim().is_empty() {
        return Err(EventValidationError::EmptyLocation);
    }
    if let Some(end) = end {
        if end <= start {
            return Err(EventValidationError::InvalidTimeWindow { start, end });
        }
    }
    if lead_time < Duration::zero() {
        return Err(EventValidationError::NegativeLeadTime {
            seconds: lead_time.num_seconds(),
        });
    }
    Ok(())
}

mod lead_time_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        Ok(Duration::seconds(seconds))
    }
}
