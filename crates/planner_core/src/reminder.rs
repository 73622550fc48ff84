//! Reminder requests handed to the notification collaborator.
//!
//! The core only computes *what* to schedule; delivery belongs to the
//! platform scheduler behind [`ReminderScheduler`].

use crate::model::event::{Event, EventId};
use chrono::{DateTime, Duration, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const REMINDER_TITLE: &str = "Event Reminder";
const REMINDER_ID_PREFIX: &str = "EventReminder_";

/// One-shot local alert request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub event_id: EventId,
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

impl ReminderRequest {
    /// Builds the request for `event`: fires `notification_lead_time` before
    /// the start.
    pub fn for_event(event: &Event) -> Self {
        Self {
            event_id: event.id,
            fire_at: event.reminder_time(),
            title: REMINDER_TITLE.to_string(),
            body: format!(
                "Your event '{}' is starting soon! {} left",
                event.title,
                format_lead_time(event.notification_lead_time)
            ),
        }
    }

    /// Platform identifier; rescheduling with the same id replaces the alert.
    pub fn identifier(&self) -> String {
        format!("{REMINDER_ID_PREFIX}{}", self.event_id)
    }
}

/// Formats a lead time as `N hour(s) M minute(s)`.
///
/// Durations under one minute read `Less than a minute`.
pub fn format_lead_time(lead: Duration) -> String {
    let hours = lead.num_hours();
    let minutes = lead.num_minutes() - hours * 60;
    let mut parts = Vec::new();

    if hours > 0 {
        parts.push(format!("{hours} hour{}", plural(hours)));
    }
    if minutes > 0 {
        parts.push(format!("{minutes} minute{}", plural(minutes)));
    }

    if parts.is_empty() {
        "Less than a minute".to_string()
    } else {
        parts.join(" ")
    }
}

fn plural(value: i64) -> &'static str {
    if value > 1 {
        "s"
    } else {
        ""
    }
}

/// Scheduler failure reported by the platform collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderError {
    message: String,
}

impl ReminderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "reminder scheduling failed: {}", self.message)
    }
}

impl Error for ReminderError {}

/// Notification-scheduling collaborator.
pub trait ReminderScheduler {
    fn schedule(&self, request: &ReminderRequest) -> Result<(), ReminderError>;
}
