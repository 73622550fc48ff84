//! Progress figures for one day: completion, category split, planned time.

use crate::model::event::{Category, Event};
use chrono::Duration;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Summary shown on the progress screen.
#[derive(Debug, Clone, PartialEq)]
pub struct DayProgress {
    pub total: usize,
    pub completed: usize,
    pub urgent: usize,
    pub not_urgent: usize,
    /// Sum of event durations; point events contribute nothing.
    pub planned: Duration,
}

impl DayProgress {
    pub fn from_events(events: &[Event]) -> Self {
        let mut progress = Self {
            total: events.len(),
            completed: 0,
            urgent: 0,
            not_urgent: 0,
            planned: Duration::zero(),
        };

        for event in events {
            if event.completed {
                progress.completed += 1;
            }
            match event.category {
                Category::Urgent => progress.urgent += 1,
                Category::NotUrgent => progress.not_urgent += 1,
            }
            progress.planned = progress.planned + event.duration();
        }

        progress
    }

    /// Completed share in `0.0..=1.0`; `0.0` for an empty day.
    pub fn completion_ratio(&self) -> f32 {
        ratio(self.completed, self.total)
    }

    /// Completion as a whole percentage, rounded down.
    pub fn completion_percent(&self) -> u32 {
        (self.completion_ratio() * 100.0) as u32
    }

    /// Urgent share of all categorized events.
    pub fn urgent_ratio(&self) -> f32 {
        ratio(self.urgent, self.urgent + self.not_urgent)
    }

    /// Planned time split as `(hours, minutes)`.
    pub fn planned_hours_minutes(&self) -> (i64, i64) {
        let minutes = self.planned.num_minutes();
        (minutes / 60, minutes % 60)
    }

    /// Planned time as a share of a 24-hour day.
    pub fn planned_day_fraction(&self) -> f32 {
        self.planned.num_minutes() as f32 / MINUTES_PER_DAY as f32
    }
}

fn ratio(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        0.0
    } else {
        part as f32 / whole as f32
    }
}
