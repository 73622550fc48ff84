//! Rescheduling engine.
//!
//! Given a day view ascending by start time, moves the event at `from` so it
//! lands at position `to`, placing it in the temporal gap between the
//! destination's pre-move neighbours.

use crate::model::event::{Event, EventId};
use crate::view::day_view::sort_by_start;
use chrono::{DateTime, Duration, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why a move was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RescheduleError {
    IndexOutOfRange { index: usize, len: usize },
    /// Completed events are frozen.
    Immutable(EventId),
    /// The computed interval overlaps `blocking`.
    Conflict { moving: EventId, blocking: EventId },
    /// The computed interval falls outside the representable time range.
    TimeOverflow(EventId),
}

impl Display for RescheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is out of range for a view of {len} events")
            }
            Self::Immutable(id) => write!(f, "completed event cannot be moved: {id}"),
            Self::Conflict { moving, blocking } => {
                write!(f, "event {moving} would overlap event {blocking}")
            }
            Self::TimeOverflow(id) => write!(f, "new time for event {id} is out of range"),
        }
    }
}

impl Error for RescheduleError {}

/// Moves `events[from]` to position `to` and returns the re-sorted view.
///
/// `to >= events.len()` on a downward move means "after the last event".
/// `to == from` returns the input unchanged.
///
/// # Errors
/// - `IndexOutOfRange` when `from` is not a valid index.
/// - `Immutable` when the moving event is completed.
/// - `Conflict` when the new interval overlaps any other event in the view.
pub fn reschedule(events: &[Event], from: usize, to: usize) -> Result<Vec<Event>, RescheduleError> {
    let len = events.len();
    let moving = events
        .get(from)
        .ok_or(RescheduleError::IndexOutOfRange { index: from, len })?;

    if moving.completed {
        return Err(RescheduleError::Immutable(moving.id));
    }

    let to = to.min(len - 1);
    if to == from {
        return Ok(events.to_vec());
    }

    let duration = moving.duration();
    let new_start = if to < from {
        upward_start(events, to, duration)
    } else {
        downward_start(events, to, duration)
    }
    .ok_or(RescheduleError::TimeOverflow(moving.id))?;
    let new_end = new_start
        .checked_add_signed(duration)
        .ok_or(RescheduleError::TimeOverflow(moving.id))?;

    if let Some(blocking) = find_conflict(events, from, new_start, new_end) {
        return Err(RescheduleError::Conflict {
            moving: moving.id,
            blocking: blocking.id,
        });
    }

    let mut updated = events.to_vec();
    let moved = &mut updated[from];
    moved.start_time = new_start;
    // Point events stay point events.
    moved.end_time = moved.end_time.map(|_| new_end);
    sort_by_start(&mut updated);
    Ok(updated)
}

/// First event other than `events[skip]` overlapping `[start, end)`.
pub fn find_conflict(
    events: &[Event],
    skip: usize,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<&Event> {
    events
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != skip)
        .map(|(_, event)| event)
        .find(|event| event.overlaps(start, end))
}

fn upward_start(events: &[Event], to: usize, duration: Duration) -> Option<DateTime<Utc>> {
    if to == 0 {
        return events[0].start_time.checked_sub_signed(duration);
    }
    let prev_end = events[to - 1].end_or_start();
    let next_start = events[to].start_time;
    centered_in_gap(prev_end, next_start, duration)
}

fn downward_start(events: &[Event], to: usize, duration: Duration) -> Option<DateTime<Utc>> {
    let prev_end = events[to].end_or_start();
    match events.get(to + 1) {
        // Downward moves anchor the end on the midpoint, then back off by the
        // duration.
        Some(next) => {
            centered_in_gap(prev_end, next.start_time, duration)?.checked_sub_signed(duration)
        }
        // Unbounded gap: the event becomes the latest, right after `prev_end`.
        None => Some(prev_end),
    }
}

fn centered_in_gap(
    prev_end: DateTime<Utc>,
    next_start: DateTime<Utc>,
    duration: Duration,
) -> Option<DateTime<Utc>> {
    let slack = (next_start - prev_end) - duration;
    prev_end.checked_add_signed(slack / 2)
}

#[cfg(test)]
mod tests {
    use super::{reschedule, RescheduleError};
    use crate::model::event::{Event, EventDraft};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, minute, 0).unwrap()
    }

    fn event(title: &str, start: (u32, u32), end: (u32, u32)) -> Event {
        Event::new(EventDraft::new(
            title,
            "office",
            at(start.0, start.1),
            at(end.0, end.1),
        ))
        .unwrap()
    }

    #[test]
    fn self_move_is_noop() {
        let events = vec![event("A", (9, 0), (10, 0)), event("B", (11, 0), (12, 0))];
        assert_eq!(reschedule(&events, 1, 1).unwrap(), events);
    }

    #[test]
    fn out_of_range_source_is_rejected() {
        let err = reschedule(&[], 0, 0).unwrap_err();
        assert_eq!(err, RescheduleError::IndexOutOfRange { index: 0, len: 0 });
    }

    #[test]
    fn point_event_keeps_missing_end() {
        let mut point = event("P", (15, 0), (15, 30));
        point.end_time = None;
        let events = vec![event("A", (9, 0), (10, 0)), point];

        let moved = reschedule(&events, 1, 0).unwrap();
        let p = moved.iter().find(|e| e.title == "P").unwrap();
        assert_eq!(p.start_time, at(9, 0));
        assert_eq!(p.end_time, None);
    }

    #[test]
    fn downward_move_anchors_end_on_midpoint() {
        let events = vec![
            event("A", (8, 0), (8, 30)),
            event("B", (9, 0), (10, 0)),
            event("C", (13, 0), (14, 0)),
        ];
        let moved = reschedule(&events, 0, 1).unwrap();
        let a = moved.iter().find(|e| e.title == "A").unwrap();
        assert_eq!(a.start_time, at(10, 45));
        assert_eq!(a.end_time, Some(at(11, 15)));
    }

    #[test]
    fn downward_past_end_places_after_last() {
        let events = vec![
            event("A", (8, 0), (8, 30)),
            event("B", (9, 0), (10, 0)),
            event("C", (10, 0), (11, 0)),
        ];
        let moved = reschedule(&events, 0, 7).unwrap();
        let a = moved.iter().find(|e| e.title == "A").unwrap();
        assert_eq!(a.start_time, at(11, 0));
        assert_eq!(a.end_time, Some(at(11, 30)));
        assert_eq!(moved[2].title, "A");
    }
}
