//! Drag gesture state machine.
//!
//! `Idle -> Dragging { source, candidate } -> Committing -> Idle`.
//! `finish` runs the engine over the current day view and commits the one
//! moved event to the store; `cancel` discards the candidate.

use crate::model::event::{Event, EventId};
use crate::repo::event_repo::EventRepository;
use crate::schedule::reschedule::{reschedule, RescheduleError};
use crate::store::event_store::{Committed, EventStore, StoreError};
use crate::view::day_view::DayFilter;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: usize,
        candidate: usize,
    },
    Committing,
}

/// Errors from driving a drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    NotDragging,
    AlreadyDragging,
    IndexOutOfRange { index: usize, len: usize },
    /// The day view no longer has the dragged event at `source`.
    ViewChanged { expected: EventId },
    Reschedule(RescheduleError),
    Store(StoreError),
}

impl Display for DragError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotDragging => write!(f, "no drag gesture in progress"),
            Self::AlreadyDragging => write!(f, "a drag gesture is already in progress"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is out of range for a view of {len} events")
            }
            Self::ViewChanged { expected } => {
                write!(f, "day view changed during drag of event {expected}")
            }
            Self::Reschedule(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DragError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Reschedule(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RescheduleError> for DragError {
    fn from(value: RescheduleError) -> Self {
        Self::Reschedule(value)
    }
}

impl From<StoreError> for DragError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// One drag gesture over a single day view.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: DragState,
    dragged: Option<EventId>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Starts dragging `view[source]`.
    pub fn begin(&mut self, view: &[Event], source: usize) -> Result<(), DragError> {
        if self.state != DragState::Idle {
            return Err(DragError::AlreadyDragging);
        }
        let event = view.get(source).ok_or(DragError::IndexOutOfRange {
            index: source,
            len: view.len(),
        })?;

        self.dragged = Some(event.id);
        self.state = DragState::Dragging {
            source,
            candidate: source,
        };
        debug!(
            "event=drag_begin module=schedule status=ok event_id={} source={source}",
            event.id
        );
        Ok(())
    }

    /// Records the position currently under the pointer.
    pub fn hover(&mut self, candidate: usize) -> Result<(), DragError> {
        match self.state {
            DragState::Dragging { source, .. } => {
                self.state = DragState::Dragging { source, candidate };
                Ok(())
            }
            _ => Err(DragError::NotDragging),
        }
    }

    /// Discards the gesture. The store is untouched.
    pub fn cancel(&mut self) {
        if self.state != DragState::Idle {
            debug!("event=drag_cancel module=schedule status=ok");
        }
        self.reset();
    }

    /// Runs the engine on the current day view and commits the moved event.
    ///
    /// Returns `Ok(None)` when the drop position equals the source. The
    /// session is back to `Idle` afterwards, whatever the outcome.
    pub fn finish<R: EventRepository>(
        &mut self,
        store: &mut EventStore<R>,
        filter: &DayFilter,
    ) -> Result<Option<Committed<Event>>, DragError> {
        let DragState::Dragging { source, candidate } = self.state else {
            return Err(DragError::NotDragging);
        };
        let dragged = self.dragged.ok_or(DragError::NotDragging)?;
        self.state = DragState::Committing;

        let outcome = commit(store, filter, dragged, source, candidate);
        self.reset();

        match &outcome {
            Ok(Some(committed)) => info!(
                "event=drag_commit module=schedule status=ok event_id={dragged} from={source} to={candidate} durable={}",
                committed.is_durable()
            ),
            Ok(None) => debug!("event=drag_commit module=schedule status=noop event_id={dragged}"),
            Err(err) => warn!(
                "event=drag_commit module=schedule status=rejected event_id={dragged} from={source} to={candidate} reason={err}"
            ),
        }
        outcome
    }

    fn reset(&mut self) {
        self.state = DragState::Idle;
        self.dragged = None;
    }
}

fn commit<R: EventRepository>(
    store: &mut EventStore<R>,
    filter: &DayFilter,
    dragged: EventId,
    source: usize,
    candidate: usize,
) -> Result<Option<Committed<Event>>, DragError> {
    let view = store.day_view(filter);
    match view.get(source) {
        Some(event) if event.id == dragged => {}
        _ => return Err(DragError::ViewChanged { expected: dragged }),
    }

    let updated = reschedule(&view, source, candidate)?;
    let moved = updated
        .iter()
        .find(|event| event.id == dragged)
        .ok_or(DragError::ViewChanged { expected: dragged })?;
    if view[source].start_time == moved.start_time && view[source].end_time == moved.end_time {
        return Ok(None);
    }

    Ok(Some(store.commit_reschedule(moved)?))
}
