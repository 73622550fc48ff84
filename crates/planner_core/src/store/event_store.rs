//! Event store: CRUD over the canonical set with synchronous change fan-out.

use crate::listener::{ChangeKind, ChangeListener, ListenerRegistry, SubscriptionId};
use crate::model::event::{Event, EventDraft, EventId, EventValidationError};
use crate::reminder::{ReminderRequest, ReminderScheduler};
use crate::repo::event_repo::{EventRepository, RepoError, RepoResult};
use crate::view::day_view::{day_view, DayFilter};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store mutations. Both leave the canonical set untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(EventValidationError),
    NotFound(EventId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<EventValidationError> for StoreError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Result of a mutation that was applied in memory.
///
/// `persist_error` carries the write-through failure, if any, so callers can
/// warn the user that the change is not durable yet.
#[derive(Debug)]
#[must_use]
pub struct Committed<T> {
    pub value: T,
    pub persist_error: Option<RepoError>,
}

impl<T> Committed<T> {
    pub fn is_durable(&self) -> bool {
        self.persist_error.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Owner of the canonical event list.
pub struct EventStore<R: EventRepository> {
    repo: R,
    events: Vec<Event>,
    listeners: ListenerRegistry,
    reminders: Option<Arc<dyn ReminderScheduler>>,
}

impl<R: EventRepository> EventStore<R> {
    /// Creates an empty store; nothing is read from `repo`.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            events: Vec::new(),
            listeners: ListenerRegistry::new(),
            reminders: None,
        }
    }

    /// Creates a store hydrated from the repository's bulk fetch.
    pub fn load(repo: R) -> RepoResult<Self> {
        let events = repo.list_events().map_err(|err| {
            error!("event=store_load module=store status=error error={err}");
            err
        })?;
        info!(
            "event=store_load module=store status=ok events={}",
            events.len()
        );
        Ok(Self {
            events,
            ..Self::new(repo)
        })
    }

    /// Attaches the notification collaborator used after create/edit.
    pub fn with_reminders(mut self, scheduler: Arc<dyn ReminderScheduler>) -> Self {
        self.reminders = Some(scheduler);
        self
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Snapshot of every event. Order is unspecified; sort before display.
    pub fn all(&self) -> Vec<Event> {
        self.events.clone()
    }

    pub fn get(&self, id: EventId) -> Option<Event> {
        self.position(id).map(|index| self.events[index].clone())
    }

    /// Filtered, time-ordered view for one day.
    pub fn day_view(&self, filter: &DayFilter) -> Vec<Event> {
        day_view(&self.events, filter)
    }

    /// Registers a listener; it immediately receives the current set.
    pub fn subscribe(&mut self, listener: Arc<dyn ChangeListener>) -> SubscriptionId {
        self.listeners.subscribe(listener, &self.events)
    }

    /// Idempotent removal of a listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Validates `draft`, assigns a fresh id and appends the event.
    pub fn create(&mut self, draft: EventDraft) -> StoreResult<Committed<Event>> {
        let event = Event::new(draft).map_err(|err| {
            warn!("event=event_create module=store status=rejected reason={err}");
            StoreError::from(err)
        })?;

        self.events.push(event.clone());
        let persist_error = self.persist("event_create", event.id, |repo| {
            repo.create_event(&event).map(|_| ())
        });
        info!("event=event_create module=store status=ok event_id={}", event.id);

        self.listeners.broadcast(ChangeKind::Add, &self.events);
        self.request_reminder(&event);
        Ok(Committed {
            value: event,
            persist_error,
        })
    }

    /// Overwrites every editable field of `id`, keeping its identity.
    pub fn update(&mut self, id: EventId, draft: EventDraft) -> StoreResult<Committed<Event>> {
        let index = self.require(id)?;
        let event = Event::with_id(id, draft).map_err(|err| {
            warn!("event=event_update module=store status=rejected event_id={id} reason={err}");
            StoreError::from(err)
        })?;

        let committed = self.replace(index, event, "event_update");
        self.request_reminder(&committed.value);
        Ok(committed)
    }

    /// Marks `id` complete or incomplete. Completed events cannot be dragged.
    pub fn set_completed(&mut self, id: EventId, completed: bool) -> StoreResult<Committed<Event>> {
        let index = self.require(id)?;
        let mut event = self.events[index].clone();
        event.completed = completed;
        Ok(self.replace(index, event, "event_complete"))
    }

    /// Writes back the interval computed by the rescheduling engine.
    ///
    /// Only `start_time` and `end_time` are taken from `moved`.
    pub fn commit_reschedule(&mut self, moved: &Event) -> StoreResult<Committed<Event>> {
        let index = self.require(moved.id)?;
        let mut event = self.events[index].clone();
        event.start_time = moved.start_time;
        event.end_time = moved.end_time;
        event.validate()?;

        let committed = self.replace(index, event, "event_reschedule");
        self.request_reminder(&committed.value);
        Ok(committed)
    }

    /// Removes `id`. Absent ids are a silent no-op and broadcast nothing.
    pub fn delete(&mut self, id: EventId) -> Committed<Option<Event>> {
        let Some(index) = self.position(id) else {
            info!("event=event_delete module=store status=noop event_id={id}");
            return Committed {
                value: None,
                persist_error: None,
            };
        };

        let removed = self.events.remove(index);
        let persist_error = self.persist("event_delete", id, |repo| repo.delete_event(id));
        info!("event=event_delete module=store status=ok event_id={id}");

        self.listeners.broadcast(ChangeKind::Remove, &self.events);
        Committed {
            value: Some(removed),
            persist_error,
        }
    }

    fn replace(
        &mut self,
        index: usize,
        event: Event,
        operation: &'static str,
    ) -> Committed<Event> {
        self.events[index] = event.clone();
        let persist_error = self.persist(operation, event.id, |repo| repo.update_event(&event));
        info!(
            "event={operation} module=store status=ok event_id={}",
            event.id
        );

        self.listeners.broadcast(ChangeKind::Update, &self.events);
        Committed {
            value: event,
            persist_error,
        }
    }

    fn persist(
        &self,
        operation: &'static str,
        id: EventId,
        write: impl FnOnce(&R) -> RepoResult<()>,
    ) -> Option<RepoError> {
        match write(&self.repo) {
            Ok(()) => None,
            Err(err) => {
                error!(
                    "event={operation} module=store status=persist_failed event_id={id} error={err}"
                );
                Some(err)
            }
        }
    }

    fn request_reminder(&self, event: &Event) {
        if !event.notification_enabled {
            return;
        }
        let Some(scheduler) = self.reminders.as_ref() else {
            return;
        };

        let request = ReminderRequest::for_event(event);
        match scheduler.schedule(&request) {
            Ok(()) => info!(
                "event=reminder_schedule module=store status=ok event_id={} fire_at={}",
                event.id,
                request.fire_at.to_rfc3339()
            ),
            Err(err) => warn!(
                "event=reminder_schedule module=store status=error event_id={} error={err}",
                event.id
            ),
        }
    }

    fn position(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|event| event.id == id)
    }

    fn require(&self, id: EventId) -> StoreResult<usize> {
        self.position(id).ok_or_else(|| {
            warn!("event=event_lookup module=store status=not_found event_id={id}");
            StoreError::NotFound(id)
        })
    }
}
