//! Change listener registry.
//!
//! # Responsibility
//! - Decouple the event store from the views that mirror it.
//! - Deliver every canonical change to every subscriber, synchronously.
//!
//! # Invariants
//! - Delivery follows subscription order.
//! - A subscriber with interest `All` receives one replay notification at
//!   subscribe time carrying the full current set.
//! - A failing or panicking listener never blocks delivery to the rest.

use crate::model::event::Event;
use log::{debug, error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Kind of canonical mutation. Informational only: listeners receive the
/// full set regardless of kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Add,
    Remove,
    Update,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
        }
    }
}

/// Interest declared by a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenerKind {
    /// Every change, plus a replay on subscribe.
    #[default]
    All,
}

/// Error a listener may report from its callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ListenerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener failed: {}", self.message)
    }
}

impl Error for ListenerError {}

/// Capability implemented by views that mirror the event set.
pub trait ChangeListener {
    fn listener_kind(&self) -> ListenerKind {
        ListenerKind::All
    }

    fn on_change(&self, change: ChangeKind, events: &[Event]) -> Result<(), ListenerError>;
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

struct Registration {
    id: SubscriptionId,
    listener: Arc<dyn ChangeListener>,
}

/// Ordered set of change listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    registrations: Vec<Registration>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Registers a listener and replays `current` to it when its interest is
    /// `All`.
    pub fn subscribe(
        &mut self,
        listener: Arc<dyn ChangeListener>,
        current: &[Event],
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);

        if listener.listener_kind() == ListenerKind::All {
            deliver(id, listener.as_ref(), ChangeKind::Update, current);
        }

        self.registrations.push(Registration { id, listener });
        debug!(
            "event=listener_subscribe module=listener status=ok subscription={} listeners={}",
            id.0,
            self.registrations.len()
        );
        id
    }

    /// Removes a registration. Returns `false` when it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.registrations.len();
        self.registrations
            .retain(|registration| registration.id != id);
        let removed = self.registrations.len() != before;
        debug!(
            "event=listener_unsubscribe module=listener status=ok subscription={} removed={removed}",
            id.0
        );
        removed
    }

    /// Delivers `events` to every listener in subscription order.
    pub fn broadcast(&self, change: ChangeKind, events: &[Event]) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for registration in &self.registrations {
            if deliver(registration.id, registration.listener.as_ref(), change, events) {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }

        if report.failed > 0 {
            warn!(
                "event=listener_broadcast module=listener status=partial change={} delivered={} failed={}",
                change.as_str(),
                report.delivered,
                report.failed
            );
        } else {
            debug!(
                "event=listener_broadcast module=listener status=ok change={} delivered={} events={}",
                change.as_str(),
                report.delivered,
                events.len()
            );
        }
        report
    }
}

fn deliver(
    id: SubscriptionId,
    listener: &dyn ChangeListener,
    change: ChangeKind,
    events: &[Event],
) -> bool {
    match catch_unwind(AssertUnwindSafe(|| listener.on_change(change, events))) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            warn!(
                "event=listener_deliver module=listener status=error subscription={} change={} error={err}",
                id.0,
                change.as_str()
            );
            false
        }
        Err(_) => {
            error!(
                "event=listener_deliver module=listener status=panic subscription={} change={}",
                id.0,
                change.as_str()
            );
            false
        }
    }
}
