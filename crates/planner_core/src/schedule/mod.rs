//! Interactive rescheduling.
//!
//! # Responsibility
//! - Compute a non-conflicting interval for an event dragged within a day view.
//! - Drive the drag gesture from begin to commit or discard.
//!
//! # Invariants
//! - The engine is pure: it never touches the store.
//! - Exactly one event's interval changes per accepted move.
//! - A rejected move leaves every interval unchanged.

pub mod drag;
pub mod reschedule;
