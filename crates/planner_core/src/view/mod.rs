//! Derived, read-only projections of the canonical event set.
//!
//! # Responsibility
//! - Build the per-day, time-ordered list the rescheduling engine works on.
//! - Provide week navigation and progress figures for calendar screens.
//!
//! # Invariants
//! - Projections are rebuilt from copies; they never mutate the store.

pub mod calendar;
pub mod day_view;
pub mod progress;
