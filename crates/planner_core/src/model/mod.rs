//! Domain model for planner events.
//!
//! # Responsibility
//! - Define the canonical event record shared by every view.
//! - Keep validation rules next to the data they protect.
//!
//! # Invariants
//! - Every event is identified by a stable, non-nil `EventId`.
//! - `end_time`, when present, is strictly later than `start_time`.

pub mod event;
