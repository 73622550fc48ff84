//! Canonical event store.
//!
//! # Responsibility
//! - Own the single in-memory list every view is derived from.
//! - Write through to the persistence collaborator and broadcast changes.
//!
//! # Invariants
//! - Only the store mutates canonical events; readers get copies.
//! - Every successful mutation is broadcast before the call returns.
//! - A persistence failure never rolls back the in-memory set.

pub mod event_store;
