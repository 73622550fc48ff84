//! Persistence collaborator contracts and implementations.
//!
//! # Responsibility
//! - Define the create/read/update/delete/bulk-fetch contract the event
//!   store depends on.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - Write paths enforce `Event::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod event_repo;
