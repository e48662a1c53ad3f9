//! Record store contracts and persistence implementation.
//!
//! # Responsibility
//! - Define the CRUD contract over the goal and progress collections.
//! - Isolate SQLite and JSON snapshot details from the coordinator.
//!
//! # Invariants
//! - Store-level deletes are idempotent.
//! - Store APIs return semantic not-found errors in addition to storage
//!   transport errors.

pub mod record_store;
