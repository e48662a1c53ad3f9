//! Progress aggregation engine.
//!
//! # Responsibility
//! - Derive per-goal completion summaries from goals and progress entries.
//! - Derive the per-day calendar view-model for one goal.
//!
//! # Invariants
//! - Every function here is pure: same input, same output, no I/O.
//! - Results are recomputed from full collections, never patched.

pub mod calendar;
pub mod summary;
