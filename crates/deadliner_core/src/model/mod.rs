//! Domain model for goals and the progress logged against them.
//!
//! # Responsibility
//! - Define the persisted record shapes (`Goal`, `ProgressEntry`).
//! - Parse raw command input into validated drafts and partial patches.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that never changes.
//! - `created_at` is assigned once at creation and never mutated.
//! - `ProgressEntry::goal_id` is a lookup key, not an ownership link.

pub mod goal;
pub mod progress;
pub mod validation;
