//! Core domain logic for Deadliner goal tracking.
//! This crate is the single source of truth for goal and progress invariants.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use aggregate::calendar::{compute_calendar, CalendarDay};
pub use aggregate::summary::{compute_summaries, compute_summary, days_remaining, Summary};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::goal::{
    period_range, Goal, GoalDraft, GoalId, GoalInput, GoalPatch, GoalUpdate, MeasureType,
    PeriodType,
};
pub use model::progress::{
    ProgressDraft, ProgressEntry, ProgressId, ProgressInput, ProgressPatch, ProgressUpdate,
};
pub use model::validation::{check_fields, FieldKind, FieldSpec, ValidationError};
pub use repo::record_store::{
    GoalDeletion, RecordStore, SqliteRecordStore, StoreError, StoreResult,
};
pub use service::tracker_service::{TrackerResult, TrackerService, TrackerServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
