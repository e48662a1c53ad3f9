//! Goal tracking use-case service (mutation coordinator).
//!
//! # Responsibility
//! - Validate create/update commands before touching the record store.
//! - Enforce goal references on progress writes.
//! - Serve summaries and calendars recomputed from live collections.
//!
//! # Invariants
//! - A rejected command leaves the store untouched.
//! - Deletes report `NotFound` for absent ids, unlike the idempotent store.
//! - There is no aggregate cache; every read scans the store.

use crate::aggregate::calendar::{compute_calendar, CalendarDay};
use crate::aggregate::summary::{compute_summaries, Summary};
use crate::model::goal::{Goal, GoalId, GoalInput, GoalUpdate};
use crate::model::progress::{ProgressEntry, ProgressId, ProgressInput, ProgressUpdate};
use crate::model::validation::ValidationError;
use crate::repo::record_store::{GoalDeletion, RecordStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type TrackerResult<T> = Result<T, TrackerServiceError>;

/// Service error for goal tracking use-cases.
#[derive(Debug)]
pub enum TrackerServiceError {
    /// Command input was rejected before any store access.
    Validation(ValidationError),
    /// Target goal does not exist.
    GoalNotFound(GoalId),
    /// Target progress entry does not exist.
    ProgressNotFound(ProgressId),
    /// Persistence-layer failure.
    Storage(StoreError),
}

impl Display for TrackerServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid {}: {err}", err.field()),
            Self::GoalNotFound(id) => write!(f, "goal not found: {id}"),
            Self::ProgressNotFound(id) => write!(f, "progress entry not found: {id}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for TrackerServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for TrackerServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for TrackerServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::GoalNotFound(id) => Self::GoalNotFound(id),
            StoreError::ProgressNotFound(id) => Self::ProgressNotFound(id),
            other => Self::Storage(other),
        }
    }
}

/// Coordinator facade over a record store implementation.
pub struct TrackerService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> TrackerService<S> {
    /// Creates a service using the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read-only access to the wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Releases the wrapped store, e.g. to close it explicitly.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Validates and persists a new goal.
    pub fn create_goal(&mut self, input: GoalInput) -> TrackerResult<Goal> {
        let started_at = Instant::now();
        let draft = input.into_draft().map_err(reject("create_goal"))?;
        let goal = self.store.create_goal(draft)?;
        info!(
            "event=goal_create module=service status=ok goal_id={} duration_ms={}",
            goal.id,
            started_at.elapsed().as_millis()
        );
        Ok(goal)
    }

    /// Merges supplied fields onto an existing goal.
    ///
    /// The merged record is validated as a whole, so e.g. moving only
    /// `end_date` before the stored `start_date` is rejected.
    pub fn update_goal(&mut self, id: GoalId, update: GoalUpdate) -> TrackerResult<Goal> {
        let started_at = Instant::now();
        let patch = update.into_patch().map_err(reject("update_goal"))?;
        let mut merged = self.store.get_goal(id)?;
        merged.apply_patch(&patch);
        merged.to_draft().validate().map_err(reject("update_goal"))?;

        let goal = self.store.update_goal(id, &patch)?;
        info!(
            "event=goal_update module=service status=ok goal_id={} duration_ms={}",
            goal.id,
            started_at.elapsed().as_millis()
        );
        Ok(goal)
    }

    /// Deletes a goal and every progress entry logged against it.
    pub fn delete_goal(&mut self, id: GoalId) -> TrackerResult<GoalDeletion> {
        let deletion = self.store.delete_goal(id)?;
        if !deletion.goal_removed {
            return Err(TrackerServiceError::GoalNotFound(id));
        }
        info!(
            "event=goal_delete module=service status=ok goal_id={} entries_removed={}",
            id, deletion.entries_removed
        );
        Ok(deletion)
    }

    pub fn list_goals(&self) -> TrackerResult<Vec<Goal>> {
        Ok(self.store.list_goals()?)
    }

    pub fn get_goal(&self, id: GoalId) -> TrackerResult<Goal> {
        Ok(self.store.get_goal(id)?)
    }

    /// Validates and persists a new progress entry for an existing goal.
    pub fn create_progress(&mut self, input: ProgressInput) -> TrackerResult<ProgressEntry> {
        let draft = input.into_draft().map_err(reject("create_progress"))?;
        self.ensure_goal_exists(draft.goal_id, "create_progress")?;
        let entry = self.store.create_progress(draft)?;
        info!(
            "event=progress_create module=service status=ok progress_id={} goal_id={}",
            entry.id, entry.goal_id
        );
        Ok(entry)
    }

    /// Merges supplied fields onto an existing progress entry.
    pub fn update_progress(
        &mut self,
        id: ProgressId,
        update: ProgressUpdate,
    ) -> TrackerResult<ProgressEntry> {
        let patch = update.into_patch().map_err(reject("update_progress"))?;
        self.store.get_progress(id)?;
        if let Some(goal_id) = patch.goal_id {
            self.ensure_goal_exists(goal_id, "update_progress")?;
        }

        let entry = self.store.update_progress(id, &patch)?;
        info!(
            "event=progress_update module=service status=ok progress_id={} goal_id={}",
            entry.id, entry.goal_id
        );
        Ok(entry)
    }

    pub fn delete_progress(&mut self, id: ProgressId) -> TrackerResult<()> {
        if !self.store.delete_progress(id)? {
            return Err(TrackerServiceError::ProgressNotFound(id));
        }
        info!("event=progress_delete module=service status=ok progress_id={id}");
        Ok(())
    }

    /// Lists progress entries, optionally restricted to one goal.
    pub fn list_progress(&self, goal_id: Option<GoalId>) -> TrackerResult<Vec<ProgressEntry>> {
        Ok(self.store.list_progress(goal_id)?)
    }

    pub fn get_progress(&self, id: ProgressId) -> TrackerResult<ProgressEntry> {
        Ok(self.store.get_progress(id)?)
    }

    /// Recomputes every goal summary from the current store state.
    pub fn summaries(&self) -> TrackerResult<Vec<Summary>> {
        let goals = self.store.list_goals()?;
        let entries = self.store.list_progress(None)?;
        Ok(compute_summaries(&goals, &entries))
    }

    /// Recomputes the calendar of one goal from the current store state.
    pub fn calendar(&self, goal_id: GoalId) -> TrackerResult<Vec<CalendarDay>> {
        let goal = self.store.get_goal(goal_id)?;
        let entries = self.store.list_progress(Some(goal_id))?;
        Ok(compute_calendar(&goal, &entries))
    }

    fn ensure_goal_exists(&self, goal_id: GoalId, operation: &'static str) -> TrackerResult<()> {
        match self.store.get_goal(goal_id) {
            Ok(_) => Ok(()),
            Err(StoreError::GoalNotFound(_)) => {
                Err(reject(operation)(ValidationError::UnknownGoal(goal_id)))
            }
            Err(other) => Err(other.into()),
        }
    }
}

fn reject(operation: &'static str) -> impl Fn(ValidationError) -> TrackerServiceError {
    move |err| {
        warn!(
            "event=command_rejected module=service status=invalid operation={} field={}",
            operation,
            err.field()
        );
        TrackerServiceError::Validation(err)
    }
}
