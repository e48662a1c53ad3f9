//! Progress entry domain model.
//!
//! # Responsibility
//! - Define the persisted `ProgressEntry` record.
//! - Turn raw create/update input into validated drafts and patches.
//!
//! # Invariants
//! - `value` is finite and non-negative for accepted input.
//! - Blank notes are stored as `None`; a blank note on update clears it.
//! - Goal existence is not checked here; that needs store access.

use crate::model::goal::GoalId;
use crate::model::validation::{
    ensure_finite, parse_id, parse_iso_date, FieldKind, FieldSpec, ValidationError,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable progress entry identifier.
pub type ProgressId = Uuid;

/// Persisted progress record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: ProgressId,
    /// Weak reference to the owning goal.
    pub goal_id: GoalId,
    /// Day the work applies to, not the day it was logged.
    pub date: NaiveDate,
    pub value: f64,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProgressEntry {
    /// Creates an entry with a fresh id and the current timestamp.
    pub fn new(draft: ProgressDraft) -> Self {
        Self::with_id(Uuid::new_v4(), draft, Utc::now())
    }

    pub fn with_id(id: ProgressId, draft: ProgressDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            goal_id: draft.goal_id,
            date: draft.date,
            value: draft.value,
            note: draft.note,
            created_at,
        }
    }

    /// Shallow-merges supplied patch fields onto this record.
    pub fn apply_patch(&mut self, patch: &ProgressPatch) {
        if let Some(goal_id) = patch.goal_id {
            self.goal_id = goal_id;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(note) = &patch.note {
            self.note = note.clone();
        }
    }
}

/// Typed progress fields prior to identity assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressDraft {
    pub goal_id: GoalId,
    pub date: NaiveDate,
    pub value: f64,
    pub note: Option<String>,
}

impl ProgressDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_value(self.value).map(|_| ())
    }
}

/// Partial progress update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressPatch {
    pub goal_id: Option<GoalId>,
    pub date: Option<NaiveDate>,
    pub value: Option<f64>,
    /// `Some(None)` removes the stored note.
    pub note: Option<Option<String>>,
}

impl ProgressPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Raw progress command body as received from callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressInput {
    pub goal_id: String,
    pub date: String,
    pub value: f64,
    #[serde(default)]
    pub note: Option<String>,
}

impl ProgressInput {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("goal_id", FieldKind::Text),
        FieldSpec::required("date", FieldKind::Text),
        FieldSpec::required("value", FieldKind::Number),
        FieldSpec::optional("note", FieldKind::Text),
    ];

    pub fn into_draft(self) -> Result<ProgressDraft, ValidationError> {
        let draft = ProgressDraft {
            goal_id: parse_id("goal_id", &self.goal_id)?,
            date: parse_iso_date("date", &self.date)?,
            value: self.value,
            note: normalize_note(self.note),
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// Raw partial progress update body.
///
/// A supplied blank `note` clears the stored note; an omitted one keeps it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    #[serde(default)]
    pub goal_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
}

impl ProgressUpdate {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional("goal_id", FieldKind::Text),
        FieldSpec::optional("date", FieldKind::Text),
        FieldSpec::optional("value", FieldKind::Number),
        FieldSpec::optional("note", FieldKind::Text),
    ];

    pub fn into_patch(self) -> Result<ProgressPatch, ValidationError> {
        Ok(ProgressPatch {
            goal_id: self
                .goal_id
                .as_deref()
                .map(|value| parse_id("goal_id", value))
                .transpose()?,
            date: self
                .date
                .as_deref()
                .map(|value| parse_iso_date("date", value))
                .transpose()?,
            value: self.value.map(validate_value).transpose()?,
            note: self.note.map(|note| normalize_note(Some(note))),
        })
    }
}

fn validate_value(value: f64) -> Result<f64, ValidationError> {
    let value = ensure_finite("value", value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeValue(value));
    }
    Ok(value)
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
