//! Goal domain model.
//!
//! # Responsibility
//! - Define the persisted `Goal` record and its period/measure enums.
//! - Turn raw create/update input into validated drafts and patches.
//!
//! # Invariants
//! - `start_date <= end_date` for every goal accepted through a draft.
//! - `target_value` is finite and strictly positive for accepted drafts.
//! - `id` and `created_at` are never touched by a patch.

use crate::model::validation::{
    ensure_finite, parse_iso_date, FieldKind, FieldSpec, ValidationError,
};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable goal identifier.
pub type GoalId = Uuid;

/// Period a goal is framed in.
///
/// Stored dates are always explicit; `period_range` only suggests defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Week,
    Month,
    Custom,
}

impl PeriodType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Custom => "custom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Default `(start_date, end_date)` of the period containing `today`.
///
/// Weeks run Monday through Sunday; months cover the whole calendar month.
/// `Custom` has no default range.
pub fn period_range(
    period_type: PeriodType,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    match period_type {
        PeriodType::Week => {
            let offset = u64::from(today.weekday().num_days_from_monday());
            let start = today.checked_sub_days(Days::new(offset))?;
            Some((start, start.checked_add_days(Days::new(6))?))
        }
        PeriodType::Month => {
            let start = today.with_day(1)?;
            let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
            Some((start, end))
        }
        PeriodType::Custom => None,
    }
}

/// Unit the goal target and progress values are counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureType {
    /// Whole focused days; a day counts once any entry reaches `1`.
    FullDays,
    /// Hours, summed per day.
    Hours,
}

impl MeasureType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullDays => "full_days",
            Self::Hours => "hours",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "full_days" => Some(Self::FullDays),
            "hours" => Some(Self::Hours),
            _ => None,
        }
    }

    /// Human-readable unit for rendered quantities.
    pub fn unit_label(self) -> &'static str {
        match self {
            Self::FullDays => "full days",
            Self::Hours => "hours",
        }
    }
}

/// Persisted goal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub name: String,
    pub period_type: PeriodType,
    /// First tracked day, inclusive.
    pub start_date: NaiveDate,
    /// Last tracked day, inclusive.
    pub end_date: NaiveDate,
    pub measure_type: MeasureType,
    pub target_value: f64,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Creates a goal record with a fresh id and the current timestamp.
    pub fn new(draft: GoalDraft) -> Self {
        Self::with_id(Uuid::new_v4(), draft, Utc::now())
    }

    /// Creates a goal record with caller-provided identity.
    ///
    /// Used by tests and import paths where identity already exists.
    pub fn with_id(id: GoalId, draft: GoalDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            period_type: draft.period_type,
            start_date: draft.start_date,
            end_date: draft.end_date,
            measure_type: draft.measure_type,
            target_value: draft.target_value,
            created_at,
        }
    }

    /// Number of calendar days covered by the goal, `0` for inverted ranges.
    pub fn day_count(&self) -> i64 {
        let days = (self.end_date - self.start_date).num_days() + 1;
        days.max(0)
    }

    /// Shallow-merges supplied patch fields onto this record.
    pub fn apply_patch(&mut self, patch: &GoalPatch) {
        if let Some(name) = patch.name.as_ref() {
            self.name = name.clone();
        }
        if let Some(period_type) = patch.period_type {
            self.period_type = period_type;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(measure_type) = patch.measure_type {
            self.measure_type = measure_type;
        }
        if let Some(target_value) = patch.target_value {
            self.target_value = target_value;
        }
    }

    /// Returns the mutable fields of this record as a draft.
    pub fn to_draft(&self) -> GoalDraft {
        GoalDraft {
            name: self.name.clone(),
            period_type: self.period_type,
            start_date: self.start_date,
            end_date: self.end_date,
            measure_type: self.measure_type,
            target_value: self.target_value,
        }
    }
}

/// Typed goal fields prior to identity assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub name: String,
    pub period_type: PeriodType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub measure_type: MeasureType,
    pub target_value: f64,
}

impl GoalDraft {
    /// Checks cross-field goal invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.end_date < self.start_date {
            return Err(ValidationError::InvertedDateRange {
                start_date: self.start_date,
                end_date: self.end_date,
            });
        }
        ensure_finite("target_value", self.target_value)?;
        if self.target_value <= 0.0 {
            return Err(ValidationError::NonPositiveTarget(self.target_value));
        }
        Ok(())
    }
}

/// Partial goal update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub period_type: Option<PeriodType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub measure_type: Option<MeasureType>,
    pub target_value: Option<f64>,
}

impl GoalPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Raw goal command body as received from callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalInput {
    pub name: String,
    pub period_type: String,
    pub start_date: String,
    pub end_date: String,
    pub measure_type: String,
    pub target_value: f64,
}

impl GoalInput {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("name", FieldKind::Text),
        FieldSpec::required("period_type", FieldKind::Text),
        FieldSpec::required("start_date", FieldKind::Text),
        FieldSpec::required("end_date", FieldKind::Text),
        FieldSpec::required("measure_type", FieldKind::Text),
        FieldSpec::required("target_value", FieldKind::Number),
    ];

    /// Parses and validates every field into a draft.
    ///
    /// Fields are checked in wire order so the first offending field is
    /// reported.
    pub fn into_draft(self) -> Result<GoalDraft, ValidationError> {
        let name = normalize_name(&self.name)?;
        let period_type = parse_period_type(&self.period_type)?;
        let start_date = parse_iso_date("start_date", &self.start_date)?;
        let end_date = parse_iso_date("end_date", &self.end_date)?;
        let measure_type = parse_measure_type(&self.measure_type)?;
        let draft = GoalDraft {
            name,
            period_type,
            start_date,
            end_date,
            measure_type,
            target_value: self.target_value,
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// Raw partial goal update body. Omitted fields keep prior values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub period_type: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub measure_type: Option<String>,
    #[serde(default)]
    pub target_value: Option<f64>,
}

impl GoalUpdate {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional("name", FieldKind::Text),
        FieldSpec::optional("period_type", FieldKind::Text),
        FieldSpec::optional("start_date", FieldKind::Text),
        FieldSpec::optional("end_date", FieldKind::Text),
        FieldSpec::optional("measure_type", FieldKind::Text),
        FieldSpec::optional("target_value", FieldKind::Number),
    ];

    /// Parses supplied fields into a typed patch.
    ///
    /// Cross-field invariants are not checked here; they depend on the stored
    /// record the patch is merged onto.
    pub fn into_patch(self) -> Result<GoalPatch, ValidationError> {
        Ok(GoalPatch {
            name: self.name.as_deref().map(normalize_name).transpose()?,
            period_type: self
                .period_type
                .as_deref()
                .map(parse_period_type)
                .transpose()?,
            start_date: self
                .start_date
                .as_deref()
                .map(|value| parse_iso_date("start_date", value))
                .transpose()?,
            end_date: self
                .end_date
                .as_deref()
                .map(|value| parse_iso_date("end_date", value))
                .transpose()?,
            measure_type: self
                .measure_type
                .as_deref()
                .map(parse_measure_type)
                .transpose()?,
            target_value: self
                .target_value
                .map(|value| ensure_finite("target_value", value))
                .transpose()?,
        })
    }
}

fn normalize_name(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn parse_period_type(value: &str) -> Result<PeriodType, ValidationError> {
    PeriodType::parse(value).ok_or_else(|| ValidationError::UnknownPeriodType(value.to_string()))
}

fn parse_measure_type(value: &str) -> Result<MeasureType, ValidationError> {
    MeasureType::parse(value).ok_or_else(|| ValidationError::UnknownMeasureType(value.to_string()))
}
