//! Field-level validation errors and shared input parsers.
//!
//! # Responsibility
//! - Describe every rejected command input with the offending field name.
//! - Parse wire-level scalars (ISO dates, ids, numbers) into domain types.
//! - Check raw JSON bodies for missing or mistyped fields before decoding.
//!
//! # Invariants
//! - Dates are accepted only in strict `YYYY-MM-DD` form.
//! - Parsers never panic on user input.

use crate::model::goal::GoalId;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid iso date regex"));

/// Rejected command input. Every variant maps to exactly one input field.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `name` is blank after trim.
    EmptyName,
    /// `period_type` is not one of `week|month|custom`.
    UnknownPeriodType(String),
    /// `measure_type` is not one of `full_days|hours`.
    UnknownMeasureType(String),
    /// Date text is not a valid `YYYY-MM-DD` calendar date.
    InvalidDate { field: &'static str, value: String },
    /// `end_date` is earlier than `start_date`.
    InvertedDateRange {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    /// Numeric field is NaN or infinite.
    NonFiniteNumber { field: &'static str },
    /// `target_value` must be strictly positive.
    NonPositiveTarget(f64),
    /// Progress `value` must not be negative.
    NegativeValue(f64),
    /// Identifier text is not a UUID.
    MalformedId { field: &'static str, value: String },
    /// `goal_id` does not reference a live goal.
    UnknownGoal(GoalId),
    /// Required field is absent or `null`.
    MissingField { field: &'static str },
    /// Field is present with the wrong JSON type.
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
}

impl ValidationError {
    /// Returns the wire name of the rejected input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName => "name",
            Self::UnknownPeriodType(_) => "period_type",
            Self::UnknownMeasureType(_) => "measure_type",
            Self::InvalidDate { field, .. } => *field,
            Self::InvertedDateRange { .. } => "end_date",
            Self::NonFiniteNumber { field } => *field,
            Self::NonPositiveTarget(_) => "target_value",
            Self::NegativeValue(_) => "value",
            Self::MalformedId { field, .. } => *field,
            Self::UnknownGoal(_) => "goal_id",
            Self::MissingField { field } => *field,
            Self::InvalidType { field, .. } => *field,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be blank"),
            Self::UnknownPeriodType(value) => write!(
                f,
                "unsupported period_type `{value}`; expected week|month|custom"
            ),
            Self::UnknownMeasureType(value) => write!(
                f,
                "unsupported measure_type `{value}`; expected full_days|hours"
            ),
            Self::InvalidDate { field, value } => {
                write!(f, "{field} must be a YYYY-MM-DD calendar date, got `{value}`")
            }
            Self::InvertedDateRange {
                start_date,
                end_date,
            } => write!(
                f,
                "end_date ({end_date}) must not be earlier than start_date ({start_date})"
            ),
            Self::NonFiniteNumber { field } => write!(f, "{field} must be a finite number"),
            Self::NonPositiveTarget(value) => {
                write!(f, "target_value must be greater than 0, got {value}")
            }
            Self::NegativeValue(value) => write!(f, "value must not be negative, got {value}"),
            Self::MalformedId { field, value } => {
                write!(f, "{field} must be a UUID, got `{value}`")
            }
            Self::UnknownGoal(id) => write!(f, "goal_id does not reference a goal: {id}"),
            Self::MissingField { field } => write!(f, "{field} is required"),
            Self::InvalidType { field, expected } => write!(f, "{field} must be a {expected}"),
        }
    }
}

impl Error for ValidationError {}

/// Parses one strict ISO-8601 calendar date.
pub fn parse_iso_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    let invalid = || ValidationError::InvalidDate {
        field,
        value: trimmed.to_string(),
    };
    if !ISO_DATE_RE.is_match(trimmed) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| invalid())
}

/// Parses one hyphenated UUID identifier.
pub fn parse_id(field: &'static str, value: &str) -> Result<Uuid, ValidationError> {
    let trimmed = value.trim();
    Uuid::parse_str(trimmed).map_err(|_| ValidationError::MalformedId {
        field,
        value: trimmed.to_string(),
    })
}

/// JSON type accepted for one input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

impl FieldKind {
    fn label(self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Number => "number",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Text => value.is_string(),
            Self::Number => value.is_number(),
        }
    }
}

/// Shape of one field in a raw command body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// Checks a raw JSON object against `fields`, in order.
///
/// `null` counts as absent. Fields not listed are ignored.
pub fn check_fields(
    body: &Map<String, Value>,
    fields: &[FieldSpec],
) -> Result<(), ValidationError> {
    for field in fields {
        match body.get(field.name).filter(|value| !value.is_null()) {
            None if field.required => {
                return Err(ValidationError::MissingField { field: field.name })
            }
            None => {}
            Some(value) if !field.kind.matches(value) => {
                return Err(ValidationError::InvalidType {
                    field: field.name,
                    expected: field.kind.label(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFiniteNumber { field })
    }
}
