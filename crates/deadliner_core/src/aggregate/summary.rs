//! Goal completion summaries.
//!
//! # Invariants
//! - `percentage` is always within `[0, 100]`, including overshoot.
//! - `remaining` is never negative.
//! - A non-positive `target_value` yields `percentage == 0`, never NaN.

use crate::model::goal::{Goal, GoalId};
use crate::model::progress::ProgressEntry;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Completion read model for one goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub goal: Goal,
    /// Sum of all entry values logged against the goal.
    pub completed: f64,
    /// `max(0, target_value - completed)`.
    pub remaining: f64,
    /// Completion clamped to `[0, 100]`.
    pub percentage: f64,
    /// Entries of this goal in store order.
    pub progress_entries: Vec<ProgressEntry>,
}

impl Summary {
    /// Whether the target has been reached. Overshoot is not distinguished.
    pub fn is_complete(&self) -> bool {
        self.percentage >= 100.0
    }
}

/// Computes one summary per goal, in goal order.
///
/// Entries referencing goals outside `goals` are ignored.
pub fn compute_summaries(goals: &[Goal], entries: &[ProgressEntry]) -> Vec<Summary> {
    let mut by_goal: HashMap<GoalId, Vec<&ProgressEntry>> = HashMap::new();
    for entry in entries {
        by_goal.entry(entry.goal_id).or_default().push(entry);
    }

    goals
        .iter()
        .map(|goal| {
            let own = by_goal.get(&goal.id).map(Vec::as_slice).unwrap_or(&[]);
            summarize(goal, own.iter().copied())
        })
        .collect()
}

/// Computes the summary of a single goal from an unfiltered entry list.
pub fn compute_summary(goal: &Goal, entries: &[ProgressEntry]) -> Summary {
    summarize(goal, entries.iter().filter(|entry| entry.goal_id == goal.id))
}

/// Whole days left until the goal's end date, `0` once it has passed.
pub fn days_remaining(goal: &Goal, today: NaiveDate) -> i64 {
    (goal.end_date - today).num_days().max(0)
}

fn summarize<'a>(goal: &Goal, entries: impl Iterator<Item = &'a ProgressEntry>) -> Summary {
    let progress_entries: Vec<ProgressEntry> = entries.cloned().collect();
    let completed = progress_entries
        .iter()
        .fold(0.0, |total, entry| total + entry.value);

    Summary {
        goal: goal.clone(),
        completed,
        remaining: remaining(goal.target_value, completed),
        percentage: percentage(goal.target_value, completed),
        progress_entries,
    }
}

fn remaining(target_value: f64, completed: f64) -> f64 {
    (target_value - completed).max(0.0)
}

fn percentage(target_value: f64, completed: f64) -> f64 {
    if target_value > 0.0 {
        (completed / target_value * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{percentage, remaining};

    #[test]
    fn percentage_handles_zero_and_negative_targets() {
        assert_eq!(percentage(0.0, 5.0), 0.0);
        assert_eq!(percentage(-3.0, 5.0), 0.0);
        assert!(!percentage(0.0, 0.0).is_nan());
    }

    #[test]
    fn percentage_clamps_overshoot() {
        assert_eq!(percentage(5.0, 12.0), 100.0);
        assert_eq!(percentage(4.0, 1.0), 25.0);
    }

    #[test]
    fn remaining_never_goes_negative() {
        assert_eq!(remaining(5.0, 12.0), 0.0);
        assert_eq!(remaining(5.0, 2.0), 3.0);
    }
}
