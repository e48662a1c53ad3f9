//! Per-day calendar view-model for one goal.
//!
//! # Invariants
//! - One `CalendarDay` per date in `[start_date, end_date]`, ascending, with
//!   no gaps or duplicates.
//! - Output does not depend on the order of the input entries.
//! - An inverted range yields an empty calendar; callers reject such goals
//!   at create/update time.

use crate::model::goal::{Goal, MeasureType};
use crate::model::progress::ProgressEntry;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

/// One row of the goal calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub weekday: Weekday,
    /// Short weekday label, e.g. `Mon`.
    pub weekday_label: &'static str,
    /// Entries dated on this day, ordered by `created_at`, then `id`.
    pub entries: Vec<ProgressEntry>,
    pub has_progress: bool,
    /// `full_days` goal with at least one entry of value `>= 1` on this day.
    pub full_day: bool,
    /// Sum of entry values on this day. Meaningful for `hours` goals.
    pub total_hours: f64,
}

/// Builds the calendar for `goal` from an unfiltered entry list.
pub fn compute_calendar(goal: &Goal, entries: &[ProgressEntry]) -> Vec<CalendarDay> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&ProgressEntry>> = BTreeMap::new();
    for entry in entries.iter().filter(|entry| entry.goal_id == goal.id) {
        by_date.entry(entry.date).or_default().push(entry);
    }

    goal.start_date
        .iter_days()
        .take_while(|date| *date <= goal.end_date)
        .map(|date| {
            let mut day_entries: Vec<ProgressEntry> = by_date
                .remove(&date)
                .unwrap_or_default()
                .into_iter()
                .cloned()
                .collect();
            day_entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            build_day(goal.measure_type, date, day_entries)
        })
        .collect()
}

/// Short English weekday label.
pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

fn build_day(measure_type: MeasureType, date: NaiveDate, entries: Vec<ProgressEntry>) -> CalendarDay {
    let full_day =
        measure_type == MeasureType::FullDays && entries.iter().any(|entry| entry.value >= 1.0);
    let total_hours = entries.iter().fold(0.0, |total, entry| total + entry.value);
    let weekday = date.weekday();

    CalendarDay {
        date,
        weekday,
        weekday_label: weekday_label(weekday),
        has_progress: !entries.is_empty(),
        entries,
        full_day,
        total_hours,
    }
}
