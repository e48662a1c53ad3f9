//! Text and JSON rendering of command results.

use anyhow::Result;
use chrono::NaiveDate;
use deadliner_api::ApiResponse;
use deadliner_core::{days_remaining, CalendarDay, Goal, MeasureType, ProgressEntry, Summary};
use serde::Serialize;
use std::fmt::Write;

pub fn goal(goal: &Goal, json: bool) -> Result<String> {
    if json {
        return to_json(goal);
    }
    Ok(goal_line(goal))
}

pub fn goals(goals: &[Goal], json: bool) -> Result<String> {
    if json {
        return to_json(goals);
    }
    if goals.is_empty() {
        return Ok("No goals.".to_string());
    }
    Ok(goals.iter().map(goal_line).collect::<Vec<_>>().join("\n"))
}

pub fn progress(entry: &ProgressEntry, json: bool) -> Result<String> {
    if json {
        return to_json(entry);
    }
    Ok(progress_line(entry))
}

pub fn progress_list(entries: &[ProgressEntry], json: bool) -> Result<String> {
    if json {
        return to_json(entries);
    }
    if entries.is_empty() {
        return Ok("No progress entries.".to_string());
    }
    Ok(entries
        .iter()
        .map(progress_line)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Summary table with days left counted from `today`.
pub fn summaries(summaries: &[Summary], today: NaiveDate, json: bool) -> Result<String> {
    if json {
        return to_json(summaries);
    }
    if summaries.is_empty() {
        return Ok("No goals.".to_string());
    }

    let mut out = String::new();
    for summary in summaries {
        let goal = &summary.goal;
        let status = if summary.is_complete() {
            "done".to_string()
        } else {
            format!("{} days left", days_remaining(goal, today))
        };
        writeln!(
            out,
            "{} [{}] {}/{} {} ({:.0}%), {} remaining, {}",
            goal.name,
            goal.period_type.as_str(),
            format_value(summary.completed),
            format_value(goal.target_value),
            goal.measure_type.unit_label(),
            summary.percentage,
            format_value(summary.remaining),
            status
        )?;
    }
    Ok(out.trim_end().to_string())
}

pub fn calendar(goal: &Goal, days: &[CalendarDay], json: bool) -> Result<String> {
    if json {
        return to_json(days);
    }

    let mut out = String::new();
    writeln!(
        out,
        "{} ({} to {})",
        goal.name, goal.start_date, goal.end_date
    )?;
    for day in days {
        let mark = match goal.measure_type {
            MeasureType::FullDays if day.full_day => "x".to_string(),
            MeasureType::FullDays if day.has_progress => "~".to_string(),
            MeasureType::FullDays => ".".to_string(),
            MeasureType::Hours if day.has_progress => format!("{}h", format_value(day.total_hours)),
            MeasureType::Hours => ".".to_string(),
        };
        writeln!(out, "{} {} {}", day.date, day.weekday_label, mark)?;
    }
    Ok(out.trim_end().to_string())
}

pub fn response(response: &ApiResponse) -> Result<String> {
    Ok(serde_json::to_string_pretty(response)?)
}

fn goal_line(goal: &Goal) -> String {
    format!(
        "{} {} [{}] {} to {}, target {} {}",
        goal.id,
        goal.name,
        goal.period_type.as_str(),
        goal.start_date,
        goal.end_date,
        format_value(goal.target_value),
        goal.measure_type.unit_label()
    )
}

fn progress_line(entry: &ProgressEntry) -> String {
    let mut line = format!(
        "{} {} goal={} value={}",
        entry.id,
        entry.date,
        entry.goal_id,
        format_value(entry.value)
    );
    if let Some(note) = &entry.note {
        line.push_str(&format!(" note={note:?}"));
    }
    line
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

// `2` rather than `2.0`, but `1.5` stays as is.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
