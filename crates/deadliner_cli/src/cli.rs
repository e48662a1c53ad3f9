//! CLI argument parsing and command handling.

use anyhow::{anyhow, bail, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use deadliner_api::Api;
use deadliner_core::model::validation::parse_id;
use deadliner_core::{
    period_range, GoalInput, GoalUpdate, PeriodType, ProgressInput, ProgressUpdate,
};
use log::info;
use std::path::PathBuf;

use crate::render;

#[derive(Parser, Debug)]
#[command(
    name = "deadliner",
    version,
    about = "Deadliner - track progress toward time-boxed goals"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
    /// Database file, overrides DEADLINER_DB_PATH.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    /// Log directory, overrides DEADLINER_LOG_DIR.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
    /// Log level, overrides DEADLINER_LOG_LEVEL.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Goal {
        #[command(subcommand)]
        command: GoalCommand,
    },
    Progress {
        #[command(subcommand)]
        command: ProgressCommand,
    },
    /// Completion summary of every goal.
    Summary,
    /// Day-by-day view of one goal.
    Calendar { goal_id: String },
    /// Send a raw request through the API router.
    Request {
        method: String,
        path: String,
        #[arg(long)]
        body: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    /// Create a goal. Week and month goals default to the current period.
    Add {
        name: String,
        #[arg(short = 'p', long = "period", default_value = "week")]
        period_type: String,
        #[arg(short = 's', long = "start")]
        start_date: Option<String>,
        #[arg(short = 'e', long = "end")]
        end_date: Option<String>,
        #[arg(short = 'm', long = "measure", default_value = "full_days")]
        measure_type: String,
        #[arg(short = 't', long = "target")]
        target_value: f64,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: GoalFields,
    },
    Delete {
        id: String,
    },
    List,
    Show {
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct GoalFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(short = 'p', long = "period")]
    period_type: Option<String>,
    #[arg(short = 's', long = "start")]
    start_date: Option<String>,
    #[arg(short = 'e', long = "end")]
    end_date: Option<String>,
    #[arg(short = 'm', long = "measure")]
    measure_type: Option<String>,
    #[arg(short = 't', long = "target")]
    target_value: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum ProgressCommand {
    Add {
        goal_id: String,
        date: String,
        value: f64,
        #[arg(short = 'n', long = "note")]
        note: Option<String>,
    },
    Update {
        id: String,
        #[arg(short = 'g', long = "goal")]
        goal_id: Option<String>,
        #[arg(short = 'd', long = "date")]
        date: Option<String>,
        #[arg(short = 'v', long = "value")]
        value: Option<f64>,
        #[arg(short = 'n', long = "note")]
        note: Option<String>,
    },
    Delete {
        id: String,
    },
    List {
        /// Only entries of this goal.
        #[arg(short = 'g', long = "goal")]
        goal_id: Option<String>,
    },
    Show {
        id: String,
    },
}

/// Execute one CLI command against the API.
pub fn run(command: Command, json: bool, api: &mut Api) -> Result<()> {
    let output = match command {
        Command::Goal { command } => handle_goal(command, json, api)?,
        Command::Progress { command } => handle_progress(command, json, api)?,
        Command::Summary => {
            let summaries = api.service().summaries()?;
            let today = Local::now().date_naive();
            render::summaries(&summaries, today, json)?
        }
        Command::Calendar { goal_id } => {
            let goal_id = parse_id("goal_id", &goal_id)?;
            let goal = api.service().get_goal(goal_id)?;
            let days = api.service().calendar(goal_id)?;
            render::calendar(&goal, &days, json)?
        }
        Command::Request { method, path, body } => {
            let response = api.dispatch(&method, &path, body.as_deref());
            let output = render::response(&response)?;
            if !response.is_success() {
                println!("{output}");
                bail!("request failed with status {}", response.status);
            }
            output
        }
    };
    println!("{output}");
    Ok(())
}

fn handle_goal(command: GoalCommand, json: bool, api: &mut Api) -> Result<String> {
    let service = api.service_mut();
    match command {
        GoalCommand::Add {
            name,
            period_type,
            start_date,
            end_date,
            measure_type,
            target_value,
        } => {
            let today = Local::now().date_naive();
            let (start_date, end_date) =
                resolve_goal_dates(&period_type, start_date, end_date, today)?;
            let goal = service.create_goal(GoalInput {
                name,
                period_type,
                start_date,
                end_date,
                measure_type,
                target_value,
            })?;
            render::goal(&goal, json)
        }
        GoalCommand::Update { id, fields } => {
            let id = parse_id("id", &id)?;
            let goal = service.update_goal(
                id,
                GoalUpdate {
                    name: fields.name,
                    period_type: fields.period_type,
                    start_date: fields.start_date,
                    end_date: fields.end_date,
                    measure_type: fields.measure_type,
                    target_value: fields.target_value,
                },
            )?;
            render::goal(&goal, json)
        }
        GoalCommand::Delete { id } => {
            let id = parse_id("id", &id)?;
            let deletion = service.delete_goal(id)?;
            info!(
                "event=cli_goal_delete module=cli status=ok goal_id={} entries_removed={}",
                id, deletion.entries_removed
            );
            Ok(format!(
                "Deleted goal {id} and {} progress entr{}.",
                deletion.entries_removed,
                if deletion.entries_removed == 1 { "y" } else { "ies" }
            ))
        }
        GoalCommand::List => render::goals(&service.list_goals()?, json),
        GoalCommand::Show { id } => render::goal(&service.get_goal(parse_id("id", &id)?)?, json),
    }
}

/// Fills omitted goal dates from the period containing `today`.
///
/// When both dates are given they pass through untouched and the service
/// validates them with the rest of the input.
fn resolve_goal_dates(
    period_type: &str,
    start_date: Option<String>,
    end_date: Option<String>,
    today: NaiveDate,
) -> Result<(String, String)> {
    if let (Some(start), Some(end)) = (&start_date, &end_date) {
        return Ok((start.clone(), end.clone()));
    }
    let (default_start, default_end) = PeriodType::parse(period_type)
        .and_then(|period| period_range(period, today))
        .ok_or_else(|| anyhow!("--start and --end are required for `{period_type}` goals"))?;
    Ok((
        start_date.unwrap_or_else(|| default_start.to_string()),
        end_date.unwrap_or_else(|| default_end.to_string()),
    ))
}

fn handle_progress(command: ProgressCommand, json: bool, api: &mut Api) -> Result<String> {
    let service = api.service_mut();
    match command {
        ProgressCommand::Add {
            goal_id,
            date,
            value,
            note,
        } => {
            let entry = service.create_progress(ProgressInput {
                goal_id,
                date,
                value,
                note,
            })?;
            render::progress(&entry, json)
        }
        ProgressCommand::Update {
            id,
            goal_id,
            date,
            value,
            note,
        } => {
            let id = parse_id("id", &id)?;
            let entry = service.update_progress(
                id,
                ProgressUpdate {
                    goal_id,
                    date,
                    value,
                    note,
                },
            )?;
            render::progress(&entry, json)
        }
        ProgressCommand::Delete { id } => {
            let id = parse_id("id", &id)?;
            service.delete_progress(id)?;
            Ok(format!("Deleted progress entry {id}."))
        }
        ProgressCommand::List { goal_id } => {
            let goal_id = goal_id
                .as_deref()
                .map(|value| parse_id("goal_id", value))
                .transpose()?;
            render::progress_list(&service.list_progress(goal_id)?, json)
        }
        ProgressCommand::Show { id } => {
            render::progress(&service.get_progress(parse_id("id", &id)?)?, json)
        }
    }
}
