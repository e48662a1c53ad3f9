//! Path and method parsing for the request surface.
//!
//! # Invariants
//! - Path ids must parse as UUIDs; anything else is a malformed request, not
//!   a missing record.
//! - Only `GET /progress` accepts a query string (`goal_id`).

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Supported request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Parses a method name case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Resolved request target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Version,
    Summary,
    Goals,
    Goal(Uuid),
    GoalCalendar(Uuid),
    Progress { goal_id: Option<Uuid> },
    ProgressEntry(Uuid),
}

impl Route {
    /// Parses a request path with optional query string.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let (path, query) = match path.trim().split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path.trim(), None),
        };
        let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();

        let route = match segments.as_slice() {
            ["version"] => Self::Version,
            ["summary"] => Self::Summary,
            ["goals"] => Self::Goals,
            ["goals", id] => Self::Goal(parse_path_id(id)?),
            ["goals", id, "calendar"] => Self::GoalCalendar(parse_path_id(id)?),
            ["progress"] => {
                let goal_id = match query {
                    Some(query) => parse_goal_filter(query)?,
                    None => None,
                };
                return Ok(Self::Progress { goal_id });
            }
            ["progress", id] => Self::ProgressEntry(parse_path_id(id)?),
            _ => return Err(RouteError::Unknown(path.to_string())),
        };

        match query {
            Some(query) if !query.is_empty() => Err(RouteError::UnexpectedQuery(query.to_string())),
            _ => Ok(route),
        }
    }

    /// Methods this route answers.
    pub fn allowed_methods(self) -> &'static [Method] {
        match self {
            Self::Version | Self::Summary | Self::GoalCalendar(_) => &[Method::Get],
            Self::Goals | Self::Progress { .. } => &[Method::Get, Method::Post],
            Self::Goal(_) | Self::ProgressEntry(_) => &[Method::Get, Method::Put, Method::Delete],
        }
    }

    pub fn allows(self, method: Method) -> bool {
        self.allowed_methods().contains(&method)
    }
}

/// Path could not be resolved to a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No route matches the path.
    Unknown(String),
    /// A path segment that must be an id is not a UUID.
    MalformedId(String),
    /// Query string is not accepted by the route or cannot be parsed.
    UnexpectedQuery(String),
}

impl Display for RouteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(path) => write!(f, "no route for `{path}`"),
            Self::MalformedId(value) => write!(f, "path id must be a UUID, got `{value}`"),
            Self::UnexpectedQuery(query) => write!(f, "unsupported query string `{query}`"),
        }
    }
}

impl Error for RouteError {}

fn parse_path_id(value: &str) -> Result<Uuid, RouteError> {
    Uuid::parse_str(value).map_err(|_| RouteError::MalformedId(value.to_string()))
}

fn parse_goal_filter(query: &str) -> Result<Option<Uuid>, RouteError> {
    let mut goal_id = None;
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        match pair.split_once('=') {
            Some(("goal_id", value)) if goal_id.is_none() => {
                goal_id = Some(parse_path_id(value)?);
            }
            _ => return Err(RouteError::UnexpectedQuery(query.to_string())),
        }
    }
    Ok(goal_id)
}
