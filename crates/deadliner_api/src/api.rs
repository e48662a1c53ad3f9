//! Use-case API over the goal tracker.
//!
//! # Responsibility
//! - Route `(method, path, body)` requests to the mutation coordinator.
//! - Translate coordinator errors into status-coded envelopes.
//!
//! # Invariants
//! - `dispatch` never panics; every failure becomes an envelope.
//! - `422` bodies always carry the offending `field`, including fields that
//!   are missing or of the wrong JSON type.
//! - Storage details are logged, not returned to callers.

use crate::route::{Method, Route, RouteError};
use deadliner_core::{
    check_fields, core_version, FieldSpec, GoalInput, GoalUpdate, ProgressInput, ProgressUpdate,
    RecordStore, SqliteRecordStore, StoreResult, TrackerService, TrackerServiceError,
};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Instant;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_METHOD_NOT_ALLOWED: u16 = 405;
pub const STATUS_UNPROCESSABLE: u16 = 422;
pub const STATUS_INTERNAL: u16 = 500;

/// Response envelope returned for every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// HTTP-style status code.
    pub status: u16,
    /// JSON payload, or an error object for non-200 statuses.
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self {
            status: STATUS_OK,
            body,
        }
    }

    fn failure(status: u16, kind: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": kind, "message": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Request dispatcher owning one tracker service.
pub struct Api<S: RecordStore = SqliteRecordStore> {
    service: TrackerService<S>,
}

impl Api<SqliteRecordStore> {
    /// Opens a file-backed store at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(TrackerService::new(SqliteRecordStore::open(path)?)))
    }

    /// Opens a fresh in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(TrackerService::new(
            SqliteRecordStore::open_in_memory()?,
        )))
    }
}

impl<S: RecordStore> Api<S> {
    pub fn new(service: TrackerService<S>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &TrackerService<S> {
        &self.service
    }

    /// Mutable access for callers that bypass routing, e.g. the CLI.
    pub fn service_mut(&mut self) -> &mut TrackerService<S> {
        &mut self.service
    }

    pub fn into_service(self) -> TrackerService<S> {
        self.service
    }

    /// Handles one request.
    ///
    /// `body` is only read for `POST` and `PUT`.
    pub fn dispatch(&mut self, method: &str, path: &str, body: Option<&str>) -> ApiResponse {
        let started_at = Instant::now();
        let response = self.route(method, path, body);
        info!(
            "event=api_request module=api status={} method={} route={} duration_ms={}",
            response.status,
            method.trim().to_ascii_uppercase(),
            route_label(path),
            started_at.elapsed().as_millis()
        );
        response
    }

    fn route(&mut self, method: &str, path: &str, body: Option<&str>) -> ApiResponse {
        let route = match Route::parse(path) {
            Ok(route) => route,
            Err(err @ RouteError::Unknown(_)) => {
                return ApiResponse::failure(STATUS_NOT_FOUND, "unknown_route", err.to_string())
            }
            Err(err) => {
                return ApiResponse::failure(STATUS_BAD_REQUEST, "bad_request", err.to_string())
            }
        };
        let method = match Method::parse(method) {
            Some(method) if route.allows(method) => method,
            _ => return method_not_allowed(method, route),
        };

        match self.handle(method, route, body) {
            Ok(value) => ApiResponse::ok(value),
            Err(response) => response,
        }
    }

    fn handle(
        &mut self,
        method: Method,
        route: Route,
        body: Option<&str>,
    ) -> Result<Value, ApiResponse> {
        let service = &mut self.service;
        match (method, route) {
            (Method::Get, Route::Version) => Ok(json!({ "version": core_version() })),
            (Method::Get, Route::Summary) => to_value(service.summaries()),
            (Method::Get, Route::Goals) => to_value(service.list_goals()),
            (Method::Post, Route::Goals) => {
                let input: GoalInput = parse_body(body, GoalInput::FIELDS)?;
                to_value(service.create_goal(input))
            }
            (Method::Get, Route::Goal(id)) => to_value(service.get_goal(id)),
            (Method::Put, Route::Goal(id)) => {
                let update: GoalUpdate = parse_body(body, GoalUpdate::FIELDS)?;
                to_value(service.update_goal(id, update))
            }
            (Method::Delete, Route::Goal(id)) => {
                let deletion = service.delete_goal(id).map_err(error_response)?;
                Ok(json!({
                    "goal_id": id,
                    "entries_removed": deletion.entries_removed,
                }))
            }
            (Method::Get, Route::GoalCalendar(id)) => to_value(service.calendar(id)),
            (Method::Get, Route::Progress { goal_id }) => to_value(service.list_progress(goal_id)),
            (Method::Post, Route::Progress { .. }) => {
                let input: ProgressInput = parse_body(body, ProgressInput::FIELDS)?;
                to_value(service.create_progress(input))
            }
            (Method::Get, Route::ProgressEntry(id)) => to_value(service.get_progress(id)),
            (Method::Put, Route::ProgressEntry(id)) => {
                let update: ProgressUpdate = parse_body(body, ProgressUpdate::FIELDS)?;
                to_value(service.update_progress(id, update))
            }
            (Method::Delete, Route::ProgressEntry(id)) => {
                service.delete_progress(id).map_err(error_response)?;
                Ok(json!({ "progress_id": id }))
            }
            (method, route) => Err(method_not_allowed(method.as_str(), route)),
        }
    }
}

/// Decodes a command body.
///
/// Unparseable JSON and non-object bodies are `400`. Missing or mistyped
/// fields are validation failures (`422`) naming the field.
fn parse_body<T: DeserializeOwned>(
    body: Option<&str>,
    fields: &[FieldSpec],
) -> Result<T, ApiResponse> {
    let raw = body
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| {
            ApiResponse::failure(STATUS_BAD_REQUEST, "bad_request", "request body is required")
        })?;
    let value: Value = serde_json::from_str(raw).map_err(|err| {
        ApiResponse::failure(
            STATUS_BAD_REQUEST,
            "bad_request",
            format!("malformed JSON body: {err}"),
        )
    })?;
    let object = value.as_object().ok_or_else(|| {
        ApiResponse::failure(
            STATUS_BAD_REQUEST,
            "bad_request",
            "request body must be a JSON object",
        )
    })?;

    if let Err(err) = check_fields(object, fields) {
        warn!(
            "event=command_rejected module=api status=invalid field={}",
            err.field()
        );
        return Err(error_response(TrackerServiceError::Validation(err)));
    }

    serde_json::from_value(value).map_err(|err| {
        ApiResponse::failure(
            STATUS_BAD_REQUEST,
            "bad_request",
            format!("malformed JSON body: {err}"),
        )
    })
}

fn to_value<T: Serialize>(result: Result<T, TrackerServiceError>) -> Result<Value, ApiResponse> {
    let value = result.map_err(error_response)?;
    serde_json::to_value(value).map_err(|err| {
        error!("event=api_encode module=api status=error error={err}");
        ApiResponse::failure(STATUS_INTERNAL, "internal", "failed to encode response")
    })
}

fn error_response(err: TrackerServiceError) -> ApiResponse {
    match err {
        TrackerServiceError::Validation(inner) => ApiResponse {
            status: STATUS_UNPROCESSABLE,
            body: json!({
                "error": "validation",
                "field": inner.field(),
                "message": inner.to_string(),
            }),
        },
        TrackerServiceError::GoalNotFound(_) | TrackerServiceError::ProgressNotFound(_) => {
            ApiResponse::failure(STATUS_NOT_FOUND, "not_found", err.to_string())
        }
        TrackerServiceError::Storage(inner) => {
            error!("event=api_storage module=api status=error error={inner}");
            ApiResponse::failure(STATUS_INTERNAL, "storage", "storage failure")
        }
    }
}

fn method_not_allowed(method: &str, route: Route) -> ApiResponse {
    let allow: Vec<&str> = route
        .allowed_methods()
        .iter()
        .map(|method| method.as_str())
        .collect();
    ApiResponse {
        status: STATUS_METHOD_NOT_ALLOWED,
        body: json!({
            "error": "method_not_allowed",
            "message": format!("method `{}` is not allowed here", method.trim()),
            "allow": allow,
        }),
    }
}

// Ids in paths are fine to log; query strings are dropped.
fn route_label(path: &str) -> &str {
    let path = path.trim();
    path.split_once('?').map_or(path, |(path, _)| path)
}
