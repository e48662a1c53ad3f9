//! Request/response surface for Deadliner.
//!
//! Callers hand in `(method, path, body)` triples and receive `{status, body}`
//! envelopes. Transport (HTTP, IPC, CLI) is the caller's concern.

pub mod api;
pub mod route;

pub use api::{Api, ApiResponse};
pub use route::{Method, Route, RouteError};
