//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, store calls, and aggregation into use-case APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod tracker_service;
