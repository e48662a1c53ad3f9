//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve database path, log directory and log level.
//! - Provide platform defaults under the user data directory.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Resolution never fails; callers validate the level when logging starts.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "DEADLINER_DB_PATH";
pub const LOG_DIR_ENV: &str = "DEADLINER_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "DEADLINER_LOG_LEVEL";

const APP_DIR_NAME: &str = "deadliner";
const DB_FILE_NAME: &str = "deadliner.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl CoreConfig {
    /// Resolves settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let app_dir = default_app_dir();

        Self {
            db_path: value(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| app_dir.join(DB_FILE_NAME)),
            log_dir: value(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| app_dir.join(LOG_DIR_NAME)),
            log_level: value(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
        }
    }
}

fn default_app_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn explicit_values_override_defaults() {
        let vars = HashMap::from([
            (DB_PATH_ENV, "/tmp/goals.sqlite3"),
            (LOG_DIR_ENV, "/tmp/goal-logs"),
            (LOG_LEVEL_ENV, "warn"),
        ]);
        let config = CoreConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/tmp/goals.sqlite3"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/goal-logs"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = CoreConfig::from_lookup(|_| Some("   ".to_string()));

        assert!(config.db_path.ends_with("deadliner/deadliner.sqlite3"));
        assert!(config.log_dir.ends_with("deadliner/logs"));
        assert!(!config.log_level.is_empty());
    }
}
