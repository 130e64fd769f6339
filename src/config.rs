//! Runtime configuration for the pairing core.

use once_cell::sync::Lazy;
use std::env;

/// Hard ceiling on rounds generated by a single request, independent of
/// configuration. Keeps a bad client from flooding a tournament.
pub const MAX_ROUNDS_CEILING: u32 = 10;

#[derive(Debug)]
pub struct Settings {
    /// Rounds a single generation call may create (never above
    /// [`MAX_ROUNDS_CEILING`]).
    pub max_rounds_per_request: u32,
    /// Postgres pool size used by the bundled store adapter.
    pub db_max_connections: u32,
}

impl Settings {
    fn from_env() -> Self {
        let max_rounds_per_request = env::var("MAX_ROUNDS_PER_REQUEST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(MAX_ROUNDS_CEILING)
            .min(MAX_ROUNDS_CEILING);

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        Settings {
            max_rounds_per_request,
            db_max_connections,
        }
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
