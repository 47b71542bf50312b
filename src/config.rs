// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.

use chrono_tz::Tz;
use std::env;

/// Queue name expected in the scheduler callback header.
///
/// Cloud Run strips `x-cloudtasks-queuename` from external requests, so a
/// matching value guarantees the request came from our own scheduler queue.
pub const SCHEDULER_QUEUE_NAME: &str = "daily-aggregation";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Reference time zone for the daily schedule and "yesterday" math.
    ///
    /// The scheduler cadence is pinned to this zone; computing the target
    /// date in the same zone keeps the two from drifting apart.
    pub reference_timezone: Tz,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            reference_timezone: chrono_tz::Asia::Kolkata,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let reference_timezone = match env::var("REFERENCE_TIMEZONE") {
            Ok(name) => name
                .parse::<Tz>()
                .map_err(|_| ConfigError::Invalid("REFERENCE_TIMEZONE"))?,
            Err(_) => chrono_tz::Asia::Kolkata,
        };

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            reference_timezone,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
