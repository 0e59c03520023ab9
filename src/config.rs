//! Application configuration loaded from environment variables.
//!
//! Nothing here is secret: FCM and Firestore authenticate through the
//! service account attached to the Cloud Run instance.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID
    pub gcp_project_id: String,
    /// Region the service and its trigger bindings are deployed in
    pub gcp_region: String,
    /// Timezone of the Cloud Scheduler bindings (informational; the
    /// schedule itself lives in the scheduler job definition)
    pub scheduler_timezone: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
            gcp_region: env::var("GCP_REGION")
                .unwrap_or_else(|_| "northamerica-northeast1".to_string()),
            scheduler_timezone: env::var("SCHEDULER_TIMEZONE")
                .unwrap_or_else(|_| "America/Santiago".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Default config for offline tests.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            gcp_region: "northamerica-northeast1".to_string(),
            scheduler_timezone: "America/Santiago".to_string(),
            port: 8080,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
