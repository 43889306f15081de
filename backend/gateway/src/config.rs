use std::time::Duration;

use serde::Deserialize;

/// Rollmark runtime configuration.
///
/// Everything the pipeline needs from the environment is collected here and
/// passed explicitly into construction — no process-wide mutable state.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Base URL of the LMS instance
    pub lms_base_url: String,
    /// Base URL of the recognition service
    pub recognition_url: String,
    /// Per-remote-call timeout in seconds
    pub remote_timeout_secs: u64,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            lms_base_url: "https://canvas.instructure.com".to_string(),
            recognition_url: "http://localhost:10000".to_string(),
            remote_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: std::env::var("ROLLMARK_BIND")
                .unwrap_or(defaults.bind_address),
            port: std::env::var("ROLLMARK_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            lms_base_url: std::env::var("ROLLMARK_LMS_URL")
                .unwrap_or(defaults.lms_base_url),
            recognition_url: std::env::var("ROLLMARK_RECOGNITION_URL")
                .unwrap_or(defaults.recognition_url),
            remote_timeout_secs: std::env::var("ROLLMARK_REMOTE_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.remote_timeout_secs),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}
