//! Configuration Module
//!
//! Two records: [`JenkinsConfig`] describes the Jenkins connection and is
//! loaded from several sources, [`ServerConfig`] holds the process knobs and is
//! read from environment variables.

mod editor;
mod jenkins;

use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_LIST_TTL_SECS;

pub use editor::EditorSettingsLoader;
pub use jenkins::{JenkinsConfig, JenkinsOverrides};

/// Process configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// HTTP server port
    pub server_port: u16,
    /// Background cache sweep interval in seconds
    pub cleanup_interval: u64,
    /// TTL in seconds for cached listings
    pub cache_ttl: u64,
    /// Cache capacity, 0 = unbounded
    pub cache_max_entries: usize,
    /// Number of executions kept in metrics history
    pub metrics_history: usize,
    /// How long trigger-build waits for the new build to appear, in seconds
    pub trigger_wait_timeout: u64,
    /// Poll interval while waiting for the new build, in milliseconds
    pub trigger_poll_interval_ms: u64,
    /// Whether editor settings files are consulted for Jenkins settings
    pub load_editor_settings: bool,
}

impl ServerConfig {
    /// Creates a new ServerConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cache sweep frequency in seconds (default: 5)
    /// - `CACHE_TTL` - Listing cache TTL in seconds (default: 30)
    /// - `CACHE_MAX_ENTRIES` - Cache capacity, 0 for unbounded (default: 1000)
    /// - `METRICS_HISTORY` - Metrics history size (default: 1000)
    /// - `TRIGGER_WAIT_TIMEOUT` - Build start wait in seconds (default: 30)
    /// - `TRIGGER_POLL_INTERVAL_MS` - Build start poll interval (default: 1000)
    /// - `LOAD_EDITOR_SETTINGS` - Read editor settings files (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: env_parse("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            cache_ttl: env_parse("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            cache_max_entries: env_parse("CACHE_MAX_ENTRIES")
                .unwrap_or(defaults.cache_max_entries),
            metrics_history: env_parse("METRICS_HISTORY").unwrap_or(defaults.metrics_history),
            trigger_wait_timeout: env_parse("TRIGGER_WAIT_TIMEOUT")
                .unwrap_or(defaults.trigger_wait_timeout),
            trigger_poll_interval_ms: env_parse("TRIGGER_POLL_INTERVAL_MS")
                .unwrap_or(defaults.trigger_poll_interval_ms),
            load_editor_settings: env::var("LOAD_EDITOR_SETTINGS")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.load_editor_settings),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn trigger_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.trigger_wait_timeout)
    }

    pub fn trigger_poll_interval(&self) -> Duration {
        Duration::from_millis(self.trigger_poll_interval_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 5,
            cache_ttl: DEFAULT_LIST_TTL_SECS,
            cache_max_entries: 1000,
            metrics_history: 1000,
            trigger_wait_timeout: 30,
            trigger_poll_interval_ms: 1000,
            load_editor_settings: true,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Accepts the usual spellings of a boolean flag.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
