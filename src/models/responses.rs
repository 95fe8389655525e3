//! Response DTOs for the bridge HTTP API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, EntryInfo};
use crate::dispatch::ToolSpec;

/// Response body for `GET /health`
///
/// Describes the bridge process; Jenkins itself is checked by the
/// `health-check` tool.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,
    pub version: String,
    /// Jenkins settings are complete
    pub jenkins_configured: bool,
    /// A Jenkins client has been built
    pub jenkins_connected: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy(jenkins_configured: bool, jenkins_connected: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            jenkins_configured,
            jenkins_connected,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for `GET /tools`
#[derive(Debug, Clone, Serialize)]
pub struct ToolListResponse {
    pub count: usize,
    pub tools: Vec<ToolSpec>,
}

impl ToolListResponse {
    pub fn new(tools: Vec<ToolSpec>) -> Self {
        Self {
            count: tools.len(),
            tools,
        }
    }
}

/// Response body for `GET /cache/stats`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub stats: CacheStats,
    pub entries: Vec<EntryInfo>,
}

/// Response body for `DELETE /cache`
#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    pub message: String,
    pub removed: usize,
}

impl ClearCacheResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            message: format!("Cache cleared: {} entries removed", removed),
            removed,
        }
    }
}

/// Response body for `DELETE /metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsResetResponse {
    pub message: String,
}

impl MetricsResetResponse {
    pub fn new() -> Self {
        Self {
            message: "Metrics reset".to_string(),
        }
    }
}

impl Default for MetricsResetResponse {
    fn default() -> Self {
        Self::new()
    }
}
