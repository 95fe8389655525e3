//! Request and Response models for the bridge HTTP API
//!
//! DTOs serialized to and from HTTP bodies. Tool results themselves use
//! [`crate::dispatch::ToolResponse`].

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::parse_tool_arguments;
pub use responses::{
    CacheStatsResponse, ClearCacheResponse, HealthResponse, MetricsResetResponse,
    ToolListResponse,
};
