//! Jenkins Bridge - cached, metered access to Jenkins as named tools
//!
//! Tool calls go through a dispatcher that validates arguments, serves
//! listings from a TTL cache, reaches Jenkins through a primary/secondary
//! client pair and records every outcome in metrics.

pub mod api;
pub mod cache;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod jenkins;
pub mod metrics;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::{JenkinsConfig, ServerConfig};
pub use connection::{ClientFactory, ConnectionManager, HttpClientFactory};
pub use dispatch::{Dispatcher, DispatcherOptions, ToolResponse};
pub use error::{BridgeError, ErrorCategory, RemoteError};
pub use tasks::spawn_cleanup_task;
