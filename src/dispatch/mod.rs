//! Request Dispatcher
//!
//! Routes a named tool call with its argument bag through validation, the
//! listing cache, the shared Jenkins handle and the handler, then records the
//! outcome in metrics exactly once. Failures never escape as errors: they come
//! back as a classified [`ToolResponse`].

mod args;
mod catalogue;
mod handlers;
mod report;
mod request;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};

use crate::cache::TtlCache;
use crate::config::{JenkinsConfig, ServerConfig};
use crate::connection::ConnectionManager;
use crate::error::{BridgeError, ErrorCategory, Result};
use crate::jenkins::WaitOptions;
use crate::metrics::MetricsCollector;

pub use catalogue::{catalogue, Tool, ToolKind, ToolSpec};
pub use report::{HealthChecks, HealthLevel, HealthStatus};
pub use request::ToolRequest;

/// Prefix shared by every job listing cache key.
const JOB_LISTING_PATTERN: &str = "list-jobs";

// == Tool Output ==
/// Successful handler result: display text plus the structured payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub text: String,
    pub data: Option<Value>,
}

// == Tool Response ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub tool: String,
    pub success: bool,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
    #[serde(default)]
    pub data: Option<Value>,
    /// Served from the listing cache
    #[serde(default)]
    pub cached: bool,
}

impl ToolResponse {
    fn success(tool: &str, output: ToolOutput, cached: bool) -> Self {
        Self {
            tool: tool.to_string(),
            success: true,
            text: output.text,
            category: None,
            data: output.data,
            cached,
        }
    }

    fn failure(tool: &str, err: &BridgeError, jenkins_url: Option<&str>) -> Self {
        Self {
            tool: tool.to_string(),
            success: false,
            text: report::failure_report(tool, err, jenkins_url),
            category: Some(err.category()),
            data: None,
            cached: false,
        }
    }
}

// == Options ==
#[derive(Debug, Clone, PartialEq)]
pub struct DispatcherOptions {
    /// TTL of cached listings
    pub list_ttl: Duration,
    /// `None` leaves the cache unbounded
    pub cache_max_entries: Option<usize>,
    pub metrics_history: usize,
    pub wait: WaitOptions,
}

impl DispatcherOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            list_ttl: config.cache_ttl(),
            cache_max_entries: (config.cache_max_entries > 0).then_some(config.cache_max_entries),
            metrics_history: config.metrics_history,
            wait: WaitOptions {
                wait_for_start: true,
                timeout: config.trigger_wait_timeout(),
                poll_interval: config.trigger_poll_interval(),
            },
        }
    }
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

// == Dispatcher ==
pub struct Dispatcher {
    connections: Arc<ConnectionManager>,
    cache: TtlCache<ToolOutput>,
    metrics: MetricsCollector,
    options: DispatcherOptions,
}

impl Dispatcher {
    pub fn new(connections: Arc<ConnectionManager>, options: DispatcherOptions) -> Self {
        info!(
            "Dispatcher ready: {} tools, listing TTL {:?}",
            Tool::ALL.len(),
            options.list_ttl
        );
        Self {
            connections,
            cache: TtlCache::new(options.cache_max_entries),
            metrics: MetricsCollector::new(options.metrics_history),
            options,
        }
    }

    pub fn cache(&self) -> &TtlCache<ToolOutput> {
        &self.cache
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    // == Dispatch ==
    /// Runs one tool call to completion and records it.
    ///
    /// The recorded duration runs from entry to response, so tool lookup and
    /// argument validation are included.
    pub async fn dispatch(&self, name: &str, args: &Map<String, Value>) -> ToolResponse {
        let started = Instant::now();
        let outcome = self.run(name, args).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok((output, cached)) => {
                self.metrics.record(name, elapsed_ms, true, None).await;
                ToolResponse::success(name, output, cached)
            }
            Err(err) => {
                match &err {
                    BridgeError::Validation(_) | BridgeError::UnknownTool(_) => {
                        warn!("Validation error in {}: {}", name, err)
                    }
                    _ => error!("{} failed ({:?}): {}", name, err.category(), err),
                }
                self.metrics
                    .record(name, elapsed_ms, false, Some(err.to_string()))
                    .await;
                let config = self.connections.config().await;
                ToolResponse::failure(name, &err, config.url.as_deref())
            }
        }
    }

    async fn run(&self, name: &str, args: &Map<String, Value>) -> Result<(ToolOutput, bool)> {
        let tool = Tool::from_name(name).ok_or_else(|| BridgeError::UnknownTool(name.to_string()))?;
        let config = self.connections.config().await;
        let request = ToolRequest::parse(tool, args, config.console_max_lines)?;

        if !tool.needs_connection() {
            return Ok((self.introspect(&request).await, false));
        }

        if let Some(key) = request.cache_key() {
            let fetched = AtomicBool::new(false);
            let output = self
                .cache
                .get_or_fetch(
                    &key,
                    || async {
                        fetched.store(true, Ordering::Relaxed);
                        self.execute(&request, &config).await
                    },
                    self.options.list_ttl,
                )
                .await?;
            let cached = !fetched.load(Ordering::Relaxed);
            if cached {
                debug!("Cache hit for {}", key);
            }
            return Ok((output, cached));
        }

        let output = self.execute(&request, &config).await?;
        if tool.invalidates_listings() {
            let removed = self.cache.invalidate_pattern(JOB_LISTING_PATTERN).await;
            if removed > 0 {
                debug!("{} invalidated {} cached listings", name, removed);
            }
        }

        Ok((output, false))
    }

    async fn execute(&self, request: &ToolRequest, config: &JenkinsConfig) -> Result<ToolOutput> {
        let api = self.connections.get_connection().await?;
        let ctx = handlers::Context {
            config,
            wait: self.options.wait,
        };
        handlers::execute(api.as_ref(), request, &ctx).await
    }

    // == Introspection ==
    async fn introspect(&self, request: &ToolRequest) -> ToolOutput {
        match request {
            ToolRequest::ClearCache => {
                let removed = self.cache.clear().await;
                ToolOutput {
                    text: format!("Cache cleared: {} entries removed.", removed),
                    data: Some(json!({ "removed": removed })),
                }
            }
            ToolRequest::GetMetrics {
                operation: Some(operation),
            } => {
                let stats = self.metrics.operation_stats(operation).await.view();
                let data = json!(stats);
                ToolOutput {
                    text: format!(
                        "Metrics for '{}':\n\n{}",
                        operation,
                        serde_json::to_string_pretty(&data).unwrap_or_default()
                    ),
                    data: Some(data),
                }
            }
            ToolRequest::GetMetrics { operation: None } => {
                let data = json!(self.metrics.export().await);
                ToolOutput {
                    text: format!(
                        "Bridge metrics:\n\n{}",
                        serde_json::to_string_pretty(&data["summary"]).unwrap_or_default()
                    ),
                    data: Some(data),
                }
            }
            _ => {
                let data = json!({
                    "stats": self.cache.stats().await,
                    "entries": self.cache.info().await,
                });
                ToolOutput {
                    text: format!(
                        "Cache statistics:\n\n{}",
                        serde_json::to_string_pretty(&data["stats"]).unwrap_or_default()
                    ),
                    data: Some(data),
                }
            }
        }
    }
}
