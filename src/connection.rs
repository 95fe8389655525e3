//! Connection Manager
//!
//! Holds at most one Jenkins handle for the active configuration. The handle
//! is built on first use, shared by every request, and dropped when the
//! configuration is replaced. Construction happens under the state lock, so
//! concurrent first calls never build twice.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::JenkinsConfig;
use crate::error::{BridgeError, Result};
use crate::jenkins::{JenkinsApi, RawClient, ResilientClient, RichClient};

// == Client Factory ==
/// Builds a Jenkins handle from a validated configuration.
pub trait ClientFactory: Send + Sync {
    fn build(&self, config: &JenkinsConfig) -> Result<Arc<dyn JenkinsApi>>;
}

/// Rich client first, raw client as fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpClientFactory;

impl ClientFactory for HttpClientFactory {
    fn build(&self, config: &JenkinsConfig) -> Result<Arc<dyn JenkinsApi>> {
        let primary = RichClient::new(config)?;
        let secondary = RawClient::new(config)?;
        Ok(Arc::new(ResilientClient::new(
            Arc::new(primary),
            Arc::new(secondary),
        )))
    }
}

struct State {
    config: JenkinsConfig,
    handle: Option<Arc<dyn JenkinsApi>>,
}

// == Connection Manager ==
pub struct ConnectionManager {
    factory: Arc<dyn ClientFactory>,
    state: Mutex<State>,
}

impl ConnectionManager {
    pub fn new(factory: Arc<dyn ClientFactory>, config: JenkinsConfig) -> Self {
        Self {
            factory,
            state: Mutex::new(State {
                config,
                handle: None,
            }),
        }
    }

    /// Returns the shared handle, building it when absent.
    ///
    /// Fails with a configuration error before any network activity when the
    /// URL, username or credential is missing.
    pub async fn get_connection(&self) -> Result<Arc<dyn JenkinsApi>> {
        let mut state = self.state.lock().await;
        if let Some(handle) = &state.handle {
            return Ok(Arc::clone(handle));
        }

        if !state.config.is_configured() {
            return Err(BridgeError::Configuration(
                "Jenkins settings incomplete. Required: url, username, and (token or password)"
                    .to_string(),
            ));
        }
        state.config.validate()?;

        let handle = self.factory.build(&state.config)?;
        info!(
            "Jenkins client created for {} ({})",
            state.config.url.as_deref().unwrap_or_default(),
            state.config.auth_method()
        );
        state.handle = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Swaps the configuration and drops the current handle.
    pub async fn replace_config(&self, config: JenkinsConfig) {
        let mut state = self.state.lock().await;
        state.config = config;
        state.handle = None;
        info!("Jenkins configuration replaced, client will be rebuilt");
    }

    /// Drops the current handle; the next call rebuilds it.
    pub async fn invalidate(&self) {
        if self.state.lock().await.handle.take().is_some() {
            info!("Jenkins client invalidated");
        }
    }

    pub async fn config(&self) -> JenkinsConfig {
        self.state.lock().await.config.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.handle.is_some()
    }

    /// Best-effort smoke test: one bounded `server_version` call. Failures are
    /// logged and the handle is returned anyway.
    pub async fn probe(&self, timeout: Duration) -> Result<Arc<dyn JenkinsApi>> {
        let handle = self.get_connection().await?;

        match tokio::time::timeout(timeout, handle.server_version()).await {
            Ok(Ok(version)) => info!("Connected to Jenkins {}", version),
            Ok(Err(e)) => warn!("Jenkins connectivity probe failed: {}", e),
            Err(_) => warn!("Jenkins connectivity probe timed out after {:?}", timeout),
        }
        Ok(handle)
    }
}
