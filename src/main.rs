//! Jenkins Bridge server binary
//!
//! Loads configuration, builds the dispatcher and serves the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jenkins_bridge::api::{create_router, AppState};
use jenkins_bridge::config::{JenkinsConfig, JenkinsOverrides, ServerConfig};
use jenkins_bridge::{
    spawn_cleanup_task, ConnectionManager, Dispatcher, DispatcherOptions, HttpClientFactory,
};

/// Upper bound on the startup connectivity probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Main entry point for the Jenkins bridge.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load server and Jenkins configuration
/// 3. Build the connection manager and dispatcher
/// 4. Probe Jenkins (failures are logged, not fatal)
/// 5. Start background TTL cleanup task
/// 6. Serve the HTTP API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jenkins_bridge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Jenkins Bridge {}", env!("CARGO_PKG_VERSION"));

    let server = ServerConfig::from_env();
    info!(
        "Configuration loaded: port={}, cache_ttl={}s, cache_max_entries={}, cleanup_interval={}s",
        server.server_port, server.cache_ttl, server.cache_max_entries, server.cleanup_interval
    );

    let jenkins = JenkinsConfig::load(server.load_editor_settings, JenkinsOverrides::default());
    jenkins.log_config();
    if !jenkins.is_configured() {
        bail!(
            "Jenkins settings incomplete. Set JENKINS_URL, JENKINS_USERNAME and \
             JENKINS_TOKEN (or JENKINS_PASSWORD), or add them to the editor settings"
        );
    }
    jenkins.validate().context("Invalid Jenkins configuration")?;

    let connections = Arc::new(ConnectionManager::new(Arc::new(HttpClientFactory), jenkins));
    let dispatcher = Dispatcher::new(
        Arc::clone(&connections),
        DispatcherOptions::from_config(&server),
    );

    connections
        .probe(PROBE_TIMEOUT)
        .await
        .context("Failed to create Jenkins client")?;

    let cleanup_handle = spawn_cleanup_task(dispatcher.cache().clone(), server.cleanup_interval);
    info!("Background cleanup task started");

    let app = create_router(AppState::new(dispatcher));

    let addr = SocketAddr::from(([0, 0, 0, 0], server.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
