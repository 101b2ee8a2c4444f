//! Readiness aggregation engine and the probe endpoints built on it.

pub mod aggregator;
pub mod bootstrap;
pub mod checks;
pub mod config;
pub mod dedup;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod report;

pub use aggregator::Aggregator;
pub use checks::{Check, CustomCheck, DiskCheck, TcpCheck};
pub use config::ProbeConfig;
pub use dedup::DedupPolicy;
pub use error::{ProbeError, Result};
pub use handlers::create_routes;
pub use registry::{CheckFactory, CheckOptions, CheckRegistry, RegistryEntry};
pub use report::{AggregateReport, CheckResult, CheckStatus, OverallStatus};

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            app_name: "Readiness Probe".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            aggregator: Arc::new(aggregator),
        }
    }

    /// Builds the whole engine from deployment configuration. The
    /// registry is validated here so a misconfigured entry fails process
    /// startup instead of surfacing during a probe.
    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        let registry = bootstrap::build_registry(&config.checks);
        registry.validate()?;

        let policy = bootstrap::build_dedup_policy(&config.checks);

        let mut aggregator = Aggregator::new(Arc::new(registry), policy);
        if let Some(deadline_ms) = config.checks.deadline_ms {
            aggregator = aggregator.with_deadline(Duration::from_millis(deadline_ms));
        }

        Ok(Self::new(aggregator))
    }
}

pub fn create_app(state: AppState) -> Router {
    create_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
