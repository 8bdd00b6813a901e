//! Server setup and lifecycle management

use std::sync::Arc;

use bioverify_adapters::{build_capabilities, AdapterConfig};
use bioverify_core::metrics::METRICS;
use bioverify_core::{load_networks, CheckpointStore, WebhookSecrets};
use bioverify_state::SurrealCheckpointStore;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use crate::router::create_router;
use crate::state::{AppState, Engines};

/// BioVerify daemon server
pub struct Server {
    config: DaemonConfig,
    state: AppState,
}

impl Server {
    pub fn new(config: DaemonConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Wire the production store, adapters and secrets from the environment.
    pub async fn from_env(config: DaemonConfig) -> DaemonResult<Self> {
        let store: Arc<dyn CheckpointStore> = Arc::new(SurrealCheckpointStore::from_env().await?);
        let networks = load_networks()?;
        let capabilities = build_capabilities(&AdapterConfig::from_env()?, &networks)?;
        let secrets = WebhookSecrets::from_env();

        if networks.is_empty() {
            warn!("no networks configured, every settlement will fail");
        }
        if secrets.submission.is_empty() || secrets.picked_reviewers.is_empty() {
            warn!("webhook secrets missing, affected routes will reject every delivery");
        }
        if config.operator_token.is_none() {
            warn!("BIOVERIFY_OPERATOR_TOKEN is not set, vote delivery is disabled");
        }

        let engines = Engines::new(&capabilities, store);
        let state = AppState::new(engines, secrets, config.operator_token.clone());
        Ok(Self::new(config, state))
    }

    /// Run the server until Ctrl+C or SIGTERM.
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.listen_addr;
        let app = create_router(self.state);

        let listener = TcpListener::bind(addr).await?;
        info!("bioverifyd listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        info!("bioverifyd shutting down");
        METRICS.flush();
        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
