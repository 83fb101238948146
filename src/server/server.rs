//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all dispatch handler
//! - Wire up middleware (tracing, request timeout)
//! - Bind to a listener and serve with graceful shutdown

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::routing::ServiceRouter;
use crate::server::dispatcher::dispatch;

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ServiceRouter>,
    pub max_body_bytes: usize,
}

/// HTTP server hosting one Twirp service.
pub struct TwirpServer {
    router: Router,
    config: ServerConfig,
}

impl TwirpServer {
    /// Create a new server for the given service route table.
    pub fn new(config: ServerConfig, service: ServiceRouter) -> Self {
        let state = AppState {
            service: Arc::new(service),
            max_body_bytes: config.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Every path goes through `dispatch`; non-POST and unroutable requests
    /// get their `bad_route` envelope there, not a bare Axum 404.
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, std::io::Error> {
        TcpListener::bind(&self.config.bind_address).await
    }

    /// Bind the configured address and run until Ctrl+C.
    pub async fn serve(self) -> Result<(), std::io::Error> {
        let listener = self.bind().await?;
        self.run(listener).await
    }

    /// Run the server until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_with_shutdown(listener, shutdown_signal()).await
    }

    /// Run the server until the given future resolves.
    pub async fn run_with_shutdown(
        self,
        listener: TcpListener,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Twirp server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("Twirp server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
