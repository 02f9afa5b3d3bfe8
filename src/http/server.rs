//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, request context)
//! - Serve on a bound listener until shutdown is signalled

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ApiConfig;
use crate::http::handlers;
use crate::http::request::request_context;
use crate::lifecycle::Shutdown;

/// The backend API service.
pub struct ApiServer {
    router: Router,
    config: ApiConfig,
}

impl ApiServer {
    pub fn new(config: ApiConfig) -> Self {
        let router = Self::build_router(&config);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Known paths answer GET only; any other method (HEAD included) or path
    /// gets the JSON 404.
    #[allow(deprecated)]
    pub fn build_router(config: &ApiConfig) -> Router {
        Router::new()
            .route(
                "/health",
                get(handlers::health).head(handlers::not_found).fallback(handlers::not_found),
            )
            .route(
                "/sum",
                get(handlers::sum).head(handlers::not_found).fallback(handlers::not_found),
            )
            .fallback(handlers::not_found)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(middleware::from_fn(request_context))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until `shutdown` is triggered, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.request_timeout_secs,
            "API server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("API server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}
