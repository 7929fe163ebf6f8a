//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use rates_types::RateStore;

use super::graphql;
use super::handlers::{self, AppState};
use crate::RateService;

/// HTTP Server for the exchange rate API.
pub struct HttpServer<S: RateStore> {
    state: Arc<AppState<S>>,
}

impl<S: RateStore> HttpServer<S> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: RateService<S>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
        }
    }

    /// Builds the Axum router with the REST and GraphQL surfaces.
    pub fn router(&self) -> Router {
        let schema = graphql::build_schema(self.state.clone());

        let currency = Router::new()
            .route(
                "/exchange/historical/{from}",
                get(handlers::historical_exchange_rate::<S>),
            )
            .route(
                "/exchange/least/{from}",
                get(handlers::least_exchange_rate::<S>),
            )
            .route(
                "/convert/historical/{from}/to/{to}",
                get(handlers::historical_conversion_rate::<S>),
            )
            .route(
                "/convert/least/{from}/to/{to}",
                get(handlers::least_conversion_rate::<S>),
            );

        Router::new()
            .route("/health", get(handlers::health))
            .nest("/currency", currency)
            .route(
                "/graphql",
                get(graphql::graphiql).post_service(async_graphql_axum::GraphQL::new(schema)),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
