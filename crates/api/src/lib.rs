//! # Slotbook API
//!
//! HTTP surface for the Slotbook booking service. Routes define the endpoint
//! structure, handlers implement request processing over the storage traits,
//! and middleware maps domain errors onto HTTP responses.
//!
//! Handlers never talk to a database directly; everything goes through the
//! [`slotbook_db::store::Store`] object in [`ApiState`], so the same surface
//! runs against PostgreSQL in production and the in-memory store in tests.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use slotbook_db::store::Store;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state available to every request handler.
pub struct ApiState {
    pub store: Arc<dyn Store>,
}

/// Builds the full application router over the given state. Split out of
/// [`start_server`] so tests can drive the router directly.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::settings::routes())
        .merge(routes::schedule::routes())
        .merge(routes::availability::routes())
        .merge(routes::booking::routes())
        .with_state(state)
}

/// Starts the API server: initializes logging, builds the router, applies
/// CORS and timeout layers, then serves until shutdown.
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn Store>) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState { store });
    let app = app(state);

    let app = if let Some(origins) = &config.cors_origins {
        let mut allowed: Vec<axum::http::HeaderValue> = Vec::new();
        for origin in origins {
            allowed.push(origin.parse()?);
        }
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(allowed)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
