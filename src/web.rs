use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::api;
use crate::service::WeatherService;

/// Headroom on top of the provider calls for resolving and serializing
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Upper bound for a whole API request. A lookup makes at most two sequential
/// provider calls (geocode, then weather), each bounded by `provider_timeout`.
#[must_use]
pub fn request_timeout(provider_timeout: Duration) -> Duration {
    provider_timeout * 2 + REQUEST_TIMEOUT_MARGIN
}

pub fn app(service: Arc<WeatherService>, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(service))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
}

pub async fn run(
    host: &str,
    port: u16,
    service: Arc<WeatherService>,
    request_timeout: Duration,
) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app(service, request_timeout))
        .await
        .context("Web server stopped unexpectedly")
}
