pub mod config;
pub mod modules;
pub mod services;

use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::Config;
use modules::metrics::metrics_routes;
use modules::status::{controller::not_found, status_routes};
use services::metrics::{metrics_middleware, HttpMetrics, MetricsError, MetricsRegistry, RequestObserver};
use services::security::security_headers;

pub struct AppState {
    pub service_name: String,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(service_name: impl Into<String>, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            service_name: service_name.into(),
            metrics,
        }
    }
}

/// Build the service with a fresh registry, default collectors and HTTP metrics.
pub fn create_app(config: &Config) -> Result<Router, MetricsError> {
    let metrics = MetricsRegistry::new();
    metrics.register_default_collectors()?;

    let http_metrics = Arc::new(HttpMetrics::register(&metrics)?);

    let state = Arc::new(AppState::new(config.service_name.clone(), metrics));

    Ok(build_router(state, http_metrics, config.body_limit_bytes))
}

/// Assemble routes and layers around an explicit state and metrics observer.
///
/// The metrics layer is added last so it is outermost: it starts the clock
/// before any other middleware and sees the final status code.
pub fn build_router(
    state: Arc<AppState>,
    observer: Arc<dyn RequestObserver>,
    body_limit_bytes: usize,
) -> Router {
    Router::new()
        .merge(status_routes())
        .merge(metrics_routes(state.metrics.clone()))
        .fallback(not_found)
        .layer(middleware::from_fn(security_headers))
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(observer, metrics_middleware))
        .with_state(state)
}
