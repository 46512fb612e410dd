use axum::{routing::get, Router};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn status_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(controller::root))
        .route("/health", get(controller::health_check))
        .route("/healthz", get(controller::healthz))
}
