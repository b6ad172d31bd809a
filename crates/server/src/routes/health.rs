//! Liveness probe.

use axum::{Router, routing::get};

use crate::AppState;

pub async fn health() -> &'static str {
    "ok"
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
