pub mod build;
pub mod generate;
pub mod health;
pub mod pages;
pub mod projects;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(generate::router())
        .merge(pages::router())
        .merge(build::router())
        .merge(projects::router());

    Router::new()
        .nest("/api", api)
        .merge(health::router())
        .nest_service(
            "/flutter_apps",
            ServeDir::new(&state.config.public_dir),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
