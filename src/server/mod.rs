mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

pub use state::AppState;

use crate::config::Settings;
use crate::location::LocationError;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/records", post(handlers::submit_record))
        .route("/api/records/{ip}", get(handlers::cached_record))
        .route("/api/latest", get(handlers::latest_record))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn state_from(settings: &Settings) -> Arc<AppState> {
    Arc::new(AppState {
        cache: Mutex::new(settings.open_cache()),
        options: settings.parse_options(),
    })
}

pub async fn start(settings: &Settings) -> Result<(), LocationError> {
    let app = build_router(state_from(settings));
    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LocationError::Server(format!("cannot bind to {}: {}", addr, e)))?;

    log::info!("iptrack server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| LocationError::Server(e.to_string()))
}
