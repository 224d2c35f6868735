//! HTTP routes: health, static assets and the game socket.

use std::path::Path;

use axum::{http, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeFile,
    trace::TraceLayer,
};

use crate::room::manager::RoomManager;
use crate::ws::connection::ws_handler;

#[derive(Clone)]
pub struct AppState {
    pub rooms: RoomManager,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// Full application router. Only a fixed set of assets is served.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let index = ServeFile::new(static_dir.join("index.html"));

    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .route_service("/", index.clone())
        .route_service("/index.html", index)
        .route_service("/styles.css", ServeFile::new(static_dir.join("styles.css")))
        .route_service("/app.js", ServeFile::new(static_dir.join("app.js")))
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_methods([http::Method::GET])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
