use axum::{extract::State, routing::get, Json, Router};
use tower_http::cors::CorsLayer;

use crate::poller::{StatusBoard, StatusSnapshot};

#[derive(Clone)]
pub struct AppState {
    pub status: StatusBoard,
}

impl AppState {
    pub fn new(status: StatusBoard) -> Self {
        Self { status }
    }
}

/// `/health` and `/status`. Merge a metrics router on top when a recorder is installed.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/status", get(status))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.status.snapshot())
}
