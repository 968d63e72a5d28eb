//! Relay server: a JSON HTTP front for one UCI engine

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use chess_board_core::EngineSession;

pub mod config;
pub mod error;
mod routes;

pub struct AppState {
    /// `None` when the engine could not be started; queries then fail with 500
    pub engine: Option<EngineSession>,
}

impl AppState {
    pub fn new(engine: Option<EngineSession>) -> Arc<Self> {
        Arc::new(Self { engine })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/move", post(routes::best_move))
        .route("/evaluate", post(routes::evaluate))
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
