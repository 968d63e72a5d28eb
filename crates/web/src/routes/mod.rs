use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::info;

use chess_board_core::engine::{EngineSession, PositionSpec};
use chess_board_core::notation::parse_move_list;
use chess_board_core::relay::{EvaluationResponse, MoveResponse, PositionRequest, StatusResponse};

use crate::error::ApiError;
use crate::AppState;

pub async fn index() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Chess server is running".to_string(),
    })
}

pub async fn best_move(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PositionRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let engine = engine(&state)?;
    let position = position(&request)?;

    let answer = engine
        .best_move(&position)
        .await
        .map_err(|e| ApiError::from_engine("Error processing move", e))?;
    info!(position = %request.position, best = %answer.best, "best move");

    Ok(Json(MoveResponse { best_move: answer.best }))
}

pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PositionRequest>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    let engine = engine(&state)?;
    let position = position(&request)?;

    let evaluation = engine
        .evaluate(&position)
        .await
        .map_err(|e| ApiError::from_engine("Error getting evaluation", e))?;
    info!(position = %request.position, evaluation, "evaluation");

    Ok(Json(EvaluationResponse { evaluation }))
}

pub async fn health() -> &'static str {
    "OK"
}

fn engine(state: &AppState) -> Result<&EngineSession, ApiError> {
    state.engine.as_ref().ok_or_else(ApiError::engine_missing)
}

fn position(request: &PositionRequest) -> Result<PositionSpec, ApiError> {
    let moves = parse_move_list(&request.position).map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(PositionSpec::StartMoves(moves))
}
