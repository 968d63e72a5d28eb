//! JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use chess_board_core::relay::ErrorResponse;
use chess_board_core::Error;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn engine_missing() -> Self {
        Self::internal("Stockfish not initialized")
    }

    /// Maps a failed engine query; `context` names what the handler was doing
    pub fn from_engine(context: &str, err: Error) -> Self {
        error!(error = %err, "{}", context);
        Self::internal(format!("{}: {}", context, err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_failures_are_server_errors() {
        let response = ApiError::from_engine("Error processing move", Error::NoValidMove("(none)".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ApiError::from_engine("Error getting evaluation", Error::Timeout(std::time::Duration::from_secs(30)))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_keeps_its_status() {
        assert_eq!(ApiError::bad_request("bad move").into_response().status(), StatusCode::BAD_REQUEST);
    }
}
