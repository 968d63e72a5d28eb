//! Error types for chess-board-core

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Engine protocol error: {0}")]
    Protocol(String),

    #[error("Engine query timed out after {0:?}")]
    Timeout(Duration),

    #[error("No valid move found: {0}")]
    NoValidMove(String),

    #[error("Invalid move notation: {0}")]
    Notation(String),

    #[error("Relay error: {0}")]
    Relay(String),
}

pub type Result<T> = std::result::Result<T, Error>;
