//! Board-level engine queries
//!
//! Serializes a [`Board`] for the session and turns the answer back into
//! board terms.

use tracing::debug;

use super::protocol::PositionSpec;
use super::session::EngineSession;
use crate::board::{Board, Color, Move};
use crate::error::{Error, Result};
use crate::notation::{parse_move, to_fen_for};

/// Asks the engine for its move in `board` with `side` to play.
///
/// Fails with [`Error::NoValidMove`] when the engine has no move or names
/// one that is not a coordinate move.
pub async fn engine_move(session: &EngineSession, board: &Board, side: Color) -> Result<Move> {
    let fen = to_fen_for(board, side);
    let answer = session.best_move(&PositionSpec::Fen(fen)).await?;
    debug!(best = %answer.best, ponder = ?answer.ponder, "engine move");

    parse_move(&answer.best).map_err(|_| Error::NoValidMove(answer.best))
}

/// Evaluation of `board` in pawns, always from white's side
pub async fn evaluate_board(session: &EngineSession, board: &Board, side: Color) -> Result<f32> {
    let fen = to_fen_for(board, side);
    let score = session.evaluate(&PositionSpec::Fen(fen)).await?;

    if session.config().eval_mode.is_relative() && side == Color::Black {
        Ok(-score)
    } else {
        Ok(score)
    }
}
