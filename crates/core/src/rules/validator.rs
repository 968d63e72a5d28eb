//! Piece movement rules
//!
//! Geometry and occupancy only: there is no check detection, castling,
//! en passant or promotion. Every function here is a pure predicate.

use crate::board::{Board, Color, PieceType, Square};

/// Decides whether `player` may move the piece on `from` to `to`.
///
/// Returns `false` instead of failing for every malformed request:
/// off-board squares, `from == to`, an empty source square, a piece of the
/// other side, or a destination holding one of `player`'s own pieces.
pub fn is_legal(board: &Board, from: Square, to: Square, player: Color) -> bool {
    if !from.is_on_board() || !to.is_on_board() {
        return false;
    }
    if from == to {
        return false;
    }

    let Some(piece) = board.get(from) else {
        return false;
    };
    if piece.color != player {
        return false;
    }
    if board.get(to).is_some_and(|target| target.color == player) {
        return false;
    }

    match piece.kind {
        PieceType::Pawn => is_valid_pawn_move(board, from, to, piece.color),
        PieceType::Rook => is_valid_rook_move(board, from, to),
        PieceType::Knight => is_valid_knight_move(from, to),
        PieceType::Bishop => is_valid_bishop_move(board, from, to),
        PieceType::Queen => is_valid_rook_move(board, from, to) || is_valid_bishop_move(board, from, to),
        PieceType::King => is_valid_king_move(from, to),
    }
}

/// Every destination `is_legal` accepts for the piece on `from`
pub fn legal_destinations(board: &Board, from: Square, player: Color) -> Vec<Square> {
    Square::all()
        .filter(|to| is_legal(board, from, *to, player))
        .collect()
}

fn deltas(from: Square, to: Square) -> (i8, i8) {
    (to.row as i8 - from.row as i8, to.col as i8 - from.col as i8)
}

fn is_valid_pawn_move(board: &Board, from: Square, to: Square, color: Color) -> bool {
    let direction = color.forward();
    let (d_row, d_col) = deltas(from, to);
    let target_empty = board.is_empty(to);

    // Single step forward
    if d_col == 0 && d_row == direction {
        return target_empty;
    }

    // Double step from the starting rank
    if d_col == 0 && d_row == 2 * direction && from.row == color.pawn_rank() {
        let passes_empty = from
            .offset(direction, 0)
            .is_some_and(|middle| board.is_empty(middle));
        return target_empty && passes_empty;
    }

    // Diagonal capture only; own pieces were already rejected
    if d_col.abs() == 1 && d_row == direction {
        return !target_empty;
    }

    false
}

fn is_valid_rook_move(board: &Board, from: Square, to: Square) -> bool {
    if from.row != to.row && from.col != to.col {
        return false;
    }
    is_path_clear(board, from, to)
}

fn is_valid_bishop_move(board: &Board, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    if d_row.abs() != d_col.abs() {
        return false;
    }
    is_path_clear(board, from, to)
}

fn is_valid_knight_move(from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    matches!((d_row.abs(), d_col.abs()), (2, 1) | (1, 2))
}

fn is_valid_king_move(from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    d_row.abs() <= 1 && d_col.abs() <= 1
}

/// Walks from `from` toward `to` one step at a time and checks that every
/// square strictly between them is empty. Callers guarantee the two squares
/// share a row, a column or a diagonal.
fn is_path_clear(board: &Board, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    let step = (d_row.signum(), d_col.signum());

    let mut current = from;
    loop {
        let Some(next) = current.offset(step.0, step.1) else {
            return false;
        };
        if next == to {
            return true;
        }
        if !board.is_empty(next) {
            return false;
        }
        current = next;
    }
}
