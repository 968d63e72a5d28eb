//! Board model: pieces, squares, moves and the 8x8 grid

mod grid;
mod types;

pub use grid::{Board, Glyphs};
pub use types::{Color, Move, Piece, PieceType, Square};
