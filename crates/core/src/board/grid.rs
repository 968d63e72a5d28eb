//! The 8x8 board and move application

use std::fmt;

use super::types::{Color, Move, Piece, PieceType, Square};

/// An 8x8 grid of optional pieces.
///
/// `Board` is a plain `Copy` value. Applying a move returns a new board and
/// leaves the old one untouched, so holding on to earlier boards is enough
/// to keep a game's past positions around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    /// Standard starting layout: black on rows 0-1, white on rows 6-7
    pub fn initial() -> Self {
        let mut board = Self::empty();

        for col in 0..8 {
            board.squares[Color::Black.pawn_rank() as usize][col] =
                Some(Piece::new(PieceType::Pawn, Color::Black));
            board.squares[Color::White.pawn_rank() as usize][col] =
                Some(Piece::new(PieceType::Pawn, Color::White));
        }

        for (col, kind) in PieceType::BACK_RANK.iter().enumerate() {
            board.squares[Color::Black.back_rank() as usize][col] = Some(Piece::new(*kind, Color::Black));
            board.squares[Color::White.back_rank() as usize][col] = Some(Piece::new(*kind, Color::White));
        }

        board
    }

    /// Piece on a square; `None` for empty and off-board squares
    pub fn get(&self, sq: Square) -> Option<Piece> {
        if !sq.is_on_board() {
            return None;
        }
        self.squares[sq.row as usize][sq.col as usize]
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.get(sq).is_none()
    }

    /// Places or clears a square in place. Off-board squares are ignored.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        if sq.is_on_board() {
            self.squares[sq.row as usize][sq.col as usize] = piece;
        }
    }

    /// Builder form of [`Board::set`] for assembling test and puzzle positions
    pub fn with_piece(mut self, sq: Square, piece: Piece) -> Self {
        self.set(sq, Some(piece));
        self
    }

    /// Returns the board after moving the piece on `mv.from` to `mv.to`.
    ///
    /// Legality is not checked. Whatever stood on the destination is
    /// overwritten, which is how captures happen. Pawns reaching the last
    /// rank stay pawns. A move touching an off-board square returns the
    /// board unchanged.
    pub fn apply(&self, mv: Move) -> Board {
        let mut next = *self;
        if !mv.from.is_on_board() || !mv.to.is_on_board() {
            return next;
        }
        let moving = next.squares[mv.from.row as usize][mv.from.col as usize].take();
        next.squares[mv.to.row as usize][mv.to.col as usize] = moving;
        next
    }

    /// Occupied squares, row by row from the top
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    pub fn count(&self, color: Color) -> usize {
        self.pieces().filter(|(_, p)| p.color == color).count()
    }

    /// Rows of the grid, top first
    pub fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.squares
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl Board {
    /// The same diagram as `Display`, drawn with Unicode piece glyphs
    pub fn glyphs(&self) -> Glyphs<'_> {
        Glyphs(self)
    }

    fn write_diagram(&self, f: &mut fmt::Formatter<'_>, draw: fn(Piece) -> char) -> fmt::Result {
        writeln!(f, "   a b c d e f g h")?;
        for (row, squares) in self.squares.iter().enumerate() {
            write!(f, "{} |", 8 - row)?;
            for square in squares {
                let c = square.map(draw).unwrap_or('.');
                write!(f, " {}", c)?;
            }
            writeln!(f, " | {}", 8 - row)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_diagram(f, Piece::fen_char)
    }
}

/// Glyph rendering of a board, see [`Board::glyphs`]
pub struct Glyphs<'a>(&'a Board);

impl fmt::Display for Glyphs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_diagram(f, Piece::symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn initial_board_has_sixteen_pieces_per_side() {
        let board = Board::initial();
        assert_eq!(board.count(Color::White), 16);
        assert_eq!(board.count(Color::Black), 16);
        assert_eq!(Square::all().count(), 64);
    }

    #[test]
    fn initial_pawns_sit_on_their_ranks() {
        let board = Board::initial();
        for col in 0..8 {
            assert_eq!(
                board.get(Square::new(6, col)),
                Some(Piece::new(PieceType::Pawn, Color::White))
            );
            assert_eq!(
                board.get(Square::new(1, col)),
                Some(Piece::new(PieceType::Pawn, Color::Black))
            );
        }
        for row in 2..6 {
            for col in 0..8 {
                assert!(board.is_empty(Square::new(row, col)));
            }
        }
    }

    #[test]
    fn back_ranks_mirror_each_other() {
        let board = Board::initial();
        for col in 0..8u8 {
            let black = board.get(Square::new(0, col)).map(|p| p.kind);
            let white = board.get(Square::new(7, col)).map(|p| p.kind);
            assert_eq!(black, white);
            assert_eq!(black, Some(PieceType::BACK_RANK[col as usize]));
        }
        assert_eq!(
            board.get(Square::new(7, 4)),
            Some(Piece::new(PieceType::King, Color::White))
        );
        assert_eq!(
            board.get(Square::new(0, 3)),
            Some(Piece::new(PieceType::Queen, Color::Black))
        );
    }

    #[test]
    fn apply_moves_piece_and_leaves_original_untouched() {
        let board = Board::initial();
        let mv = Move::new(Square::new(6, 4), Square::new(4, 4));
        let next = board.apply(mv);

        assert!(next.is_empty(mv.from));
        assert_eq!(next.get(mv.to), Some(Piece::new(PieceType::Pawn, Color::White)));
        assert_eq!(board, Board::initial());
        assert_eq!(next.count(Color::White), 16);
    }

    #[test]
    fn apply_overwrites_destination() {
        let board = Board::empty()
            .with_piece(Square::new(4, 4), Piece::new(PieceType::Rook, Color::White))
            .with_piece(Square::new(0, 4), Piece::new(PieceType::King, Color::Black));
        let next = board.apply(Move::new(Square::new(4, 4), Square::new(0, 4)));

        assert_eq!(next.count(Color::Black), 0);
        assert_eq!(next.get(Square::new(0, 4)), Some(Piece::new(PieceType::Rook, Color::White)));
    }

    #[test]
    fn pawn_on_last_rank_stays_a_pawn() {
        let board = Board::empty().with_piece(Square::new(1, 0), Piece::new(PieceType::Pawn, Color::White));
        let next = board.apply(Move::new(Square::new(1, 0), Square::new(0, 0)));
        assert_eq!(next.get(Square::new(0, 0)), Some(Piece::new(PieceType::Pawn, Color::White)));
    }

    #[test]
    fn apply_with_off_board_square_is_a_no_op() {
        let board = Board::initial();
        let next = board.apply(Move::new(Square::new(6, 4), Square::new(9, 4)));
        assert_eq!(next, board);
    }

    #[test]
    fn display_draws_ranks_and_files() {
        let text = Board::initial().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[1], "8 | r n b q k b n r | 8");
        assert_eq!(lines[4], "5 | . . . . . . . . | 5");
        assert_eq!(lines[8], "1 | R N B Q K B N R | 1");
    }

    #[test]
    fn glyph_diagram_uses_unicode_pieces() {
        let text = Board::initial().glyphs().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[1], "8 | ♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜ | 8");
        assert_eq!(lines[2], "7 | ♟ ♟ ♟ ♟ ♟ ♟ ♟ ♟ | 7");
        assert_eq!(lines[4], "5 | . . . . . . . . | 5");
        assert_eq!(lines[8], "1 | ♖ ♘ ♗ ♕ ♔ ♗ ♘ ♖ | 1");
    }
}
