//! Position sanity checks
//!
//! Move legality never consults these. The board happily reaches states a
//! full rules engine would forbid (a captured king, pawns on the last rank),
//! and this pass only reports them.

use std::fmt;

use crate::board::{Board, Color, PieceType, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anomaly {
    MissingKing(Color),
    ExtraKings(Color, usize),
    PawnOnBackRank(Square),
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::MissingKing(color) => write!(f, "{} has no king", color),
            Anomaly::ExtraKings(color, count) => write!(f, "{} has {} kings", color, count),
            Anomaly::PawnOnBackRank(sq) => write!(f, "pawn on back rank at {}", sq),
        }
    }
}

pub fn audit(board: &Board) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for color in [Color::White, Color::Black] {
        let kings = board
            .pieces()
            .filter(|(_, p)| p.color == color && p.kind == PieceType::King)
            .count();
        match kings {
            0 => anomalies.push(Anomaly::MissingKing(color)),
            1 => {}
            n => anomalies.push(Anomaly::ExtraKings(color, n)),
        }
    }

    anomalies.extend(
        board
            .pieces()
            .filter(|(sq, p)| p.kind == PieceType::Pawn && (sq.row == 0 || sq.row == 7))
            .map(|(sq, _)| Anomaly::PawnOnBackRank(sq)),
    );

    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Move, Piece};

    #[test]
    fn initial_board_is_clean() {
        assert!(audit(&Board::initial()).is_empty());
    }

    #[test]
    fn captured_king_is_reported() {
        let board = Board::empty()
            .with_piece(Square::new(7, 4), Piece::new(PieceType::King, Color::White))
            .with_piece(Square::new(0, 4), Piece::new(PieceType::King, Color::Black))
            .with_piece(Square::new(4, 4), Piece::new(PieceType::Rook, Color::White));
        let after = board.apply(Move::new(Square::new(4, 4), Square::new(0, 4)));

        assert_eq!(audit(&after), vec![Anomaly::MissingKing(Color::Black)]);
    }

    #[test]
    fn promoted_pawn_and_extra_kings_are_reported() {
        let board = Board::initial()
            .with_piece(Square::new(4, 4), Piece::new(PieceType::King, Color::White))
            .with_piece(Square::new(0, 0), Piece::new(PieceType::Pawn, Color::White));

        let found = audit(&board);
        assert!(found.contains(&Anomaly::ExtraKings(Color::White, 2)));
        assert!(found.contains(&Anomaly::PawnOnBackRank(Square::new(0, 0))));
        assert_eq!(found.len(), 2);
    }
}
