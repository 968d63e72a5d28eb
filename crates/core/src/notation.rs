//! Position strings for the engine and coordinate move parsing
//!
//! The FEN written here only carries piece placement faithfully. Castling
//! rights, en passant target and move counters are always the fixed
//! `KQkq - 0 1`, so every engine query looks like a fresh game.

use shakmaty::uci::UciMove;

use crate::board::{Board, Color, Move, Square};
use crate::error::{Error, Result};

/// Suffix appended by [`to_fen`]: white to move, full castling rights,
/// no en passant square, counters reset
pub const FIXED_SUFFIX: &str = "w KQkq - 0 1";

const FILES: &str = "abcdefgh";

/// Piece placement field of a FEN string, row 0 first
pub fn placement(board: &Board) -> String {
    let mut fen = String::with_capacity(72);

    for (row, squares) in board.rows().iter().enumerate() {
        let mut empty = 0;
        for square in squares {
            match square {
                Some(piece) => {
                    if empty > 0 {
                        fen.push_str(&empty.to_string());
                        empty = 0;
                    }
                    fen.push(piece.fen_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            fen.push_str(&empty.to_string());
        }
        if row < 7 {
            fen.push('/');
        }
    }

    fen
}

/// FEN with the fixed white-to-move suffix
pub fn to_fen(board: &Board) -> String {
    format!("{} {}", placement(board), FIXED_SUFFIX)
}

/// FEN naming the actual side to move; the remaining fields stay fixed
pub fn to_fen_for(board: &Board, side: Color) -> String {
    format!("{} {} KQkq - 0 1", placement(board), side.fen_char())
}

/// Parses a square name such as `e2`
pub fn parse_square(text: &str) -> Result<Square> {
    let mut chars = text.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(file), Some(rank), None) => square_from_chars(file, rank)
            .ok_or_else(|| Error::Notation(format!("bad square '{}'", text))),
        _ => Err(Error::Notation(format!("bad square '{}'", text))),
    }
}

fn square_from_chars(file: char, rank: char) -> Option<Square> {
    let col = FILES.find(file)? as u8;
    let rank = rank.to_digit(10)? as u8;
    if !(1..=8).contains(&rank) {
        return None;
    }
    Some(Square::new(8 - rank, col))
}

/// Parses a coordinate move like `e2e4`.
///
/// Only the first four characters are read. A fifth character (the
/// promotion piece in engine output) is ignored, so a promotion comes back
/// as a plain pawn move.
pub fn parse_move(text: &str) -> Result<Move> {
    let chars: Vec<char> = text.trim().chars().take(4).collect();
    let &[from_file, from_rank, to_file, to_rank] = chars.as_slice() else {
        return Err(Error::Notation(format!("move '{}' is shorter than 4 characters", text)));
    };

    let from = square_from_chars(from_file, from_rank);
    let to = square_from_chars(to_file, to_rank);
    match (from, to) {
        (Some(from), Some(to)) => Ok(Move::new(from, to)),
        _ => Err(Error::Notation(format!("bad move '{}'", text))),
    }
}

/// Splits a space-separated move list and checks every token is a UCI move
pub fn parse_move_list(text: &str) -> Result<Vec<String>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<UciMove>()
                .map(|_| token.to_string())
                .map_err(|_| Error::Notation(format!("bad move '{}' in move list", token)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, PieceType};
    use pretty_assertions::assert_eq;
    use shakmaty::fen::Fen;

    #[test]
    fn initial_board_serializes_to_standard_fen() {
        assert_eq!(
            to_fen(&Board::initial()),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn empty_runs_are_counted() {
        let board = Board::initial().apply(parse_move("e2e4").unwrap());
        assert_eq!(
            to_fen(&board),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn suffix_stays_white_to_move_after_black_moves() {
        let board = Board::initial()
            .apply(parse_move("e2e4").unwrap())
            .apply(parse_move("e7e5").unwrap());
        assert!(to_fen(&board).ends_with(" w KQkq - 0 1"));
        assert!(to_fen_for(&board, Color::Black).ends_with(" b KQkq - 0 1"));
    }

    #[test]
    fn serialized_positions_are_valid_fen() {
        let board = Board::empty()
            .with_piece(Square::new(0, 7), Piece::new(PieceType::King, Color::Black))
            .with_piece(Square::new(5, 2), Piece::new(PieceType::Queen, Color::White))
            .with_piece(Square::new(7, 0), Piece::new(PieceType::King, Color::White));
        let fen = to_fen(&board);
        assert_eq!(fen, "7k/8/8/8/8/2Q5/8/K7 w KQkq - 0 1");
        assert!(fen.parse::<Fen>().is_ok());
        assert!(to_fen(&Board::initial()).parse::<Fen>().is_ok());
    }

    #[test]
    fn parse_move_uses_file_and_rank_tables() {
        let mv = parse_move("e2e4").unwrap();
        assert_eq!(mv.from, Square::new(6, 4));
        assert_eq!(mv.to, Square::new(4, 4));

        let mv = parse_move("a8h1").unwrap();
        assert_eq!(mv.from, Square::new(0, 0));
        assert_eq!(mv.to, Square::new(7, 7));
    }

    #[test]
    fn promotion_letter_is_ignored() {
        assert_eq!(parse_move("a7a8q").unwrap(), parse_move("a7a8").unwrap());
    }

    #[test]
    fn malformed_moves_are_errors() {
        for bad in ["", "e2", "e2e", "(none)", "i2e4", "e9e4", "e0e4", "é2e4"] {
            assert!(parse_move(bad).is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn every_square_pair_round_trips() {
        for from in Square::all() {
            for to in Square::all().filter(|to| *to != from) {
                let mv = Move::new(from, to);
                assert_eq!(parse_move(&mv.to_string()).unwrap(), mv);
            }
        }
    }

    #[test]
    fn squares_parse_by_name() {
        assert_eq!(parse_square("e2").unwrap(), Square::new(6, 4));
        assert_eq!(parse_square("h8").unwrap(), Square::new(0, 7));
        assert!(parse_square("e22").is_err());
        assert!(parse_square("z1").is_err());
    }

    #[test]
    fn move_list_tokens_are_checked() {
        assert_eq!(
            parse_move_list(" e2e4  e7e5 a7a8q ").unwrap(),
            vec!["e2e4", "e7e5", "a7a8q"]
        );
        assert!(parse_move_list("").unwrap().is_empty());
        assert!(parse_move_list("e2e4 ; rm").is_err());
    }
}
