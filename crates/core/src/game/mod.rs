//! Game state as the board UI keeps it: position, turn, history and the
//! square picked by a first click

use tracing::{debug, warn};

use crate::board::{Board, Color, Move, Square};
use crate::notation::to_fen_for;
use crate::rules::{audit, is_legal};

/// Result of clicking a square
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A piece of the player to move is now selected
    Selected(Square),
    /// The selected piece moved to the clicked square
    Moved(Move),
    /// The move from the selected square was illegal; selection cleared
    Rejected(Move),
    /// Nothing selected and the square holds no piece of the player to move
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    to_move: Color,
    history: Vec<Move>,
    selected: Option<Square>,
}

impl Game {
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            to_move: Color::White,
            history: Vec::new(),
            selected: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    /// Plays `from -> to` for the player to move if the rules allow it.
    /// Illegal moves leave the game untouched.
    pub fn try_move(&mut self, from: Square, to: Square) -> bool {
        if !is_legal(&self.board, from, to, self.to_move) {
            debug!(%from, %to, player = %self.to_move, "move rejected");
            return false;
        }
        self.play(Move::new(from, to));
        true
    }

    /// Plays a move without checking it, as done for engine answers.
    ///
    /// The resulting position is audited and anything odd is logged.
    pub fn apply_trusted(&mut self, mv: Move) {
        self.play(mv);
        for anomaly in audit(&self.board) {
            warn!(%mv, %anomaly, "position anomaly after engine move");
        }
    }

    fn play(&mut self, mv: Move) {
        self.board = self.board.apply(mv);
        self.history.push(mv);
        self.to_move = !self.to_move;
        self.selected = None;
    }

    /// Two-click move entry.
    ///
    /// The first click selects a piece of the player to move. The second
    /// click tries the move and clears the selection whether or not it was
    /// legal.
    pub fn click(&mut self, square: Square) -> ClickOutcome {
        match self.selected.take() {
            None => match self.board.get(square) {
                Some(piece) if piece.color == self.to_move => {
                    self.selected = Some(square);
                    ClickOutcome::Selected(square)
                }
                _ => ClickOutcome::Ignored,
            },
            Some(from) => {
                let mv = Move::new(from, square);
                if self.try_move(from, square) {
                    ClickOutcome::Moved(mv)
                } else {
                    ClickOutcome::Rejected(mv)
                }
            }
        }
    }

    /// History as space-separated coordinate moves, e.g. `e2e4 e7e5`
    pub fn move_list(&self) -> String {
        self.history
            .iter()
            .map(|mv| mv.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Current position with the real side to move
    pub fn fen(&self) -> String {
        to_fen_for(&self.board, self.to_move)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, PieceType};
    use crate::notation::{parse_move, parse_square};
    use pretty_assertions::assert_eq;

    fn sq(name: &str) -> Square {
        parse_square(name).unwrap()
    }

    #[test]
    fn new_game_starts_with_white() {
        let game = Game::new();
        assert_eq!(game.to_move(), Color::White);
        assert!(game.history().is_empty());
        assert_eq!(game.move_list(), "");
        assert_eq!(*game.board(), Board::initial());
    }

    #[test]
    fn legal_moves_alternate_turns() {
        let mut game = Game::new();
        assert!(game.try_move(sq("e2"), sq("e4")));
        assert_eq!(game.to_move(), Color::Black);
        assert!(game.try_move(sq("e7"), sq("e5")));
        assert_eq!(game.to_move(), Color::White);
        assert_eq!(game.move_list(), "e2e4 e7e5");
    }

    #[test]
    fn illegal_move_changes_nothing() {
        let mut game = Game::new();
        assert!(!game.try_move(sq("e7"), sq("e5")));
        assert!(!game.try_move(sq("e2"), sq("e5")));
        assert_eq!(game.to_move(), Color::White);
        assert_eq!(*game.board(), Board::initial());
        assert!(game.history().is_empty());
    }

    #[test]
    fn click_select_then_move() {
        let mut game = Game::new();
        assert_eq!(game.click(sq("g1")), ClickOutcome::Selected(sq("g1")));
        assert_eq!(game.selected(), Some(sq("g1")));
        assert_eq!(
            game.click(sq("f3")),
            ClickOutcome::Moved(parse_move("g1f3").unwrap())
        );
        assert_eq!(game.selected(), None);
        assert_eq!(game.to_move(), Color::Black);
    }

    #[test]
    fn click_on_opponent_or_empty_square_is_ignored() {
        let mut game = Game::new();
        assert_eq!(game.click(sq("e7")), ClickOutcome::Ignored);
        assert_eq!(game.click(sq("e4")), ClickOutcome::Ignored);
        assert_eq!(game.selected(), None);
    }

    #[test]
    fn rejected_second_click_clears_selection() {
        let mut game = Game::new();
        game.click(sq("a1"));
        assert_eq!(
            game.click(sq("a5")),
            ClickOutcome::Rejected(parse_move("a1a5").unwrap())
        );
        assert_eq!(game.selected(), None);
        assert_eq!(game.to_move(), Color::White);
        // Clicking another own piece as the second click is a rejected move too
        game.click(sq("b1"));
        assert!(matches!(game.click(sq("d2")), ClickOutcome::Rejected(_)));
    }

    #[test]
    fn trusted_moves_skip_validation() {
        let mut game = Game::new();
        // A rook jump no rule allows is still applied
        game.apply_trusted(parse_move("a1a5").unwrap());
        assert_eq!(
            game.board().get(sq("a5")),
            Some(Piece::new(PieceType::Rook, Color::White))
        );
        assert_eq!(game.to_move(), Color::Black);
        assert_eq!(game.move_list(), "a1a5");
    }

    #[test]
    fn fen_carries_side_to_move() {
        let mut game = Game::new();
        game.try_move(sq("d2"), sq("d4"));
        assert_eq!(
            game.fen(),
            "rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn reset_restores_start() {
        let mut game = Game::new();
        game.try_move(sq("e2"), sq("e4"));
        game.click(sq("e7"));
        game.reset();
        assert_eq!(game.to_move(), Color::White);
        assert!(game.history().is_empty());
        assert_eq!(game.selected(), None);
    }
}
