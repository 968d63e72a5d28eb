//! Line-oriented engine protocol: outgoing commands and parsed replies

use std::fmt;

use super::analysis::{BestMove, SearchInfo};

/// Where the engine should set up its board before a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionSpec {
    /// An explicit FEN string (the board UI path)
    Fen(String),
    /// Coordinate moves played from the standard start (the relay path)
    StartMoves(Vec<String>),
}

impl PositionSpec {
    pub fn start() -> Self {
        PositionSpec::StartMoves(Vec::new())
    }
}

/// One command line sent to the engine
#[derive(Debug, Clone, Copy)]
pub enum Command<'a> {
    Uci,
    IsReady,
    Position(&'a PositionSpec),
    GoDepth(u8),
    Eval,
    Stop,
    Quit,
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Uci => write!(f, "uci"),
            Command::IsReady => write!(f, "isready"),
            Command::Position(PositionSpec::Fen(fen)) => write!(f, "position fen {}", fen),
            Command::Position(PositionSpec::StartMoves(moves)) if moves.is_empty() => {
                write!(f, "position startpos")
            }
            Command::Position(PositionSpec::StartMoves(moves)) => {
                write!(f, "position startpos moves {}", moves.join(" "))
            }
            Command::GoDepth(depth) => write!(f, "go depth {}", depth),
            Command::Eval => write!(f, "eval"),
            Command::Stop => write!(f, "stop"),
            Command::Quit => write!(f, "quit"),
        }
    }
}

/// A classified line of engine output.
///
/// Anything the session does not act on lands in `Unrecognized`; the session
/// logs it and keeps waiting for the line it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineLine {
    UciOk,
    ReadyOk,
    /// `bestmove <move> [ponder <move>]`; `best` is `None` for `(none)`
    BestMove {
        best: Option<String>,
        ponder: Option<String>,
    },
    /// Static evaluation in pawns, from the `eval` command's summary line
    Evaluation(f32),
    Info(SearchInfo),
    Unrecognized(String),
}

impl EngineLine {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut words = line.split_whitespace();

        match words.next() {
            Some("uciok") => return EngineLine::UciOk,
            Some("readyok") => return EngineLine::ReadyOk,
            Some("bestmove") => {
                let best = words.next().filter(|m| *m != "(none)").map(str::to_string);
                let ponder = match (words.next(), words.next()) {
                    (Some("ponder"), Some(m)) => Some(m.to_string()),
                    _ => None,
                };
                return EngineLine::BestMove { best, ponder };
            }
            Some("info") => return EngineLine::Info(SearchInfo::parse(line)),
            _ => {}
        }

        if let Some(score) = parse_static_eval(line) {
            return EngineLine::Evaluation(score);
        }

        EngineLine::Unrecognized(line.to_string())
    }

    /// Converts a `bestmove` line into the engine's answer, if it named a move
    pub fn into_best_move(self) -> Option<BestMove> {
        match self {
            EngineLine::BestMove { best: Some(best), ponder } => Some(BestMove { best, ponder }),
            _ => None,
        }
    }
}

/// Reads `Total Evaluation: 0.25 (white side)` and the newer
/// `Final evaluation       +0.25 (white side)` forms
fn parse_static_eval(line: &str) -> Option<f32> {
    let rest = line
        .strip_prefix("Total Evaluation:")
        .or_else(|| line.strip_prefix("Final evaluation"))?;
    let rest = rest.trim_start_matches(':').trim();
    let number = rest.split_whitespace().next()?;
    number.trim_start_matches('+').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analysis::Evaluation;

    #[test]
    fn position_commands() {
        let fen = PositionSpec::Fen("8/8/8/8/8/8/8/K6k w KQkq - 0 1".into());
        assert_eq!(
            Command::Position(&fen).to_string(),
            "position fen 8/8/8/8/8/8/8/K6k w KQkq - 0 1"
        );
        assert_eq!(Command::Position(&PositionSpec::start()).to_string(), "position startpos");

        let moves = PositionSpec::StartMoves(vec!["e2e4".into(), "e7e5".into()]);
        assert_eq!(
            Command::Position(&moves).to_string(),
            "position startpos moves e2e4 e7e5"
        );
        assert_eq!(Command::GoDepth(15).to_string(), "go depth 15");
    }

    #[test]
    fn handshake_lines() {
        assert_eq!(EngineLine::parse("readyok"), EngineLine::ReadyOk);
        assert_eq!(EngineLine::parse("uciok\r"), EngineLine::UciOk);
    }

    #[test]
    fn bestmove_with_and_without_ponder() {
        assert_eq!(
            EngineLine::parse("bestmove e2e4 ponder e7e5"),
            EngineLine::BestMove {
                best: Some("e2e4".into()),
                ponder: Some("e7e5".into())
            }
        );
        assert_eq!(
            EngineLine::parse("bestmove a7a8q").into_best_move(),
            Some(BestMove {
                best: "a7a8q".into(),
                ponder: None
            })
        );
    }

    #[test]
    fn bestmove_none_has_no_move() {
        let line = EngineLine::parse("bestmove (none)");
        assert_eq!(line, EngineLine::BestMove { best: None, ponder: None });
        assert_eq!(line.into_best_move(), None);
    }

    #[test]
    fn static_eval_lines() {
        assert_eq!(
            EngineLine::parse("Total Evaluation: 0.25 (white side)"),
            EngineLine::Evaluation(0.25)
        );
        assert_eq!(
            EngineLine::parse("Final evaluation       -1.07 (white side) [with scaled NNUE, ...]"),
            EngineLine::Evaluation(-1.07)
        );
        assert_eq!(
            EngineLine::parse("Final evaluation       +0.40 (white side)"),
            EngineLine::Evaluation(0.40)
        );
    }

    #[test]
    fn eval_without_number_is_unrecognized() {
        assert_eq!(
            EngineLine::parse("Final evaluation: none (in check)"),
            EngineLine::Unrecognized("Final evaluation: none (in check)".into())
        );
    }

    #[test]
    fn info_lines_carry_scores() {
        match EngineLine::parse("info depth 10 score cp 34 nodes 1200 pv e2e4") {
            EngineLine::Info(info) => assert_eq!(info.score, Some(Evaluation::Centipawns(34))),
            other => panic!("expected info, got {:?}", other),
        }
    }

    #[test]
    fn other_output_is_unrecognized() {
        assert_eq!(
            EngineLine::parse("Stockfish 16 by the Stockfish developers"),
            EngineLine::Unrecognized("Stockfish 16 by the Stockfish developers".into())
        );
        assert_eq!(
            EngineLine::parse("id name Stockfish 16"),
            EngineLine::Unrecognized("id name Stockfish 16".into())
        );
    }
}
