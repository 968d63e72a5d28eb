//! Types for representing engine answers

use std::fmt;

/// A search score as reported in `info ... score` lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Centipawn score, positive when the side to move is better
    Centipawns(i32),
    /// Forced mate in N; negative when the side to move gets mated
    Mate(i32),
}

impl Evaluation {
    /// Score in pawn units. Mates clamp to +/-100.
    pub fn as_pawns(&self) -> f32 {
        match self {
            Evaluation::Centipawns(cp) => *cp as f32 / 100.0,
            Evaluation::Mate(moves) => {
                if *moves > 0 {
                    100.0
                } else {
                    -100.0
                }
            }
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => {
                let score = *cp as f32 / 100.0;
                if score >= 0.0 {
                    write!(f, "+{:.2}", score)
                } else {
                    write!(f, "{:.2}", score)
                }
            }
            Evaluation::Mate(moves) => write!(f, "M{}", moves),
        }
    }
}

/// The engine's chosen move, still in coordinate notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMove {
    /// Move in UCI notation, e.g. `e2e4` or `a7a8q`
    pub best: String,
    /// Expected reply, when the engine reports one
    pub ponder: Option<String>,
}

/// Progress reported by a running search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchInfo {
    pub depth: Option<u8>,
    pub score: Option<Evaluation>,
    pub nodes: Option<u64>,
    pub time_ms: Option<u64>,
    /// Principal variation (best line of play)
    pub pv: Vec<String>,
}

impl SearchInfo {
    /// Parses the fields of an `info` line. Unknown keywords are skipped.
    pub fn parse(line: &str) -> Self {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let mut info = SearchInfo::default();
        let mut i = 0;

        while i < parts.len() {
            match parts[i] {
                "depth" => {
                    info.depth = parts.get(i + 1).and_then(|s| s.parse().ok());
                    i += 2;
                }
                "score" => {
                    let value = parts.get(i + 2).and_then(|s| s.parse::<i32>().ok());
                    info.score = match (parts.get(i + 1).copied(), value) {
                        (Some("cp"), Some(cp)) => Some(Evaluation::Centipawns(cp)),
                        (Some("mate"), Some(m)) => Some(Evaluation::Mate(m)),
                        _ => info.score,
                    };
                    i += 3;
                }
                "time" => {
                    info.time_ms = parts.get(i + 1).and_then(|s| s.parse().ok());
                    i += 2;
                }
                "nodes" => {
                    info.nodes = parts.get(i + 1).and_then(|s| s.parse().ok());
                    i += 2;
                }
                "pv" => {
                    // Everything after "pv" is the principal variation
                    info.pv = parts[i + 1..].iter().map(|s| s.to_string()).collect();
                    break;
                }
                _ => {
                    i += 1;
                }
            }
        }

        info
    }
}
