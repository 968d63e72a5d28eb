//! Scripted stand-in for a UCI engine, for tests that should not need a
//! Stockfish binary.
//!
//! The fake answers the handshake, `eval`, and `go depth N`. Its best move
//! depends only on the position it was given, so a test can tell which
//! query an answer belongs to:
//!
//! | position                  | bestmove |
//! |---------------------------|----------|
//! | `startpos`                | `e2e4`   |
//! | `startpos moves` + 1 move | `e7e5`   |
//! | `startpos moves` + 2 more | `g1f3`   |
//! | anything from a FEN       | `d2d4`   |

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};

use super::session::{EngineConfig, EngineSession};
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    no_moves: bool,
    hang_first_search: bool,
    exit_after_handshake: bool,
    in_check: bool,
    eval_delay: Option<Duration>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every search with `bestmove (none)`
    pub fn without_moves(mut self) -> Self {
        self.no_moves = true;
        self
    }

    /// Stay silent on the first `go` until told to `stop`
    pub fn hang_first_search(mut self) -> Self {
        self.hang_first_search = true;
        self
    }

    /// Answer `eval` the way Stockfish does when the side to move is in check
    pub fn in_check(mut self) -> Self {
        self.in_check = true;
        self
    }

    /// Sleep before answering `eval`; later commands wait behind it
    pub fn slow_eval(mut self, delay: Duration) -> Self {
        self.eval_delay = Some(delay);
        self
    }

    /// Close both pipes right after `readyok`
    pub fn exit_after_handshake(mut self) -> Self {
        self.exit_after_handshake = true;
        self
    }

    /// Starts the fake on an in-memory pipe and connects a session to it
    pub async fn session(self, config: EngineConfig) -> Result<EngineSession> {
        let (client, engine) = tokio::io::duplex(16 * 1024);
        let (engine_read, engine_write) = tokio::io::split(engine);
        tokio::spawn(self.run(engine_read, engine_write));

        let (client_read, client_write) = tokio::io::split(client);
        EngineSession::from_io(client_read, client_write, config).await
    }

    async fn run(self, input: ReadHalf<DuplexStream>, mut output: WriteHalf<DuplexStream>) {
        let mut commands = BufReader::new(input).lines();
        let mut position = String::new();
        let mut hang_next = self.hang_first_search;

        while let Ok(Some(command)) = commands.next_line().await {
            let reply: Vec<String> = match command.as_str() {
                "uci" => vec!["id name Fake".into(), "id author nobody".into(), "uciok".into()],
                "isready" => vec!["readyok".into()],
                "quit" => break,
                "eval" => {
                    if let Some(delay) = self.eval_delay {
                        tokio::time::sleep(delay).await;
                    }
                    if self.in_check {
                        vec!["Final evaluation: none (in check)".into()]
                    } else {
                        vec![
                            "     Term    |    White    |    Black    |    Total".into(),
                            "Total Evaluation: 0.25 (white side)".into(),
                        ]
                    }
                }
                "stop" => vec![format!("bestmove {}", self.answer(&position))],
                cmd if cmd.starts_with("position ") => {
                    position = cmd.to_string();
                    Vec::new()
                }
                cmd if cmd.starts_with("go ") => {
                    if hang_next {
                        hang_next = false;
                        Vec::new()
                    } else {
                        vec![
                            "info depth 1 score cp 12 nodes 20 pv e2e4".into(),
                            "info depth 10 score cp 34 nodes 9000 time 3 pv e2e4 e7e5".into(),
                            format!("bestmove {} ponder e7e5", self.answer(&position)),
                        ]
                    }
                }
                other => vec![format!("Unknown command: '{}'. Type help for more information.", other)],
            };

            for line in reply {
                if output.write_all(format!("{}\n", line).as_bytes()).await.is_err() {
                    return;
                }
            }
            let _ = output.flush().await;

            if self.exit_after_handshake && command == "isready" {
                break;
            }
        }
    }

    fn answer(&self, position: &str) -> &'static str {
        if self.no_moves {
            return "(none)";
        }
        if position.starts_with("position fen") {
            return "d2d4";
        }
        match position.split_whitespace().skip(3).count() {
            0 => "e2e4",
            1 => "e7e5",
            _ => "g1f3",
        }
    }
}
