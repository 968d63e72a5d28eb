//! Play on a terminal board, optionally against an engine
//!
//! Human moves are typed as `e2e4` or `e2 e4`. With `--engine` or `--relay`
//! the engine answers as black; `--self-play N` lets it play N plies alone.

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use tracing_subscriber::EnvFilter;

use chess_board_core::engine::{engine_move, evaluate_board, EngineConfig, EngineSession, EvalMode};
use chess_board_core::notation::{parse_move, parse_square};
use chess_board_core::relay::RelayClient;
use chess_board_core::rules::legal_destinations;
use chess_board_core::{Color, Error, Game, Move, Result};

#[derive(Parser, Debug)]
#[command(name = "play", about = "Terminal chess board with an optional engine opponent")]
struct Args {
    /// Path to a UCI engine binary to play black
    #[arg(long, conflicts_with = "relay")]
    engine: Option<String>,

    /// Base URL of a relay server to play black, e.g. http://localhost:3001
    #[arg(long)]
    relay: Option<String>,

    /// Search depth for a local engine
    #[arg(long, default_value_t = 10)]
    depth: u8,

    /// Let the engine play both sides for this many plies, then exit
    #[arg(long, value_name = "PLIES")]
    self_play: Option<usize>,

    /// Draw pieces as Unicode glyphs instead of FEN letters
    #[arg(long)]
    glyphs: bool,
}

enum Opponent {
    Local(EngineSession),
    Relay(RelayClient),
}

impl Opponent {
    async fn choose(&self, game: &Game) -> Result<Move> {
        match self {
            Opponent::Local(session) => engine_move(session, game.board(), game.to_move()).await,
            Opponent::Relay(client) => {
                let answer = client.best_move(&game.move_list()).await?;
                parse_move(&answer).map_err(|_| Error::NoValidMove(answer))
            }
        }
    }

    async fn evaluate(&self, game: &Game) -> Result<f32> {
        match self {
            Opponent::Local(session) => evaluate_board(session, game.board(), game.to_move()).await,
            Opponent::Relay(client) => client.evaluate(&game.move_list()).await,
        }
    }

    async fn close(self) {
        if let Opponent::Local(session) = self {
            session.shutdown().await;
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let opponent = match connect(&args).await {
        Ok(opponent) => opponent,
        Err(e) => {
            eprintln!("Failed to start opponent: {}", e);
            std::process::exit(1);
        }
    };

    let mut game = Game::new();

    match (args.self_play, opponent) {
        (Some(plies), Some(opponent)) => {
            self_play(&mut game, &opponent, plies, args.glyphs).await;
            opponent.close().await;
        }
        (Some(_), None) => {
            eprintln!("--self-play needs --engine or --relay");
            std::process::exit(2);
        }
        (None, opponent) => {
            interactive(&mut game, opponent.as_ref(), args.glyphs).await;
            if let Some(opponent) = opponent {
                opponent.close().await;
            }
        }
    }
}

async fn connect(args: &Args) -> Result<Option<Opponent>> {
    if let Some(path) = &args.engine {
        let config = EngineConfig {
            path: path.clone(),
            search_depth: args.depth,
            eval_mode: EvalMode::Search { depth: args.depth },
            ..EngineConfig::client()
        };
        return Ok(Some(Opponent::Local(EngineSession::spawn(config).await?)));
    }
    if let Some(url) = &args.relay {
        let client = RelayClient::new(url.clone())?;
        println!("{}", client.status().await?);
        return Ok(Some(Opponent::Relay(client)));
    }
    Ok(None)
}

fn show(game: &Game, glyphs: bool) {
    if glyphs {
        println!("{}", game.board().glyphs());
    } else {
        println!("{}", game.board());
    }
}

/// With an opponent the human plays white only
fn human_to_move(game: &Game, has_opponent: bool) -> bool {
    !has_opponent || game.to_move() == Color::White
}

async fn self_play(game: &mut Game, opponent: &Opponent, plies: usize, glyphs: bool) {
    show(game, glyphs);
    for _ in 0..plies {
        if !engine_turn(game, opponent, glyphs).await {
            break;
        }
    }
    println!("Moves: {}", game.move_list());
}

/// Plays one engine move and prints the result; false when the game
/// cannot continue
async fn engine_turn(game: &mut Game, opponent: &Opponent, glyphs: bool) -> bool {
    let side = game.to_move();
    match opponent.choose(game).await {
        Ok(mv) => {
            game.apply_trusted(mv);
            println!("{} plays {}", side, mv);
            show(game, glyphs);
            match opponent.evaluate(game).await {
                Ok(score) => println!("Evaluation: {:+.2}", score),
                Err(e) => error!(error = %e, "evaluation failed"),
            }
            true
        }
        Err(Error::NoValidMove(answer)) => {
            println!("No valid move found ({})", answer);
            false
        }
        Err(e) => {
            error!(error = %e, "engine move failed");
            false
        }
    }
}

async fn interactive(game: &mut Game, opponent: Option<&Opponent>, glyphs: bool) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_help();
    show(game, glyphs);

    loop {
        if let Some(opponent) = opponent {
            if !human_to_move(game, true) && !engine_turn(game, opponent, glyphs).await {
                println!("Press Enter to ask the engine again, or type `new` or `quit`.");
            }
        }

        println!("{} to move> ", game.to_move());
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "failed to read input");
                break;
            }
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            ["help"] => print_help(),
            ["new"] => {
                game.reset();
                show(game, glyphs);
            }
            ["fen"] => println!("{}", game.fen()),
            ["history"] => println!("{}", game.move_list()),
            ["moves", square] => match parse_square(square) {
                Ok(from) => {
                    let targets: Vec<String> = legal_destinations(game.board(), from, game.to_move())
                        .iter()
                        .map(|sq| sq.to_string())
                        .collect();
                    println!("{}: {}", square, targets.join(" "));
                }
                Err(e) => println!("{}", e),
            },
            [_] | [_, _] if !human_to_move(game, opponent.is_some()) => {
                println!("It is the engine's turn.");
            }
            [from, to] => human_move(game, &format!("{}{}", from, to), glyphs),
            [mv] => human_move(game, mv, glyphs),
            _ => println!("Unknown command, type `help`"),
        }
    }
}

fn human_move(game: &mut Game, text: &str, glyphs: bool) {
    match parse_move(text) {
        Ok(mv) if game.try_move(mv.from, mv.to) => show(game, glyphs),
        Ok(mv) => println!("Illegal move {}", mv),
        Err(e) => println!("{}", e),
    }
}

fn print_help() {
    println!("Commands: e2e4 | e2 e4 | moves e2 | fen | history | new | help | quit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_waits_for_the_engine_on_black() {
        let mut game = Game::new();
        assert!(human_to_move(&game, true));

        let mv = parse_move("e2e4").unwrap();
        assert!(game.try_move(mv.from, mv.to));
        assert!(!human_to_move(&game, true));
        // Without an opponent both sides are typed in
        assert!(human_to_move(&game, false));
    }

    #[test]
    fn glyphs_flag_parses() {
        let args = Args::parse_from(["play", "--engine", "stockfish", "--glyphs", "--depth", "6"]);
        assert!(args.glyphs);
        assert_eq!(args.depth, 6);
        assert!(Args::try_parse_from(["play", "--engine", "a", "--relay", "b"]).is_err());
    }
}
