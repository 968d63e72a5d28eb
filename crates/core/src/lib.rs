//! Chess Board Core Library
//!
//! Board model, simplified move rules, FEN and coordinate notation, a UCI
//! engine session, and the relay server's wire protocol.

pub mod board;
pub mod engine;
pub mod error;
pub mod game;
pub mod notation;
pub mod relay;
pub mod rules;

pub use board::{Board, Color, Move, Piece, PieceType, Square};
pub use engine::{EngineConfig, EngineSession, EvalMode};
pub use error::{Error, Result};
pub use game::{ClickOutcome, Game};
pub use relay::RelayClient;
