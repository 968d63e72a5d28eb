//! UCI engine integration

mod adapter;
pub mod analysis;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod protocol;
mod session;

pub use adapter::{engine_move, evaluate_board};
pub use analysis::{BestMove, Evaluation, SearchInfo};
pub use protocol::{Command, EngineLine, PositionSpec};
pub use session::{EngineConfig, EngineSession, EvalMode, QueryId};
