//! Move legality and position checks

mod audit;
mod validator;

pub use audit::{audit, Anomaly};
pub use validator::{is_legal, legal_destinations};
