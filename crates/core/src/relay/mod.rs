//! Relay server protocol: JSON over HTTP in front of one engine

mod client;
mod types;

pub use client::{RelayClient, DEFAULT_RELAY_URL};
pub use types::*;
