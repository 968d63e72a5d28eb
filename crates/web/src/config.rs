//! Relay settings from the environment (and an optional `.env` file)

use std::net::SocketAddr;
use std::time::Duration;

use tracing::warn;

use chess_board_core::EngineConfig;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub addr: SocketAddr,
    pub engine: EngineConfig,
}

impl RelayConfig {
    /// Reads `RELAY_ADDR`, `ENGINE_PATH`, `ENGINE_SEARCH_DEPTH` and
    /// `ENGINE_TIMEOUT_SECS` (0 disables the timeout). Bad values are logged
    /// and replaced by defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = EngineConfig::relay();

        let addr = parse_or("RELAY_ADDR", lookup("RELAY_ADDR"), || SocketAddr::from(([127, 0, 0, 1], 3001)));
        let search_depth = parse_or("ENGINE_SEARCH_DEPTH", lookup("ENGINE_SEARCH_DEPTH"), || {
            defaults.search_depth
        });
        let query_timeout = match parse_or("ENGINE_TIMEOUT_SECS", lookup("ENGINE_TIMEOUT_SECS"), || 30u64) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let mut engine = defaults.with_search_depth(search_depth).with_timeout(query_timeout);
        if let Some(path) = lookup("ENGINE_PATH").filter(|p| !p.trim().is_empty()) {
            engine = engine.with_path(path);
        }

        Self { addr, engine }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>, default: impl FnOnce() -> T) -> T {
    match value {
        Some(raw) => match raw.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(key, value = %raw, "ignoring invalid setting");
                default()
            }
        },
        None => default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_board_core::EvalMode;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> RelayConfig {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        RelayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_relay() {
        let config = config(&[]);
        assert_eq!(config.addr.to_string(), "127.0.0.1:3001");
        assert_eq!(config.engine.path, "stockfish");
        assert_eq!(config.engine.search_depth, 15);
        assert_eq!(config.engine.eval_mode, EvalMode::Static);
        assert_eq!(config.engine.query_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn values_override_defaults() {
        let config = config(&[
            ("RELAY_ADDR", "0.0.0.0:8080"),
            ("ENGINE_PATH", "/usr/games/stockfish"),
            ("ENGINE_SEARCH_DEPTH", "8"),
            ("ENGINE_TIMEOUT_SECS", "0"),
        ]);
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.engine.path, "/usr/games/stockfish");
        assert_eq!(config.engine.search_depth, 8);
        assert_eq!(config.engine.query_timeout, None);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config(&[("RELAY_ADDR", "nowhere"), ("ENGINE_SEARCH_DEPTH", "deep")]);
        assert_eq!(config.addr.to_string(), "127.0.0.1:3001");
        assert_eq!(config.engine.search_depth, 15);
    }
}
