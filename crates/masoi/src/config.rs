//! Server configuration.

use std::time::Duration;

use masoi_room::GameConfig;

/// Address used when neither `MASOI_BIND` nor `PORT` is set.
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Network-facing settings plus the game rules every room shares.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listener address, e.g. `"0.0.0.0:3000"`.
    pub bind_addr: String,

    /// How long a new connection has to send its handshake.
    pub handshake_timeout: Duration,

    /// A connection that sends nothing (not even a heartbeat) for this long
    /// is closed.
    pub idle_timeout: Duration,

    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            handshake_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults, with the bind address taken from the environment:
    /// `MASOI_BIND` wins, otherwise `PORT` picks the port on all interfaces.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("MASOI_BIND")
            .filter(|addr| !addr.trim().is_empty())
            .or_else(|| {
                lookup("PORT")
                    .and_then(|port| port.trim().parse::<u16>().ok())
                    .map(|port| format!("0.0.0.0:{port}"))
            })
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        Self {
            bind_addr,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.bind_addr, DEFAULT_BIND);
        assert_eq!(config.handshake_timeout, Duration::from_secs(5));
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_port_picks_the_port() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "8081")]));
        assert_eq!(config.bind_addr, "0.0.0.0:8081");
    }

    #[test]
    fn test_explicit_bind_wins_over_port() {
        let config =
            ServerConfig::from_lookup(lookup(&[("PORT", "8081"), ("MASOI_BIND", "127.0.0.1:9000")]));
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_garbage_port_falls_back_to_default() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "http")]));
        assert_eq!(config.bind_addr, DEFAULT_BIND);
    }
}
