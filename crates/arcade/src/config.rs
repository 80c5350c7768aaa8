//! Server configuration.
//!
//! [`ServerConfig`] is what the binary reads from its `--config` JSON file.
//! Every field has a default, so `{}` is a valid config.

use std::time::Duration;

use arcade_games::GamesConfig;
use arcade_protocol::GameKind;
use serde::{Deserialize, Serialize};

/// Address the server binds to when nothing else is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub bind: String,
    /// Delay between two players being paired and their match starting.
    pub pairing_delay_ms: u64,
    /// How long a new connection has to send its `?game:` declaration.
    pub declaration_timeout_ms: u64,
    /// Games that can be declared. Declarations for any other kind are
    /// refused.
    pub enabled_games: Vec<GameKind>,
    pub games: GamesConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            pairing_delay_ms: 1_000,
            declaration_timeout_ms: 30_000,
            enabled_games: GameKind::ALL.to_vec(),
            games: GamesConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn pairing_delay(&self) -> Duration {
        Duration::from_millis(self.pairing_delay_ms)
    }

    pub fn declaration_timeout(&self) -> Duration {
        Duration::from_millis(self.declaration_timeout_ms)
    }

    pub fn is_enabled(&self, kind: GameKind) -> bool {
        self.enabled_games.contains(&kind)
    }
}
