//! Game configuration from environment variables.

use std::path::PathBuf;

use duotris_leaderboard::ClientConfig;

use crate::types::MAX_PLAYERS;

pub const DEFAULT_LEADERBOARD_FILE: &str = "leaderboard.txt";

#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Players in the next match (1 or 2).
    pub players: usize,
    /// Local high-score file.
    pub leaderboard_file: PathBuf,
    /// Networked leaderboard, `None` when disabled.
    pub network: Option<ClientConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: 1,
            leaderboard_file: PathBuf::from(DEFAULT_LEADERBOARD_FILE),
            network: Some(ClientConfig::default()),
        }
    }
}

impl GameConfig {
    /// Create from environment variables.
    ///
    /// - `DUOTRIS_PLAYERS`: `1` or `2` (default 1)
    /// - `DUOTRIS_LEADERBOARD_FILE`: local file (default `leaderboard.txt`)
    /// - `LEADERBOARD_SERVER`: see [`ClientConfig::from_env`]
    /// - `LEADERBOARD_DISABLED`: `1`/`true` turns networking off
    pub fn from_env() -> Self {
        use std::env;

        let players = env::var("DUOTRIS_PLAYERS")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| (1..=MAX_PLAYERS).contains(n))
            .unwrap_or(1);

        let leaderboard_file = env::var("DUOTRIS_LEADERBOARD_FILE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LEADERBOARD_FILE));

        let network = if ClientConfig::is_disabled() {
            None
        } else {
            Some(ClientConfig::from_env())
        };

        Self {
            players,
            leaderboard_file,
            network,
        }
    }

    /// Offline configuration writing to `leaderboard_file`.
    pub fn offline(leaderboard_file: impl Into<PathBuf>) -> Self {
        Self {
            leaderboard_file: leaderboard_file.into(),
            network: None,
            ..Self::default()
        }
    }
}
