//! Engine configuration from environment variables.

use gift_tetris_core::{PieceGenerator, DEFAULT_CLOSING_TEMPLATE};

pub const DEFAULT_MAX_PENDING: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Fixed RNG seed; `None` seeds from the clock.
    pub seed: Option<u32>,
    /// Name to pre-fill on the start screen.
    pub player: Option<String>,
    /// Closing message template; `{name}` is replaced by the player.
    pub closing_template: String,
    /// Bounded command queue size.
    pub max_pending: usize,
    /// Optional JSONL event log.
    pub log_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            player: None,
            closing_template: DEFAULT_CLOSING_TEMPLATE.to_string(),
            max_pending: DEFAULT_MAX_PENDING,
            log_path: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .and_then(|s| if s.is_empty() { None } else { Some(s) })
}

impl EngineConfig {
    /// Create from `GIFT_TETRIS_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`], reading from an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let seed = lookup("GIFT_TETRIS_SEED").and_then(|s| s.trim().parse().ok());

        let player = non_empty(lookup("GIFT_TETRIS_PLAYER"));

        let closing_template = non_empty(lookup("GIFT_TETRIS_CLOSING"))
            .unwrap_or_else(|| DEFAULT_CLOSING_TEMPLATE.to_string());

        let max_pending = lookup("GIFT_TETRIS_MAX_PENDING")
            .and_then(|s| s.trim().parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_MAX_PENDING);

        let log_path = non_empty(lookup("GIFT_TETRIS_LOG_PATH"));

        Self {
            seed,
            player,
            closing_template,
            max_pending,
            log_path,
        }
    }

    /// Piece generator for this configuration.
    pub fn generator(&self) -> PieceGenerator {
        match self.seed {
            Some(seed) => PieceGenerator::uniform(seed),
            None => PieceGenerator::from_clock(),
        }
    }
}
