//! Configuration for a single order book.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BookError, Result, constants};

/// Per-book configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookConfig {
    /// Instrument symbol (e.g., "ACME"). Used in logs and `Display`.
    pub symbol: String,
    /// Price granularity. `None` accepts any positive price.
    #[serde(default)]
    pub tick_size: Option<Decimal>,
    /// Levels per side returned by `default_depth()` queries.
    #[serde(default = "default_depth")]
    pub default_depth: usize,
    /// Arena slots preallocated for resting orders.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
    /// Command queue size when the book runs behind an actor.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_depth() -> usize {
    constants::DEFAULT_DEPTH_LEVELS
}

fn default_initial_capacity() -> usize {
    constants::DEFAULT_INITIAL_CAPACITY
}

fn default_channel_capacity() -> usize {
    constants::DEFAULT_CHANNEL_CAPACITY
}

impl BookConfig {
    /// Defaults for `symbol`.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            tick_size: None,
            default_depth: default_depth(),
            initial_capacity: default_initial_capacity(),
            channel_capacity: default_channel_capacity(),
        }
    }

    #[must_use]
    pub fn with_tick_size(mut self, tick_size: Decimal) -> Self {
        self.tick_size = Some(tick_size);
        self
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(BookError::Configuration("symbol must not be empty".into()));
        }
        if let Some(tick) = self.tick_size {
            if tick <= Decimal::ZERO {
                return Err(BookError::Configuration(format!(
                    "tick_size must be > 0, got {tick}"
                )));
            }
        }
        if self.default_depth == 0 {
            return Err(BookError::Configuration("default_depth must be > 0".into()));
        }
        if self.channel_capacity == 0 {
            return Err(BookError::Configuration("channel_capacity must be > 0".into()));
        }
        Ok(())
    }
}

impl Default for BookConfig {
    fn default() -> Self {
        Self::new("DEFAULT")
    }
}
