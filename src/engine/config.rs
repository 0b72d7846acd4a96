//! Engine configuration options.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
    /// Lookback of the mark price TWAP reported by `get_pool_prices`.
    pub pool_prices_twap_lookback_ms: i64,
    /// Log every emitted event at debug level.
    pub verbose: bool,
}

impl EngineConfig {
    pub fn pool_prices_twap_lookback(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.pool_prices_twap_lookback_ms).unwrap_or(0))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events: 100_000,
            pool_prices_twap_lookback_ms: 15 * 60 * 1000,
            verbose: false,
        }
    }
}
