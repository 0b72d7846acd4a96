// 10.0 config.rs: all settings in one place. engine limits, the market config new
// pools start from, and logging. presets per environment, loadable from json.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::decimal::Dec;
use crate::engine::EngineConfig;
use crate::market::MarketConfig;
use rust_decimal_macros::dec;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    // bare level ("info") or a full filter directive
    pub level: String,
    // json lines instead of compact text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    // applied to pools created without an explicit config
    pub default_market: MarketConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    // looser limits and chatty logs for testnet
    pub fn testnet() -> Self {
        let mut config = Self::default();
        config.default_market = config
            .default_market
            .with_trade_limit_ratio(Dec::from(dec!(0.2)))
            .with_fluctuation_limit_ratio(Dec::from(dec!(0.2)))
            .with_max_oracle_spread_ratio(Dec::from(dec!(0.2)));
        config.logging.level = "debug".to_string();
        config
    }

    // tight limits, json logs for mainnet
    pub fn mainnet() -> Self {
        let mut config = Self::default();
        config.default_market = config
            .default_market
            .with_trade_limit_ratio(Dec::from(dec!(0.05)))
            .with_fluctuation_limit_ratio(Dec::from(dec!(0.05)))
            .with_max_oracle_spread_ratio(Dec::from(dec!(0.05)));
        config.engine.max_events = 10_000;
        config.logging.json = true;
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_market
            .validate()
            .map_err(|e| ConfigError::InvalidMarket { reason: e.to_string() })?;

        if self.engine.max_events == 0 {
            return Err(ConfigError::InvalidEngine {
                reason: "max_events must be at least 1".to_string(),
            });
        }

        if self.engine.pool_prices_twap_lookback_ms <= 0 {
            return Err(ConfigError::InvalidEngine {
                reason: format!(
                    "twap lookback must be positive, not {}ms",
                    self.engine.pool_prices_twap_lookback_ms
                ),
            });
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::InvalidLogging {
                reason: "log level is empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid default market config: {reason}")]
    InvalidMarket { reason: String },

    #[error("invalid engine config: {reason}")]
    InvalidEngine { reason: String },

    #[error("invalid logging config: {reason}")]
    InvalidLogging { reason: String },

    #[error("could not read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("malformed config json: {0}")]
    Parse(#[from] serde_json::Error),
}

// Environment presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Testnet,
    Mainnet,
}

impl Environment {
    pub fn config(&self) -> AppConfig {
        match self {
            Environment::Development => AppConfig::default(),
            Environment::Testnet => AppConfig::testnet(),
            Environment::Mainnet => AppConfig::mainnet(),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" => Ok(Environment::Testnet),
            "mainnet" => Ok(Environment::Mainnet),
            other => Err(ConfigError::InvalidEngine {
                reason: format!("unknown environment {other:?}"),
            }),
        }
    }
}
