//! Market configuration and reserve state.
//!
//! A market is the virtual pool for one trading pair: base and quote reserves
//! on a constant product curve, the peg multiplier that scales the curve's
//! price, and the risk parameters governance sets for it.

use crate::decimal::{Dec, DecError};
use crate::snapshot::ReserveSnapshot;
use crate::types::{Pair, PairError, Timestamp};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk parameters of a market. All ratios are fractions, 0.1 = 10%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Largest trade allowed, as a fraction of the reserve it draws from
    pub trade_limit_ratio: Dec,
    /// Largest mark price move allowed against the previous block's snapshot
    pub fluctuation_limit_ratio: Dec,
    /// Largest mark/index deviation before the market counts as over spread
    pub max_oracle_spread_ratio: Dec,
    pub maintenance_margin_ratio: Dec,
    pub max_leverage: Dec,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            trade_limit_ratio: Dec::from(dec!(0.1)),
            fluctuation_limit_ratio: Dec::from(dec!(0.1)),
            max_oracle_spread_ratio: Dec::from(dec!(0.1)),
            // 0.0625 = 1/16, positions are liquidated below an effective 16x
            maintenance_margin_ratio: Dec::from(dec!(0.0625)),
            max_leverage: Dec::from_int(10),
        }
    }
}

impl MarketConfig {
    pub fn validate(&self) -> Result<(), MarketError> {
        check_unit_ratio("trade limit ratio", self.trade_limit_ratio)?;
        check_unit_ratio("fluctuation limit ratio", self.fluctuation_limit_ratio)?;
        check_unit_ratio("max oracle spread ratio", self.max_oracle_spread_ratio)?;
        check_unit_ratio("maintenance margin ratio", self.maintenance_margin_ratio)?;

        if !self.max_leverage.is_positive() {
            return Err(MarketError::InvalidConfig {
                reason: format!("max leverage must be > 0, not {}", self.max_leverage),
            });
        }

        // a position opened at max leverage must start above maintenance margin
        if Dec::ONE / self.max_leverage < self.maintenance_margin_ratio {
            return Err(MarketError::InvalidConfig {
                reason: format!(
                    "margin ratio at max leverage {} is below maintenance margin ratio {}",
                    self.max_leverage, self.maintenance_margin_ratio
                ),
            });
        }

        Ok(())
    }

    pub fn with_trade_limit_ratio(&self, value: Dec) -> Self {
        Self {
            trade_limit_ratio: value,
            ..self.clone()
        }
    }

    pub fn with_fluctuation_limit_ratio(&self, value: Dec) -> Self {
        Self {
            fluctuation_limit_ratio: value,
            ..self.clone()
        }
    }

    pub fn with_max_oracle_spread_ratio(&self, value: Dec) -> Self {
        Self {
            max_oracle_spread_ratio: value,
            ..self.clone()
        }
    }

    pub fn with_maintenance_margin_ratio(&self, value: Dec) -> Self {
        Self {
            maintenance_margin_ratio: value,
            ..self.clone()
        }
    }

    pub fn with_max_leverage(&self, value: Dec) -> Self {
        Self {
            max_leverage: value,
            ..self.clone()
        }
    }
}

fn check_unit_ratio(name: &str, value: Dec) -> Result<(), MarketError> {
    if value.is_negative() || value > Dec::ONE {
        return Err(MarketError::InvalidConfig {
            reason: format!("{name} must be 0 <= ratio <= 1, not {value}"),
        });
    }
    Ok(())
}

/// Reserve state of one virtual pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub pair: Pair,
    pub base_reserve: Dec,
    pub quote_reserve: Dec,
    /// sqrt(base * quote), the square root of the swap invariant
    pub sqrt_depth: Dec,
    /// Net base position traders hold against the pool
    pub bias: Dec,
    pub peg_multiplier: Dec,
    pub config: MarketConfig,
}

impl Market {
    /// Builds a market with `sqrt_depth` derived from the reserves.
    pub fn new(
        pair: Pair,
        base_reserve: Dec,
        quote_reserve: Dec,
        config: MarketConfig,
        bias: Dec,
        peg_multiplier: Dec,
    ) -> Result<Self, MarketError> {
        let sqrt_depth = quote_reserve.checked_mul(base_reserve)?.sqrt()?;
        Ok(Self {
            pair,
            base_reserve,
            quote_reserve,
            sqrt_depth,
            bias,
            peg_multiplier,
            config,
        })
    }

    pub fn compute_sqrt_depth(&self) -> Result<Dec, MarketError> {
        Ok(self.swap_invariant()?.sqrt()?)
    }

    pub fn validate(&self) -> Result<(), MarketError> {
        self.pair.validate()?;
        self.validate_reserves()?;
        self.validate_liquidity_depth()?;

        if !self.peg_multiplier.is_positive() {
            return Err(MarketError::NonPositivePegMultiplier(self.peg_multiplier));
        }

        self.config.validate()
    }

    pub fn validate_reserves(&self) -> Result<(), MarketError> {
        if !self.quote_reserve.is_positive() || !self.base_reserve.is_positive() {
            return Err(MarketError::NonPositiveReserves {
                pair: self.pair.clone(),
                base: self.base_reserve,
                quote: self.quote_reserve,
            });
        }
        Ok(())
    }

    // stored sqrt depth may drift from the recomputed one by at most one unit
    pub fn validate_liquidity_depth(&self) -> Result<(), MarketError> {
        if !self.sqrt_depth.is_positive() {
            return Err(MarketError::LiquidityDepth {
                pair: self.pair.clone(),
                reason: format!("sqrt depth must be positive, not {}", self.sqrt_depth),
            });
        }

        let computed = self.compute_sqrt_depth()?;
        if (self.sqrt_depth - computed).abs() > Dec::ONE {
            return Err(MarketError::LiquidityDepth {
                pair: self.pair.clone(),
                reason: format!(
                    "stored sqrt depth {} does not match computed {}",
                    self.sqrt_depth, computed
                ),
            });
        }
        Ok(())
    }

    /// `k = base * quote`. Fails with `Math(Overflow)` past 256 bits.
    pub fn swap_invariant(&self) -> Result<Dec, MarketError> {
        Ok(self.base_reserve.checked_mul(self.quote_reserve)?)
    }

    pub fn to_snapshot(&self, timestamp: Timestamp) -> ReserveSnapshot {
        ReserveSnapshot::new(
            self.pair.clone(),
            self.base_reserve,
            self.quote_reserve,
            self.peg_multiplier,
            timestamp,
        )
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ pair: {}, base_reserve: {}, quote_reserve: {}, sqrt_depth: {}, bias: {}, peg_multiplier: {} }}",
            self.pair, self.base_reserve, self.quote_reserve, self.sqrt_depth, self.bias, self.peg_multiplier
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    #[error("invalid asset pair: {0}")]
    InvalidPair(#[from] PairError),

    #[error("non-positive reserves in {pair}: base {base}, quote {quote}")]
    NonPositiveReserves { pair: Pair, base: Dec, quote: Dec },

    #[error("liquidity depth error in {pair}: {reason}")]
    LiquidityDepth { pair: Pair, reason: String },

    #[error("peg multiplier must be > 0, not {0}")]
    NonPositivePegMultiplier(Dec),

    #[error("swap invariant multiplier must be > 0, not {0}")]
    NonPositiveSwapInvariant(Dec),

    #[error("invalid market config: {reason}")]
    InvalidConfig { reason: String },

    #[error("base reserve at zero after swapping {delta} base")]
    BaseReserveAtZero { delta: Dec },

    #[error("quote reserve at zero after swapping {delta} quote")]
    QuoteReserveAtZero { delta: Dec },

    #[error("{side} amount {amount} is over the trading limit")]
    OverTradingLimit { side: &'static str, amount: Dec },

    #[error("math error: {0}")]
    Math(#[from] DecError),
}
