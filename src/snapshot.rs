//! Reserve snapshots and the prices derived from them.
//!
//! A snapshot is the reserve state of a market at one block time. Snapshots are
//! written at least once per block and never change afterwards, so they are the
//! price history the TWAP reads.

use crate::decimal::Dec;
use crate::market::{Market, MarketConfig, MarketError};
use crate::types::{Direction, Pair, Timestamp, TwapCalcOption};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSnapshot {
    pub pair: Pair,
    pub base_reserve: Dec,
    pub quote_reserve: Dec,
    pub peg_multiplier: Dec,
    pub timestamp_ms: i64,
}

impl ReserveSnapshot {
    pub fn new(pair: Pair, base_reserve: Dec, quote_reserve: Dec, peg_multiplier: Dec, timestamp: Timestamp) -> Self {
        Self {
            pair,
            base_reserve,
            quote_reserve,
            peg_multiplier,
            timestamp_ms: timestamp.as_millis(),
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        Timestamp::from_millis(self.timestamp_ms)
    }

    pub fn validate(&self) -> Result<(), MarketError> {
        self.pair.validate()?;
        if !self.base_reserve.is_positive() || !self.quote_reserve.is_positive() {
            return Err(MarketError::NonPositiveReserves {
                pair: self.pair.clone(),
                base: self.base_reserve,
                quote: self.quote_reserve,
            });
        }
        if !self.peg_multiplier.is_positive() {
            return Err(MarketError::NonPositivePegMultiplier(self.peg_multiplier));
        }
        Ok(())
    }

    pub fn mark_price(&self) -> Dec {
        if self.base_reserve.is_zero() {
            return Dec::ZERO;
        }
        self.quote_reserve / self.base_reserve * self.peg_multiplier
    }

    pub fn upper_fluctuation_limit(&self, ratio: Dec) -> Dec {
        self.mark_price() * (Dec::ONE + ratio)
    }

    pub fn lower_fluctuation_limit(&self, ratio: Dec) -> Dec {
        self.mark_price() * (Dec::ONE - ratio)
    }

    /// Throwaway market carrying this snapshot's reserves, so historical
    /// prices go through the same swap math as live trades.
    pub fn to_market(&self) -> Market {
        Market {
            pair: self.pair.clone(),
            base_reserve: self.base_reserve,
            quote_reserve: self.quote_reserve,
            sqrt_depth: Dec::ZERO,
            bias: Dec::ZERO,
            peg_multiplier: self.peg_multiplier,
            config: MarketConfig::default(),
        }
    }
}

impl fmt::Display for ReserveSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ pair: {}, base_reserve: {}, quote_reserve: {}, peg_multiplier: {}, timestamp_ms: {} }}",
            self.pair, self.base_reserve, self.quote_reserve, self.peg_multiplier, self.timestamp_ms
        )
    }
}

/// Price of `snapshot` under `option`. `amount` and `direction` only matter for
/// the swap options, where they describe the trade being priced.
pub fn price_with_snapshot(
    snapshot: &ReserveSnapshot,
    option: TwapCalcOption,
    direction: Direction,
    amount: Dec,
) -> Result<Dec, MarketError> {
    match option {
        TwapCalcOption::Spot => Ok(snapshot.mark_price()),
        TwapCalcOption::QuoteAssetSwap => {
            let market = snapshot.to_market();
            let quote_reserve = market.from_quote_asset_to_reserve(direction.signed(amount))?;
            market.get_base_amount_by_quote_amount(quote_reserve)
        }
        TwapCalcOption::BaseAssetSwap => {
            let market = snapshot.to_market();
            let quote_reserve = market.get_quote_reserve_by_base(direction.signed(amount))?;
            market.from_quote_reserve_to_asset(quote_reserve)
        }
    }
}

/// Broken state invariant. Raised as a panic payload, never returned as an
/// ordinary error, so callers cannot swallow it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invariant violation: {0}")]
pub struct InvariantViolation(pub String);

/// Aborts the current block when the snapshot is not a valid record.
pub fn assert_valid_snapshot(snapshot: &ReserveSnapshot) {
    if let Err(err) = snapshot.validate() {
        tracing::error!(%snapshot, %err, "refusing to persist invalid reserve snapshot");
        std::panic::panic_any(InvariantViolation(format!("snapshot {snapshot}: {err}")));
    }
}
