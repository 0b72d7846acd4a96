// 8.0.2: result types and errors for engine operations.

use crate::decimal::Dec;
use crate::limits::UserLimitViolation;
use crate::market::{Market, MarketError};
use crate::oracle::OracleError;
use crate::repeg::FundFlow;
use crate::twap::TwapError;
use crate::types::{Pair, Timestamp};
use serde::{Deserialize, Serialize};

/// Result of a swap. `amount` is the absolute amount of the other asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub market: Market,
    pub amount: Dec,
}

/// Quote cost of a governance edit and which way it has to be paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCost {
    pub cost: Dec,
    pub flow: FundFlow,
}

impl EditCost {
    pub fn new(cost: Dec) -> Self {
        Self {
            cost,
            flow: FundFlow::from_cost(cost),
        }
    }
}

/// Prices of one pool at the current block. TWAP and index price are `None`
/// when they could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPrices {
    pub pair: Pair,
    pub mark_price: Dec,
    pub twap_mark: Option<Dec>,
    pub index_price: Option<Dec>,
    pub swap_invariant: Dec,
    pub block_height: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("pair {0} is not supported")]
    PairNotSupported(Pair),

    #[error("pool {0} already exists")]
    PoolAlreadyExists(Pair),

    #[error("initial reserves must be equal: quote {quote}, base {base}")]
    UnequalInitialReserves { quote: Dec, base: Dec },

    #[error("no valid twap for {pair} at {now}")]
    NoValidTwap { pair: Pair, now: Timestamp },

    #[error("no snapshot for {0}")]
    NoSnapshot(Pair),

    #[error("mark price {mark_price} of {pair} is over the fluctuation limit around {snapshot_price}")]
    OverFluctuationLimit { pair: Pair, mark_price: Dec, snapshot_price: Dec },

    #[error("no valid index price for {0}")]
    NoValidPrice(Pair),

    #[error("asset fails user limit: {0}")]
    AssetFailsUserLimit(#[from] UserLimitViolation),

    #[error("market error: {0}")]
    Market(#[from] MarketError),

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
}

impl EngineError {
    pub(super) fn from_twap(pair: &Pair, err: TwapError) -> Self {
        match err {
            TwapError::NoValidTwap { now } => EngineError::NoValidTwap { pair: pair.clone(), now },
            TwapError::Market(e) => EngineError::Market(e),
        }
    }
}
