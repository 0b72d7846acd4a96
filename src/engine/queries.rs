//! Read-only projections for external callers.

use super::core::Engine;
use super::results::{EngineError, PoolPrices};
use crate::decimal::Dec;
use crate::market::Market;
use crate::oracle::OracleSource;
use crate::store::PoolStore;
use crate::types::{Direction, Pair};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveAssets {
    pub base_reserve: Dec,
    pub quote_reserve: Dec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllPools {
    pub markets: Vec<Market>,
    pub prices: Vec<PoolPrices>,
}

impl<S: PoolStore, O: OracleSource> Engine<S, O> {
    pub fn query_reserve_assets(&self, pair: &Pair) -> Result<ReserveAssets, EngineError> {
        let market = self.load_market(pair)?;
        Ok(ReserveAssets {
            base_reserve: market.base_reserve,
            quote_reserve: market.quote_reserve,
        })
    }

    /// Every market with its prices, in pair order.
    pub fn query_all_pools(&self) -> Result<AllPools, EngineError> {
        let markets = self.store.markets();
        let prices = markets
            .iter()
            .map(|market| self.get_pool_prices(&market.pair))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AllPools { markets, prices })
    }

    pub fn query_base_asset_price(&self, pair: &Pair, direction: Direction, base_amount: Dec) -> Result<Dec, EngineError> {
        self.get_base_asset_price(pair, direction, base_amount)
    }
}
