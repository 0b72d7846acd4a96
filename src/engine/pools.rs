//! Pool lifecycle: creation, governance edits and lookups.

use super::core::Engine;
use super::results::{EditCost, EngineError};
use crate::decimal::Dec;
use crate::events::{
    ConfigEditedEvent, EventPayload, PegMultiplierEditedEvent, PoolCreatedEvent, SwapInvariantEditedEvent,
};
use crate::market::{Market, MarketConfig, MarketError};
use crate::oracle::OracleSource;
use crate::repeg::{calc_repeg_cost, calc_swap_invariant_cost, scale_swap_invariant};
use crate::snapshot::assert_valid_snapshot;
use crate::store::PoolStore;
use crate::types::Pair;

impl<S: PoolStore, O: OracleSource> Engine<S, O> {
    /// Creates the pool for `pair` and records its first snapshot at the current block.
    pub fn create_pool(
        &mut self,
        pair: Pair,
        quote_reserve: Dec,
        base_reserve: Dec,
        config: MarketConfig,
        peg_multiplier: Dec,
    ) -> Result<(), EngineError> {
        if quote_reserve != base_reserve {
            return Err(EngineError::UnequalInitialReserves {
                quote: quote_reserve,
                base: base_reserve,
            });
        }

        let market = Market::new(pair.clone(), base_reserve, quote_reserve, config, Dec::ZERO, peg_multiplier)?;
        market.validate()?;

        if self.store.has_market(&pair) {
            return Err(EngineError::PoolAlreadyExists(pair));
        }

        let snapshot = market.to_snapshot(self.block.time);
        assert_valid_snapshot(&snapshot);

        self.store.set_market(market.clone());
        self.store.set_snapshot(snapshot);

        tracing::info!(%pair, base = %base_reserve, quote = %quote_reserve, peg = %peg_multiplier, "pool created");
        self.emit_event(EventPayload::PoolCreated(PoolCreatedEvent {
            pair,
            base_reserve: market.base_reserve,
            quote_reserve: market.quote_reserve,
            peg_multiplier: market.peg_multiplier,
        }));
        Ok(())
    }

    /// Moves the peg multiplier. Returns the quote cost of the repeg.
    pub fn edit_pool_peg_multiplier(&mut self, pair: &Pair, new_peg: Dec) -> Result<EditCost, EngineError> {
        if !new_peg.is_positive() {
            return Err(MarketError::NonPositivePegMultiplier(new_peg).into());
        }

        let market = self.load_market(pair)?;
        let cost = calc_repeg_cost(&market, new_peg)?;

        let old_peg = market.peg_multiplier;
        let updated = Market {
            peg_multiplier: new_peg,
            ..market
        };
        updated.validate()?;
        self.update_pool(updated, true)?;

        tracing::info!(%pair, %old_peg, %new_peg, %cost, "peg multiplier edited");
        self.emit_event(EventPayload::PegMultiplierEdited(PegMultiplierEditedEvent {
            pair: pair.clone(),
            old_peg,
            new_peg,
            cost,
        }));
        Ok(EditCost::new(cost))
    }

    /// Replaces the market config. Reserves, depth, bias and peg stay as they are.
    pub fn edit_pool_config(&mut self, pair: &Pair, config: MarketConfig) -> Result<(), EngineError> {
        let market = self.load_market(pair)?;
        let updated = Market {
            config: config.clone(),
            ..market
        };
        updated.validate()?;
        self.update_pool(updated, true)?;

        tracing::info!(%pair, ?config, "pool config edited");
        self.emit_event(EventPayload::ConfigEdited(ConfigEditedEvent {
            pair: pair.clone(),
            config,
        }));
        Ok(())
    }

    /// Multiplies the swap invariant `k` by `multiplier` without moving the price.
    /// Returns the quote cost of the depth change.
    pub fn edit_swap_invariant(&mut self, pair: &Pair, multiplier: Dec) -> Result<EditCost, EngineError> {
        if !multiplier.is_positive() {
            return Err(MarketError::NonPositiveSwapInvariant(multiplier).into());
        }

        let market = self.load_market(pair)?;
        let cost = calc_swap_invariant_cost(&market, multiplier)?;

        let mut updated = market;
        scale_swap_invariant(&mut updated, multiplier)?;
        updated.validate()?;
        let new_sqrt_depth = updated.sqrt_depth;
        self.update_pool(updated, true)?;

        tracing::info!(%pair, %multiplier, %new_sqrt_depth, %cost, "swap invariant edited");
        self.emit_event(EventPayload::SwapInvariantEdited(SwapInvariantEditedEvent {
            pair: pair.clone(),
            multiplier,
            new_sqrt_depth,
            cost,
        }));
        Ok(EditCost::new(cost))
    }

    pub fn exists_pool(&self, pair: &Pair) -> bool {
        self.store.has_market(pair)
    }

    pub fn get_pool(&self, pair: &Pair) -> Result<Market, EngineError> {
        self.load_market(pair)
    }

    pub fn get_all_pools(&self) -> Vec<Market> {
        self.store.markets()
    }

    pub fn get_maintenance_margin_ratio(&self, pair: &Pair) -> Result<Dec, EngineError> {
        Ok(self.load_market(pair)?.config.maintenance_margin_ratio)
    }

    pub fn get_max_leverage(&self, pair: &Pair) -> Result<Dec, EngineError> {
        Ok(self.load_market(pair)?.config.max_leverage)
    }

    /// Persists an already validated market and overwrites its snapshot for the
    /// current block. The fluctuation check runs first unless skipped.
    pub(super) fn update_pool(&mut self, market: Market, skip_fluctuation_check: bool) -> Result<(), EngineError> {
        if !skip_fluctuation_check {
            self.check_fluctuation_limit_ratio(&market)?;
        }

        let snapshot = market.to_snapshot(self.block.time);
        assert_valid_snapshot(&snapshot);

        self.store.set_market(market);
        self.store.set_snapshot(snapshot);
        Ok(())
    }
}
