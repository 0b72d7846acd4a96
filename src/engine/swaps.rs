//! Swap execution against a pool's reserves.

use super::core::Engine;
use super::results::{EngineError, SwapOutcome};
use crate::decimal::Dec;
use crate::events::{EventPayload, MarkPriceChangedEvent, SwapEvent};
use crate::limits::check_if_limit_is_violated;
use crate::market::Market;
use crate::oracle::OracleSource;
use crate::store::PoolStore;
use crate::types::{Direction, Pair};

impl<S: PoolStore, O: OracleSource> Engine<S, O> {
    /// Trades `quote_amount` quote assets for base. Long adds the quote to the
    /// pool, Short takes it out. Returns the absolute base amount moved.
    pub fn swap_quote_for_base(
        &mut self,
        pair: &Pair,
        direction: Direction,
        quote_amount: Dec,
        base_limit: Dec,
        skip_fluctuation_check: bool,
    ) -> Result<SwapOutcome, EngineError> {
        let market = self.load_market(pair)?;
        if quote_amount.is_zero() {
            return Ok(SwapOutcome { market, amount: Dec::ZERO });
        }
        self.require_index_price(pair)?;

        let quote_reserve_abs = market.from_quote_asset_to_reserve(quote_amount)?.abs();
        let base_amount_abs = market.get_base_amount_by_quote_amount(direction.signed(quote_reserve_abs))?;

        market.has_enough_reserves_for_trade(quote_reserve_abs, base_amount_abs)?;
        check_if_limit_is_violated(base_limit, base_amount_abs, direction)?;

        let quote_delta = direction.signed(quote_reserve_abs);
        let base_delta = -direction.signed(base_amount_abs);

        let market = self.execute_swap(market, quote_delta, base_delta, skip_fluctuation_check)?;
        Ok(SwapOutcome {
            market,
            amount: base_amount_abs,
        })
    }

    /// Trades `base_amount` base for quote assets. Long adds the base to the
    /// pool, Short takes it out. Returns the absolute quote asset amount moved.
    pub fn swap_base_for_quote(
        &mut self,
        pair: &Pair,
        direction: Direction,
        base_amount: Dec,
        quote_limit: Dec,
        skip_fluctuation_check: bool,
    ) -> Result<SwapOutcome, EngineError> {
        let market = self.load_market(pair)?;
        if base_amount.is_zero() {
            return Ok(SwapOutcome { market, amount: Dec::ZERO });
        }
        self.require_index_price(pair)?;

        let base_amount_abs = base_amount.abs();
        let quote_reserve_abs = market.get_quote_reserve_by_base(direction.signed(base_amount_abs))?;

        market.has_enough_reserves_for_trade(quote_reserve_abs, base_amount_abs)?;
        let quote_asset_abs = market.from_quote_reserve_to_asset(quote_reserve_abs)?;
        check_if_limit_is_violated(quote_limit, quote_asset_abs, direction)?;

        let quote_delta = -direction.signed(quote_reserve_abs);
        let base_delta = direction.signed(base_amount_abs);

        let market = self.execute_swap(market, quote_delta, base_delta, skip_fluctuation_check)?;
        Ok(SwapOutcome {
            market,
            amount: quote_asset_abs,
        })
    }

    // swaps are refused while the pair has no index price
    fn require_index_price(&self, pair: &Pair) -> Result<(), EngineError> {
        if let Err(err) = self.oracle.exchange_rate(pair) {
            tracing::warn!(%pair, %err, "swap rejected, no index price");
            return Err(EngineError::NoValidPrice(pair.clone()));
        }
        Ok(())
    }

    fn execute_swap(
        &mut self,
        mut market: Market,
        quote_delta: Dec,
        base_delta: Dec,
        skip_fluctuation_check: bool,
    ) -> Result<Market, EngineError> {
        market.add_to_base_reserve_and_bias(base_delta);
        market.add_to_quote_reserve(quote_delta);
        market.validate()?;

        if let Err(err) = self.update_pool(market.clone(), skip_fluctuation_check) {
            tracing::warn!(pair = %market.pair, %err, "swap rejected");
            return Err(err);
        }

        let mark_price = market.get_mark_price();
        tracing::debug!(pair = %market.pair, %quote_delta, %base_delta, %mark_price, "swap executed");

        self.emit_event(EventPayload::MarkPriceChanged(MarkPriceChangedEvent {
            pair: market.pair.clone(),
            price: mark_price,
            block_time: self.block.time,
        }));
        self.emit_event(EventPayload::SwapExecuted(SwapEvent {
            pair: market.pair.clone(),
            quote_delta,
            base_delta,
        }));

        Ok(market)
    }
}
