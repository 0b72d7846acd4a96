//! Price queries: instantaneous, time weighted and against the oracle.

use super::core::Engine;
use super::results::{EngineError, PoolPrices};
use crate::decimal::Dec;
use crate::oracle::OracleSource;
use crate::store::{PoolStore, SnapshotRange};
use crate::twap::{calc_twap, collect_window, TwapQuery};
use crate::types::{Direction, Pair, TwapCalcOption};
use std::time::Duration;

impl<S: PoolStore, O: OracleSource> Engine<S, O> {
    /// Quote needed to buy one base at the current reserves.
    pub fn get_mark_price(&self, pair: &Pair) -> Result<Dec, EngineError> {
        Ok(self.load_market(pair)?.get_mark_price())
    }

    /// Quote assets that move when `base_amount` base is added (Long) or removed (Short).
    pub fn get_base_asset_price(&self, pair: &Pair, direction: Direction, base_amount: Dec) -> Result<Dec, EngineError> {
        let market = self.load_market(pair)?;
        let quote_reserve = market.get_quote_reserve_by_base(direction.signed(base_amount))?;
        Ok(market.from_quote_reserve_to_asset(quote_reserve)?)
    }

    /// TWAP over `[now - lookback, now]` priced under `option`.
    pub fn calc_twap(
        &self,
        pair: &Pair,
        option: TwapCalcOption,
        direction: Direction,
        amount: Dec,
        lookback: Duration,
    ) -> Result<Dec, EngineError> {
        let now = self.block.time;
        let lower_bound_ms = now.saturating_sub(lookback).as_millis();

        let range = SnapshotRange::all().end_inclusive(now).descending();
        let window = collect_window(self.store.snapshots(pair, range), lower_bound_ms);

        let query = TwapQuery {
            option,
            direction,
            amount,
            now,
            lower_bound_ms,
        };
        calc_twap(&window, &query).map_err(|e| EngineError::from_twap(pair, e))
    }

    pub fn get_mark_price_twap(&self, pair: &Pair, lookback: Duration) -> Result<Dec, EngineError> {
        self.calc_twap(pair, TwapCalcOption::Spot, Direction::Unspecified, Dec::ZERO, lookback)
    }

    /// Time weighted quote asset amount for moving `base_amount` base.
    pub fn get_base_asset_twap(
        &self,
        pair: &Pair,
        direction: Direction,
        base_amount: Dec,
        lookback: Duration,
    ) -> Result<Dec, EngineError> {
        self.calc_twap(pair, TwapCalcOption::BaseAssetSwap, direction, base_amount, lookback)
    }

    /// Time weighted base amount for moving `quote_amount` quote assets.
    pub fn get_quote_asset_twap(
        &self,
        pair: &Pair,
        direction: Direction,
        quote_amount: Dec,
        lookback: Duration,
    ) -> Result<Dec, EngineError> {
        self.calc_twap(pair, TwapCalcOption::QuoteAssetSwap, direction, quote_amount, lookback)
    }

    /// Mark, TWAP and index prices of the pool. A failing oracle or an undefined
    /// TWAP is logged and reported as `None` instead of failing the query.
    pub fn get_pool_prices(&self, pair: &Pair) -> Result<PoolPrices, EngineError> {
        pair.validate().map_err(crate::market::MarketError::from)?;
        let market = self.load_market(pair)?;
        market.validate_reserves()?;

        let index_price = match self.oracle.exchange_rate(pair) {
            Ok(price) => Some(price),
            Err(err) => {
                tracing::error!(%pair, %err, "index price unavailable");
                None
            }
        };

        let twap_mark = match self.get_mark_price_twap(pair, self.config.pool_prices_twap_lookback()) {
            Ok(price) => Some(price),
            Err(err) => {
                tracing::error!(%pair, %err, "mark twap unavailable");
                None
            }
        };

        Ok(PoolPrices {
            pair: pair.clone(),
            mark_price: market.get_mark_price(),
            twap_mark,
            index_price,
            swap_invariant: market.swap_invariant()?.round_int(),
            block_height: self.block.height,
        })
    }

    /// Whether the mark price deviates from the index price by the max spread ratio or more.
    pub fn is_over_spread_limit(&self, pair: &Pair) -> Result<bool, EngineError> {
        let market = self.load_market(pair)?;
        let index_price = self.oracle.exchange_rate(pair)?;
        Ok(market.is_over_spread_limit(index_price))
    }
}

#[cfg(test)]
mod tests {
    use crate::decimal::Dec;
    use crate::engine::{Engine, EngineConfig, EngineError};
    use crate::market::MarketConfig;
    use crate::oracle::{MockOracle, OracleError};
    use crate::market::Market;
    use crate::snapshot::ReserveSnapshot;
    use crate::store::{MemStore, PoolStore, SnapshotIter, SnapshotRange};
    use crate::types::{Direction, Pair, Timestamp};
    use rust_decimal_macros::dec;
    use std::cell::Cell;
    use std::time::Duration;

    // counts how many snapshots scans actually pull out of the store
    #[derive(Default)]
    struct CountingStore {
        inner: MemStore,
        pulled: Cell<usize>,
    }

    impl PoolStore for CountingStore {
        fn get_market(&self, pair: &Pair) -> Option<Market> {
            self.inner.get_market(pair)
        }

        fn set_market(&mut self, market: Market) {
            self.inner.set_market(market)
        }

        fn markets(&self) -> Vec<Market> {
            self.inner.markets()
        }

        fn set_snapshot(&mut self, snapshot: ReserveSnapshot) {
            self.inner.set_snapshot(snapshot)
        }

        fn snapshots(&self, pair: &Pair, range: SnapshotRange) -> SnapshotIter<'_> {
            let pulled = &self.pulled;
            Box::new(self.inner.snapshots(pair, range).inspect(move |_| pulled.set(pulled.get() + 1)))
        }
    }

    fn pair() -> Pair {
        Pair::new("ubtc", "unusd").unwrap()
    }

    // pool at 1000/1000 created at t=10ms with peg 9, repegged at 20ms and 30ms
    fn engine_with_history() -> Engine<MemStore, MockOracle> {
        let oracle = MockOracle::new().with_price(pair(), Dec::from_int(9));
        let mut engine = Engine::new(EngineConfig::default(), MemStore::new(), oracle);
        engine.set_block(1, Timestamp::from_millis(10));
        engine
            .create_pool(pair(), Dec::from_int(1000), Dec::from_int(1000), MarketConfig::default(), Dec::from_int(9))
            .unwrap();
        engine.set_block(2, Timestamp::from_millis(20));
        engine.edit_pool_peg_multiplier(&pair(), Dec::from(dec!(8.5))).unwrap();
        engine.set_block(3, Timestamp::from_millis(30));
        engine.edit_pool_peg_multiplier(&pair(), Dec::from(dec!(9.5))).unwrap();
        engine
    }

    #[test]
    fn mark_price_twap() {
        let mut engine = engine_with_history();
        engine.set_block(4, Timestamp::from_millis(35));
        let twap = engine.get_mark_price_twap(&pair(), Duration::from_millis(24)).unwrap();
        assert_eq!(twap, "8.895833333333333333".parse::<Dec>().unwrap());
    }

    #[test]
    fn twap_ignores_future_snapshots() {
        let mut engine = engine_with_history();
        engine.set_block(3, Timestamp::from_millis(25));
        // only 9 @ 10ms and 8.5 @ 20ms are visible: (8.5 * 5 + 9 * 10) / 15
        let twap = engine.get_mark_price_twap(&pair(), Duration::from_millis(15)).unwrap();
        assert_eq!(twap, "8.833333333333333333".parse::<Dec>().unwrap());
    }

    #[test]
    fn twap_with_single_snapshot() {
        let oracle = MockOracle::new();
        let mut engine = Engine::new(EngineConfig::default(), MemStore::new(), oracle);
        engine.set_block(1, Timestamp::from_millis(100));
        engine
            .create_pool(pair(), Dec::from_int(50), Dec::from_int(50), MarketConfig::default(), Dec::from_int(4))
            .unwrap();
        engine.set_block(2, Timestamp::from_millis(10_000));
        for lookback in [1, 100, 1_000_000] {
            let twap = engine.get_mark_price_twap(&pair(), Duration::from_millis(lookback)).unwrap();
            assert_eq!(twap, Dec::from_int(4));
        }
    }

    #[test]
    fn twap_scan_stops_at_window_start() {
        let mut engine = Engine::new(EngineConfig::default(), CountingStore::default(), MockOracle::new());
        engine.set_block(1, Timestamp::from_millis(0));
        engine
            .create_pool(pair(), Dec::from_int(1000), Dec::from_int(1000), MarketConfig::default(), Dec::ONE)
            .unwrap();
        for height in 2..=500 {
            engine.set_block(height, Timestamp::from_millis((height - 1) * 1_000));
            engine.end_blocker();
        }
        assert_eq!(engine.store().inner.snapshot_count(), 500);

        // window [496.5s, 499s] needs the snapshots at 499, 498, 497 and 496 only
        engine.store().pulled.set(0);
        let twap = engine.get_mark_price_twap(&pair(), Duration::from_millis(2_500)).unwrap();
        assert_eq!(twap, Dec::ONE);
        assert_eq!(engine.store().pulled.get(), 4);

        engine.store().pulled.set(0);
        assert_eq!(engine.get_last_snapshot(&pair()).unwrap().timestamp_ms, 499_000);
        assert_eq!(engine.store().pulled.get(), 1);
    }

    #[test]
    fn twap_without_snapshots() {
        let engine = engine_with_history();
        let other = Pair::new("ueth", "unusd").unwrap();
        let err = engine.get_mark_price_twap(&other, Duration::from_secs(60)).unwrap_err();
        assert!(matches!(err, EngineError::NoValidTwap { .. }));
    }

    #[test]
    fn base_and_quote_asset_twap() {
        let mut engine = engine_with_history();
        engine.set_block(4, Timestamp::from_millis(40));
        // peg 9.5 for the last 10ms only: removing 500 base costs 1000 reserve * 9.5
        let base_twap = engine
            .get_base_asset_twap(&pair(), Direction::Short, Dec::from_int(500), Duration::from_millis(10))
            .unwrap();
        assert_eq!(base_twap, Dec::from_int(9_500));

        // 950 quote assets at peg 9.5 is 100 reserve, buying 1000 - 1e6/1100 base
        let quote_twap = engine
            .get_quote_asset_twap(&pair(), Direction::Long, Dec::from_int(950), Duration::from_millis(10))
            .unwrap();
        assert_eq!(quote_twap, "90.909090909090909091".parse::<Dec>().unwrap());
    }

    #[test]
    fn base_asset_price() {
        let engine = engine_with_history();
        let price = engine
            .get_base_asset_price(&pair(), Direction::Long, Dec::from_int(1000))
            .unwrap();
        // adding 1000 base halves the quote reserve: 500 * 9.5
        assert_eq!(price, Dec::from_int(4_750));
        assert_eq!(engine.get_mark_price(&pair()).unwrap(), Dec::from(dec!(9.5)));
    }

    #[test]
    fn pool_prices_degrade_without_oracle() {
        let mut engine = engine_with_history();
        engine.set_block(4, Timestamp::from_millis(35));
        let prices = engine.get_pool_prices(&pair()).unwrap();
        assert_eq!(prices.index_price, Some(Dec::from_int(9)));
        assert_eq!(prices.mark_price, Dec::from(dec!(9.5)));
        assert_eq!(prices.swap_invariant, Dec::from_int(1_000_000));
        assert_eq!(prices.block_height, 4);
        assert!(prices.twap_mark.is_some());

        engine.oracle_mut().set_healthy(false);
        let prices = engine.get_pool_prices(&pair()).unwrap();
        assert_eq!(prices.index_price, None);
        assert_eq!(prices.mark_price, Dec::from(dec!(9.5)));
    }

    #[test]
    fn pool_prices_for_unknown_pair() {
        let engine = engine_with_history();
        let other = Pair::new("ueth", "unusd").unwrap();
        assert_eq!(engine.get_pool_prices(&other).unwrap_err(), EngineError::PairNotSupported(other));
    }

    #[test]
    fn spread_limit_uses_oracle() {
        let mut engine = engine_with_history();
        // mark 9.5 vs index 9: 0.0555 < 0.1
        assert!(!engine.is_over_spread_limit(&pair()).unwrap());

        engine.oracle_mut().set_price(pair(), Dec::from_int(5));
        assert!(engine.is_over_spread_limit(&pair()).unwrap());

        engine.oracle_mut().set_healthy(false);
        assert_eq!(
            engine.is_over_spread_limit(&pair()).unwrap_err(),
            EngineError::Oracle(OracleError::Unavailable)
        );
    }
}
