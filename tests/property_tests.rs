//! Property-based tests for the curve math and pool invariants.
//!
//! These tests verify invariants hold under random inputs.

use proptest::prelude::*;
use vamm_core::*;

// Strategies for generating test data
// log spread from 1e3 to ~1e16 so large pools are drawn as often as small ones
fn reserve_strategy() -> impl Strategy<Value = Dec> {
    (1_000i64..10_000i64, 0u32..13u32).prop_map(|(digits, exp)| Dec::from_int(digits * 10i64.pow(exp)))
}

fn peg_strategy() -> impl Strategy<Value = Dec> {
    (1i64..1_000_000i64).prop_map(|x| Dec::from_int(x).quo_int(100).unwrap()) // 0.01 to 10,000
}

fn swap_strategy() -> impl Strategy<Value = Vec<(bool, i64)>> {
    proptest::collection::vec((any::<bool>(), 1i64..20_000i64), 1..30)
}

fn pair() -> Pair {
    Pair::new("ubtc", "unusd").unwrap()
}

fn market(reserve: Dec, peg: Dec) -> Market {
    Market::new(pair(), reserve, reserve, MarketConfig::default(), Dec::ZERO, peg).unwrap()
}

// fluctuation check disabled so random walks are never refused by it
fn engine_with_pool(reserve: i64) -> Engine<MemStore, MockOracle> {
    let oracle = MockOracle::new().with_price(pair(), Dec::ONE);
    let mut engine = Engine::new(EngineConfig::default(), MemStore::new(), oracle);
    engine.set_block(1, Timestamp::from_millis(1_000));
    let config = MarketConfig::default().with_fluctuation_limit_ratio(Dec::ZERO);
    engine
        .create_pool(pair(), Dec::from_int(reserve), Dec::from_int(reserve), config, Dec::ONE)
        .unwrap();
    engine
}

fn direction(long: bool) -> Direction {
    if long {
        Direction::Long
    } else {
        Direction::Short
    }
}

proptest! {
    /// Zero deltas move nothing on either side of the curve
    #[test]
    fn zero_delta_is_identity(
        reserve in reserve_strategy(),
        peg in peg_strategy(),
    ) {
        let m = market(reserve, peg);
        prop_assert_eq!(m.get_base_amount_by_quote_amount(Dec::ZERO).unwrap(), Dec::ZERO);
        prop_assert_eq!(m.get_quote_reserve_by_base(Dec::ZERO).unwrap(), Dec::ZERO);
    }

    /// Equal reserves price at the peg multiplier
    #[test]
    fn equal_reserves_mark_at_peg(
        reserve in reserve_strategy(),
        peg in peg_strategy(),
    ) {
        prop_assert_eq!(market(reserve, peg).get_mark_price(), peg);
    }

    /// Adding quote always releases less base than the pool holds
    #[test]
    fn base_out_bounded_by_reserve(
        reserve in reserve_strategy(),
        quote_in in 1i64..1_000_000_000i64,
    ) {
        let m = market(reserve, Dec::ONE);
        let base_out = m.get_base_amount_by_quote_amount(Dec::from_int(quote_in)).unwrap();
        prop_assert!(base_out.is_positive());
        prop_assert!(base_out < m.base_reserve);
    }

    /// A zero fluctuation ratio never flags a move, however large
    #[test]
    fn zero_fluctuation_ratio_never_over(
        reserve in reserve_strategy(),
        moved in reserve_strategy(),
        peg in peg_strategy(),
    ) {
        let snapshot = market(reserve, Dec::ONE).to_snapshot(Timestamp::from_millis(0));
        let mut m = market(moved, peg);
        m.config = m.config.with_fluctuation_limit_ratio(Dec::ZERO);
        m.quote_reserve = m.quote_reserve.mul_int(3);
        prop_assert!(!m.is_over_fluctuation_limit_in_relation_with_snapshot(&snapshot));
    }

    /// Nothing to pay for a peg move when traders hold no net position
    #[test]
    fn repeg_free_without_bias(
        reserve in reserve_strategy(),
        peg in peg_strategy(),
        new_peg in peg_strategy(),
    ) {
        let m = market(reserve, peg);
        prop_assert_eq!(calc_repeg_cost(&m, new_peg).unwrap(), Dec::ZERO);
        prop_assert_eq!(calc_swap_invariant_cost(&m, Dec::from_int(4)).unwrap(), Dec::ZERO);
    }

    /// Creating a pool of any size keeps depth exact and the mark at the peg
    #[test]
    fn create_pool_at_any_size(
        reserve in reserve_strategy(),
        peg in peg_strategy(),
    ) {
        let mut engine = Engine::new(EngineConfig::default(), MemStore::new(), MockOracle::new());
        engine.set_block(1, Timestamp::from_millis(1_000));
        engine.create_pool(pair(), reserve, reserve, MarketConfig::default(), peg).unwrap();

        let pool = engine.get_pool(&pair()).unwrap();
        prop_assert_eq!(pool.sqrt_depth, reserve);
        prop_assert_eq!(pool.get_mark_price(), peg);
        prop_assert!(engine.edit_swap_invariant(&pair(), Dec::from_int(4)).is_ok());
    }

    /// Stored depth stays within one unit of sqrt(base * quote) through any swap sequence
    #[test]
    fn depth_holds_through_swaps(swaps in swap_strategy()) {
        let mut engine = engine_with_pool(1_000_000);
        let initial_depth = engine.get_pool(&pair()).unwrap().sqrt_depth;

        for (long, amount) in swaps {
            let _ = engine.swap_quote_for_base(&pair(), direction(long), Dec::from_int(amount), Dec::ZERO, false);

            let pool = engine.get_pool(&pair()).unwrap();
            prop_assert!(pool.validate_liquidity_depth().is_ok());
            prop_assert_eq!(pool.sqrt_depth, initial_depth);
            prop_assert!(pool.get_mark_price().is_positive());
        }
    }

    /// Bias is the net base traders took out of the pool
    #[test]
    fn bias_tracks_net_base(swaps in swap_strategy()) {
        let mut engine = engine_with_pool(1_000_000);
        let mut net_base = Dec::ZERO;

        for (long, amount) in swaps {
            let dir = direction(long);
            if let Ok(outcome) = engine.swap_quote_for_base(&pair(), dir, Dec::from_int(amount), Dec::ZERO, false) {
                net_base += dir.signed(outcome.amount);
            }
        }

        let pool = engine.get_pool(&pair()).unwrap();
        prop_assert_eq!(pool.bias, net_base);
    }

    /// Selling back what a long bought returns the pool to its starting price
    #[test]
    fn round_trip_restores_mark(
        amount in 1i64..50_000i64,
    ) {
        let mut engine = engine_with_pool(1_000_000);
        let bought = engine
            .swap_quote_for_base(&pair(), Direction::Long, Dec::from_int(amount), Dec::ZERO, false)
            .unwrap();
        engine
            .swap_base_for_quote(&pair(), Direction::Long, bought.amount, Dec::ZERO, false)
            .unwrap();

        let pool = engine.get_pool(&pair()).unwrap();
        let drift = (pool.get_mark_price() - Dec::ONE).abs();
        prop_assert!(drift < "0.000000000001".parse::<Dec>().unwrap(), "mark drifted by {}", drift);
        prop_assert!(pool.bias.abs() < "0.000000000001".parse::<Dec>().unwrap());
    }

    /// User limits: zero never binds, an exact limit always passes
    #[test]
    fn user_limit_boundaries(
        amount in 1i64..1_000_000i64,
        long in any::<bool>(),
    ) {
        let amount = Dec::from_int(amount);
        let dir = direction(long);
        prop_assert!(check_if_limit_is_violated(Dec::ZERO, amount, dir).is_ok());
        prop_assert!(check_if_limit_is_violated(amount, amount, dir).is_ok());
        prop_assert!(check_if_limit_is_violated(amount, amount, Direction::Unspecified).is_ok());
    }
}
