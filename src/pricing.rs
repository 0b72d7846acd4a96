// 3.0: swap math on the constant product curve x * y = k.
// pure functions on a Market. the same code prices live swaps and historical
// snapshots, so both paths always agree to the last digit.

use crate::decimal::Dec;
use crate::market::{Market, MarketError};

impl Market {
    /// Quote asset needed to buy one base asset at the current tangent of the curve.
    /// Zero if either reserve is empty.
    pub fn get_mark_price(&self) -> Dec {
        if self.base_reserve.is_zero() || self.quote_reserve.is_zero() {
            return Dec::ZERO;
        }
        self.quote_reserve / self.base_reserve * self.peg_multiplier
    }

    // quote reserves are unpegged units on the curve, quote assets are what traders pay
    pub fn from_quote_asset_to_reserve(&self, quote_asset: Dec) -> Result<Dec, MarketError> {
        Ok(quote_asset.checked_quo(self.peg_multiplier)?)
    }

    pub fn from_quote_reserve_to_asset(&self, quote_reserve: Dec) -> Result<Dec, MarketError> {
        Ok(quote_reserve.checked_mul(self.peg_multiplier)?)
    }

    /// Absolute base amount that moves when `quote_delta` is added to (positive)
    /// or removed from (negative) the quote reserve.
    pub fn get_base_amount_by_quote_amount(&self, quote_delta: Dec) -> Result<Dec, MarketError> {
        if quote_delta.is_zero() {
            return Ok(Dec::ZERO);
        }

        let invariant = self.swap_invariant()?;

        let quote_after = self.quote_reserve.checked_add(quote_delta)?;
        if !quote_after.is_positive() {
            return Err(MarketError::QuoteReserveAtZero { delta: quote_delta });
        }

        let base_after = invariant.checked_quo(quote_after)?;
        Ok(base_after.checked_sub(self.base_reserve)?.abs())
    }

    /// Absolute quote reserve amount that moves when `base_delta` is added to
    /// (positive) or removed from (negative) the base reserve.
    pub fn get_quote_reserve_by_base(&self, base_delta: Dec) -> Result<Dec, MarketError> {
        if base_delta.is_zero() {
            return Ok(Dec::ZERO);
        }

        let invariant = self.swap_invariant()?;

        let base_after = self.base_reserve.checked_add(base_delta)?;
        if !base_after.is_positive() {
            return Err(MarketError::BaseReserveAtZero { delta: base_delta });
        }

        let quote_after = invariant.checked_quo(base_after)?;
        Ok(quote_after.checked_sub(self.quote_reserve)?.abs())
    }

    pub fn has_enough_quote_reserve(&self, quote_amount: Dec) -> bool {
        self.quote_reserve * self.config.trade_limit_ratio >= quote_amount.abs()
    }

    pub fn has_enough_base_reserve(&self, base_amount: Dec) -> bool {
        self.base_reserve * self.config.trade_limit_ratio >= base_amount.abs()
    }

    pub fn has_enough_reserves_for_trade(&self, quote_amount: Dec, base_amount: Dec) -> Result<(), MarketError> {
        if !self.has_enough_quote_reserve(quote_amount) {
            return Err(MarketError::OverTradingLimit {
                side: "quote",
                amount: quote_amount.abs(),
            });
        }
        if !self.has_enough_base_reserve(base_amount) {
            return Err(MarketError::OverTradingLimit {
                side: "base",
                amount: base_amount.abs(),
            });
        }
        Ok(())
    }

    /// `amount` may be negative.
    pub fn add_to_quote_reserve(&mut self, amount: Dec) {
        self.quote_reserve += amount;
    }

    // traders receive what leaves the pool, so bias moves opposite to the reserve
    pub fn add_to_base_reserve_and_bias(&mut self, amount: Dec) {
        self.base_reserve += amount;
        self.bias -= amount;
    }
}

#[cfg(test)]
mod tests {
    use crate::decimal::{Dec, DecError};
    use crate::market::{Market, MarketConfig, MarketError};
    use crate::types::Pair;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> Dec {
        s.parse().unwrap()
    }

    fn market(base: i64, quote: i64, peg: Dec) -> Market {
        let config = MarketConfig::default().with_trade_limit_ratio(d("0.9"));
        Market::new(
            Pair::new("ubtc", "unusd").unwrap(),
            Dec::from_int(base),
            Dec::from_int(quote),
            config,
            Dec::ZERO,
            peg,
        )
        .unwrap()
    }

    #[test]
    fn mark_price() {
        assert_eq!(market(1, 40_000, Dec::ONE).get_mark_price(), Dec::from_int(40_000));
        assert_eq!(
            market(34_597_234, 2_489_723_947, Dec::ONE).get_mark_price(),
            d("71.963092396345904415")
        );
        assert_eq!(market(1000, 1000, Dec::from_int(3)).get_mark_price(), Dec::from_int(3));
    }

    #[test]
    fn mark_price_zero_reserves() {
        let mut m = market(1000, 1000, Dec::ONE);
        m.base_reserve = Dec::ZERO;
        assert_eq!(m.get_mark_price(), Dec::ZERO);
    }

    #[test]
    fn base_amount_by_quote_amount() {
        let m = market(1000, 1000, Dec::ONE);
        assert_eq!(m.get_base_amount_by_quote_amount(Dec::ZERO).unwrap(), Dec::ZERO);
        assert_eq!(
            m.get_base_amount_by_quote_amount(Dec::from_int(500)).unwrap(),
            d("333.333333333333333333")
        );
        assert_eq!(
            m.get_base_amount_by_quote_amount(Dec::from_int(-500)).unwrap(),
            Dec::from_int(1000)
        );
        assert_eq!(
            m.get_base_amount_by_quote_amount(Dec::from_int(999_555_999)).unwrap(),
            d("999.998999556802663137")
        );
    }

    #[test]
    fn large_reserves_keep_18_digits() {
        let m = market(1_000_000_000_000, 1_000_000_000_000, Dec::ONE);
        assert_eq!(
            m.get_base_amount_by_quote_amount(Dec::from_int(500_000_000_000)).unwrap(),
            d("333333333333.333333333333333333")
        );
        assert_eq!(
            m.get_quote_reserve_by_base(Dec::from_int(-400_000_000_000)).unwrap(),
            d("666666666666.666666666666666667")
        );

        let m = market(1_000_000_000_000_000, 1_000_000_000_000_000, Dec::ONE);
        assert_eq!(m.get_base_amount_by_quote_amount(Dec::ONE).unwrap(), d("0.999999999999999"));
    }

    #[test]
    fn invariant_overflow_is_an_error() {
        let mut m = market(1000, 1000, Dec::ONE);
        m.base_reserve = d("1000000000000000000000");
        m.quote_reserve = m.base_reserve;
        for result in [
            m.get_base_amount_by_quote_amount(Dec::ONE),
            m.get_quote_reserve_by_base(Dec::ONE),
        ] {
            assert_eq!(result.unwrap_err(), MarketError::Math(DecError::Overflow));
        }
    }

    #[test]
    fn quote_reserve_exhausted() {
        let m = market(1000, 1000, Dec::ONE);
        for delta in [-1000, -9999] {
            let err = m.get_base_amount_by_quote_amount(Dec::from_int(delta)).unwrap_err();
            assert!(matches!(err, MarketError::QuoteReserveAtZero { .. }));
        }
    }

    #[test]
    fn quote_reserve_by_base() {
        let m = market(1000, 1000, Dec::ONE);
        assert_eq!(m.get_quote_reserve_by_base(Dec::ZERO).unwrap(), Dec::ZERO);
        assert_eq!(
            m.get_quote_reserve_by_base(Dec::from_int(500)).unwrap(),
            d("333.333333333333333333")
        );
        assert_eq!(m.get_quote_reserve_by_base(Dec::from_int(-500)).unwrap(), Dec::from_int(1000));
        let err = m.get_quote_reserve_by_base(Dec::from_int(-1000)).unwrap_err();
        assert!(matches!(err, MarketError::BaseReserveAtZero { .. }));
    }

    #[test]
    fn peg_conversions_are_inverse() {
        let m = market(1000, 1000, Dec::from(dec!(2.5)));
        assert_eq!(m.from_quote_asset_to_reserve(Dec::from_int(10)).unwrap(), Dec::from_int(4));
        assert_eq!(m.from_quote_reserve_to_asset(Dec::from_int(4)).unwrap(), Dec::from_int(10));
    }

    #[test]
    fn trade_limits() {
        // 0.9 of 1000 = 900
        let m = market(1000, 1000, Dec::ONE);
        assert!(m.has_enough_quote_reserve(Dec::from_int(900)));
        assert!(m.has_enough_quote_reserve(Dec::from_int(-900)));
        assert!(!m.has_enough_quote_reserve(Dec::from_int(901)));
        assert!(m.has_enough_base_reserve(Dec::from_int(900)));
        assert!(!m.has_enough_base_reserve(Dec::from_int(-901)));

        let err = m
            .has_enough_reserves_for_trade(Dec::from_int(100), Dec::from_int(901))
            .unwrap_err();
        assert!(matches!(err, MarketError::OverTradingLimit { side: "base", .. }));
    }

    #[test]
    fn bias_moves_against_base_reserve() {
        let mut m = market(1000, 1000, Dec::ONE);
        m.add_to_base_reserve_and_bias(Dec::from_int(-10));
        m.add_to_quote_reserve(Dec::from_int(10));
        assert_eq!(m.base_reserve, Dec::from_int(990));
        assert_eq!(m.quote_reserve, Dec::from_int(1010));
        assert_eq!(m.bias, Dec::from_int(10));
    }
}
