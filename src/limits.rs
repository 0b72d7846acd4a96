// 4.0: price guards. fluctuation limit against a snapshot, spread limit against
// the oracle index price, and the trader's own slippage limit.

use crate::decimal::Dec;
use crate::market::Market;
use crate::snapshot::ReserveSnapshot;
use crate::types::Direction;

/// Trader's slippage limit was not met.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("amount {amount} fails user limit {limit} for {direction:?}")]
pub struct UserLimitViolation {
    pub amount: Dec,
    pub limit: Dec,
    pub direction: Direction,
}

impl Market {
    /// True when the mark price left the band `[p * (1 - r), p * (1 + r)]` around
    /// the snapshot price `p`. Always false with a zero fluctuation ratio.
    pub fn is_over_fluctuation_limit_in_relation_with_snapshot(&self, snapshot: &ReserveSnapshot) -> bool {
        let ratio = self.config.fluctuation_limit_ratio;
        if ratio.is_zero() {
            return false;
        }

        let mark_price = self.get_mark_price();
        mark_price > snapshot.upper_fluctuation_limit(ratio) || mark_price < snapshot.lower_fluctuation_limit(ratio)
    }

    /// True when `|mark - index| / index >= max_oracle_spread_ratio`.
    pub fn is_over_spread_limit(&self, index_price: Dec) -> bool {
        // no usable index price, treat as over
        if !index_price.is_positive() {
            return true;
        }
        let spread = ((self.get_mark_price() - index_price) / index_price).abs();
        spread >= self.config.max_oracle_spread_ratio
    }
}

// zero limit disables the check. longs must receive at least the limit,
// shorts must pay at most the limit.
pub fn check_if_limit_is_violated(limit: Dec, amount: Dec, direction: Direction) -> Result<(), UserLimitViolation> {
    if limit.is_zero() {
        return Ok(());
    }

    let violated = match direction {
        Direction::Long => amount < limit,
        Direction::Short => amount > limit,
        Direction::Unspecified => false,
    };

    if violated {
        return Err(UserLimitViolation {
            amount,
            limit,
            direction,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MarketConfig;
    use crate::types::{Pair, Timestamp};
    use rust_decimal_macros::dec;

    fn market(base: i64, quote: i64, config: MarketConfig) -> Market {
        Market::new(
            Pair::new("ubtc", "unusd").unwrap(),
            Dec::from_int(base),
            Dec::from_int(quote),
            config,
            Dec::ZERO,
            Dec::ONE,
        )
        .unwrap()
    }

    fn snapshot_at_price(price: i64) -> ReserveSnapshot {
        ReserveSnapshot::new(
            Pair::new("ubtc", "unusd").unwrap(),
            Dec::from_int(1000),
            Dec::from_int(1000 * price),
            Dec::ONE,
            Timestamp::from_millis(0),
        )
    }

    #[test]
    fn fluctuation_within_band() {
        let m = market(1000, 1000, MarketConfig::default());
        // band around 1 is [0.9, 1.1]
        assert!(!m.is_over_fluctuation_limit_in_relation_with_snapshot(&snapshot_at_price(1)));
        assert!(m.is_over_fluctuation_limit_in_relation_with_snapshot(&snapshot_at_price(2)));
    }

    #[test]
    fn fluctuation_band_edges_are_inclusive() {
        // mark price 1.1 against snapshot price 1 is exactly on the upper edge
        let m = market(1000, 1100, MarketConfig::default());
        assert!(!m.is_over_fluctuation_limit_in_relation_with_snapshot(&snapshot_at_price(1)));

        let m = market(1000, 1101, MarketConfig::default());
        assert!(m.is_over_fluctuation_limit_in_relation_with_snapshot(&snapshot_at_price(1)));
    }

    #[test]
    fn fluctuation_disabled_with_zero_ratio() {
        let config = MarketConfig::default().with_fluctuation_limit_ratio(Dec::ZERO);
        let m = market(1000, 1000, config);
        assert!(!m.is_over_fluctuation_limit_in_relation_with_snapshot(&snapshot_at_price(1000)));
    }

    #[test]
    fn spread_limit() {
        let m = market(1000, 1000, MarketConfig::default());
        assert!(!m.is_over_spread_limit(Dec::ONE));
        assert!(!m.is_over_spread_limit(Dec::from(dec!(1.05))));
        // |1 - 0.9| / 0.9 = 0.111 >= 0.1
        assert!(m.is_over_spread_limit(Dec::from(dec!(0.9))));
        assert!(m.is_over_spread_limit(Dec::from_int(2)));
        assert!(m.is_over_spread_limit(Dec::ZERO));
    }

    #[test]
    fn user_limit() {
        let ten = Dec::from_int(10);
        assert!(check_if_limit_is_violated(Dec::ZERO, Dec::ONE, Direction::Long).is_ok());
        assert!(check_if_limit_is_violated(ten, Dec::from_int(11), Direction::Long).is_ok());
        assert!(check_if_limit_is_violated(ten, Dec::from_int(9), Direction::Long).is_err());
        assert!(check_if_limit_is_violated(ten, Dec::from_int(9), Direction::Short).is_ok());
        let err = check_if_limit_is_violated(ten, Dec::from_int(11), Direction::Short).unwrap_err();
        assert_eq!(err.direction, Direction::Short);
        assert_eq!(err.amount, Dec::from_int(11));
    }
}
