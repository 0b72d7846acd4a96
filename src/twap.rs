// 5.0: time weighted average price over reserve snapshots.
// each snapshot's price counts for as long as it was the latest one. the
// oldest snapshot inside the scan is clipped to the lookback lower bound.

use crate::decimal::Dec;
use crate::market::MarketError;
use crate::snapshot::{price_with_snapshot, ReserveSnapshot};
use crate::types::{Direction, Timestamp, TwapCalcOption};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TwapError {
    #[error("no snapshots at or before {now} to compute a twap from")]
    NoValidTwap { now: Timestamp },

    #[error(transparent)]
    Market(#[from] MarketError),
}

/// What to price and over which window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwapQuery {
    pub option: TwapCalcOption,
    pub direction: Direction,
    pub amount: Dec,
    pub now: Timestamp,
    pub lower_bound_ms: i64,
}

impl TwapQuery {
    pub fn spot(now: Timestamp, lower_bound_ms: i64) -> Self {
        Self {
            option: TwapCalcOption::Spot,
            direction: Direction::Unspecified,
            amount: Dec::ZERO,
            now,
            lower_bound_ms,
        }
    }
}

/// Takes snapshots newest first until one at or below `lower_bound_ms` has been taken.
pub fn collect_window<I>(descending: I, lower_bound_ms: i64) -> Vec<ReserveSnapshot>
where
    I: IntoIterator<Item = ReserveSnapshot>,
{
    let mut window = Vec::new();
    for snapshot in descending {
        let reached_bound = snapshot.timestamp_ms <= lower_bound_ms;
        window.push(snapshot);
        if reached_bound {
            break;
        }
    }
    window
}

/// `snapshots` must be sorted newest first and contain nothing after `query.now`.
pub fn calc_twap(snapshots: &[ReserveSnapshot], query: &TwapQuery) -> Result<Dec, TwapError> {
    let price_of = |s: &ReserveSnapshot| price_with_snapshot(s, query.option, query.direction, query.amount);

    let newest = match snapshots {
        [] => return Err(TwapError::NoValidTwap { now: query.now }),
        // a lone snapshot is the price, however long the window
        [only] => return Ok(price_of(only)?),
        [first, ..] => first,
    };

    let mut prev_ms = query.now.as_millis();
    let mut cumulative_price = Dec::ZERO;
    let mut cumulative_ms: i64 = 0;

    for snapshot in snapshots {
        let price = price_of(snapshot)?;
        let start_ms = snapshot.timestamp_ms.max(query.lower_bound_ms);
        let elapsed_ms = prev_ms - start_ms;

        cumulative_price += price.mul_int(elapsed_ms);
        cumulative_ms += elapsed_ms;

        if snapshot.timestamp_ms <= query.lower_bound_ms {
            break;
        }
        prev_ms = snapshot.timestamp_ms;
    }

    if cumulative_ms == 0 {
        return Ok(price_of(newest)?);
    }

    Ok(cumulative_price.quo_int(cumulative_ms).map_err(MarketError::from)?)
}
