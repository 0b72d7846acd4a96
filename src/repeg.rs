// 6.0: cost of governance edits. moving the peg or the depth changes what the
// pool owes traders for their net position (the bias). the difference is paid
// between the ecosystem fund and the perp vault, outside this crate.

use crate::decimal::Dec;
use crate::market::{Market, MarketError};
use serde::{Deserialize, Serialize};

/// Which way the quote cost of an edit has to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundFlow {
    EcosystemFundToVault,
    VaultToEcosystemFund,
    None,
}

impl FundFlow {
    pub fn from_cost(cost: Dec) -> Self {
        if cost.is_positive() {
            FundFlow::EcosystemFundToVault
        } else if cost.is_negative() {
            FundFlow::VaultToEcosystemFund
        } else {
            FundFlow::None
        }
    }
}

/// Quote reserve that moves when every trader closes out, signed like the bias.
fn bias_in_quote_reserve(market: &Market) -> Result<Dec, MarketError> {
    if market.bias.is_zero() {
        return Ok(Dec::ZERO);
    }
    // closing longs sells base back into the pool, closing shorts buys it out
    let quote_reserve = market.get_quote_reserve_by_base(market.bias)?;
    if market.bias.is_negative() {
        Ok(-quote_reserve)
    } else {
        Ok(quote_reserve)
    }
}

/// Quote assets the pool would pay out if all positions closed now.
/// Negative when the pool would receive instead.
pub fn market_value(market: &Market) -> Result<Dec, MarketError> {
    let reserve = bias_in_quote_reserve(market)?;
    Ok(reserve.checked_mul(market.peg_multiplier)?)
}

/// Ceil rounded quote cost of moving the peg multiplier to `new_peg`.
pub fn calc_repeg_cost(market: &Market, new_peg: Dec) -> Result<Dec, MarketError> {
    if !new_peg.is_positive() {
        return Err(MarketError::NonPositivePegMultiplier(new_peg));
    }
    let reserve = bias_in_quote_reserve(market)?;
    let peg_delta = new_peg.checked_sub(market.peg_multiplier)?;
    Ok(reserve.checked_mul(peg_delta)?.ceil())
}

/// Scales both reserves and the depth by `sqrt(multiplier)`.
pub fn scale_swap_invariant(market: &mut Market, multiplier: Dec) -> Result<(), MarketError> {
    if !multiplier.is_positive() {
        return Err(MarketError::NonPositiveSwapInvariant(multiplier));
    }
    let factor = multiplier.sqrt()?;
    market.base_reserve = market.base_reserve.checked_mul(factor)?;
    market.quote_reserve = market.quote_reserve.checked_mul(factor)?;
    market.sqrt_depth = market.sqrt_depth.checked_mul(factor)?;
    Ok(())
}

/// Ceil rounded quote cost of multiplying the swap invariant by `multiplier`.
pub fn calc_swap_invariant_cost(market: &Market, multiplier: Dec) -> Result<Dec, MarketError> {
    let before = market_value(market)?;

    let mut scaled = market.clone();
    scale_swap_invariant(&mut scaled, multiplier)?;
    let after = market_value(&scaled)?;

    Ok(after.checked_sub(before)?.ceil())
}
