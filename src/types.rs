// 1.0: primitives. pair ids, trade direction, twap calc option, timestamps and block context.
// each is its own type so the compiler catches mixups between pairs and raw strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::decimal::Dec;

const PAIR_SEPARATOR: char = ':';
const MIN_DENOM_LEN: usize = 3;
const MAX_DENOM_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairError {
    #[error("pair {0:?} must have the form base:quote")]
    Malformed(String),

    #[error("invalid denom {0:?}")]
    InvalidDenom(String),

    #[error("base and quote must differ, both are {0:?}")]
    SameDenom(String),
}

// 1.1: trading pair. base is the perp asset, quote is what it's priced in.
// ordered by (base, quote) so store scans and exports are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pair {
    base: String,
    quote: String,
}

impl Pair {
    pub fn new(base: &str, quote: &str) -> Result<Self, PairError> {
        let pair = Self {
            base: base.to_string(),
            quote: quote.to_string(),
        };
        pair.validate()?;
        Ok(pair)
    }

    // no validation, for records that get validated later as a whole
    pub fn new_unchecked(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_string(),
            quote: quote.to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn validate(&self) -> Result<(), PairError> {
        validate_denom(&self.base)?;
        validate_denom(&self.quote)?;
        if self.base == self.quote {
            return Err(PairError::SameDenom(self.base.clone()));
        }
        Ok(())
    }
}

fn validate_denom(denom: &str) -> Result<(), PairError> {
    let len_ok = (MIN_DENOM_LEN..=MAX_DENOM_LEN).contains(&denom.len());
    let starts_with_letter = denom.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    let chars_ok = denom
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-'));

    if len_ok && starts_with_letter && chars_ok {
        Ok(())
    } else {
        Err(PairError::InvalidDenom(denom.to_string()))
    }
}

impl FromStr for Pair {
    type Err = PairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(PAIR_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(base), Some(quote), None) => Pair::new(base, quote),
            _ => Err(PairError::Malformed(s.to_string())),
        }
    }
}

impl TryFrom<String> for Pair {
    type Error = PairError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pair> for String {
    fn from(pair: Pair) -> Self {
        pair.to_string()
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.base, PAIR_SEPARATOR, self.quote)
    }
}

// 1.2: trade direction. Long adds the traded asset to the pool side it names,
// Short removes it. Unspecified behaves like Long.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Unspecified,
    Long,
    Short,
}

impl Direction {
    pub fn multiplier(&self) -> i64 {
        match self {
            Direction::Unspecified | Direction::Long => 1,
            Direction::Short => -1,
        }
    }

    /// `amount` carrying this direction's sign.
    pub fn signed(&self, amount: Dec) -> Dec {
        if self.multiplier() < 0 {
            -amount
        } else {
            amount
        }
    }
}

// 1.3: how a single reserve snapshot is turned into a price for the twap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TwapCalcOption {
    /// quote/base * peg, ignores direction and amount
    Spot,
    /// base amount received for swapping a quote asset amount
    QuoteAssetSwap,
    /// quote asset amount received for swapping a base amount
    BaseAssetSwap,
}

// 1.4: millisecond timestamp (block time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const MIN: Timestamp = Timestamp(i64::MIN);

    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    pub fn saturating_sub(&self, duration: Duration) -> Self {
        let ms = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        Self(self.0.saturating_sub(ms))
    }

    pub fn saturating_add_millis(&self, ms: i64) -> Self {
        Self(self.0.saturating_add(ms))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// 1.5: the block currently being executed. every state change is stamped with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub height: i64,
    pub time: Timestamp,
}

impl BlockContext {
    pub fn new(height: i64, time: Timestamp) -> Self {
        Self { height, time }
    }

    pub fn genesis() -> Self {
        Self::new(0, Timestamp::from_millis(0))
    }

    pub fn next(&self, elapsed_ms: i64) -> Self {
        Self::new(self.height + 1, self.time.saturating_add_millis(elapsed_ms))
    }
}
