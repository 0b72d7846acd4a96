// 2.0: fixed point decimal used for every reserve, price and ratio.
// a 256 bit magnitude scaled by 10^18 plus a sign. exactly 18 fractional
// digits at any size, products and quotients round half to even at the 18th
// digit, same on every node. overflow is an error, never a silent truncation.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Number of fractional digits kept after every operation.
pub const PRECISION: u32 = 18;

// 10^18
const SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("square root of negative number {0}")]
    NegativeSqrt(Dec),

    #[error("decimal overflow")]
    Overflow,

    #[error("invalid decimal string {0:?}")]
    Parse(String),
}

/// Signed fixed point number, `mantissa / 10^18`. Zero is never negative.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Dec {
    negative: bool,
    mantissa: U256,
}

fn pow10(exp: u32) -> U256 {
    (0..exp).fold(U256::from(1u64), |acc, _| acc * U256::from(10u64))
}

// n / d rounded half to even
fn div_round(n: U256, d: U256) -> U256 {
    let quotient = n / d;
    let remainder = n % d;
    let rest = d - remainder;
    let round_up = match remainder.cmp(&rest) {
        Ordering::Greater => true,
        Ordering::Equal => quotient % U256::from(2u64) != U256::ZERO,
        Ordering::Less => false,
    };
    if round_up {
        quotient + U256::from(1u64)
    } else {
        quotient
    }
}

// floor(sqrt(n)), newton iteration from above
fn isqrt(n: U256) -> U256 {
    if n.is_zero() {
        return n;
    }
    let mut x = (n >> 1usize) + U256::from(1u64);
    let mut y = (x + n / x) >> 1usize;
    while y < x {
        x = y;
        y = (x + n / x) >> 1usize;
    }
    x
}

impl Dec {
    pub const ZERO: Dec = Dec {
        negative: false,
        mantissa: U256::ZERO,
    };
    pub const ONE: Dec = Dec {
        negative: false,
        mantissa: SCALE,
    };

    fn from_parts(negative: bool, mantissa: U256) -> Self {
        Self {
            negative: negative && !mantissa.is_zero(),
            mantissa,
        }
    }

    pub fn from_int(value: i64) -> Self {
        Self::from_parts(value < 0, U256::from(value.unsigned_abs()) * SCALE)
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.negative && !self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn abs(&self) -> Self {
        Self::from_parts(false, self.mantissa)
    }

    pub fn mul_int(&self, factor: i64) -> Self {
        *self * Dec::from_int(factor)
    }

    pub fn checked_add(&self, other: Dec) -> Result<Self, DecError> {
        if self.negative == other.negative {
            let mantissa = self.mantissa.checked_add(other.mantissa).ok_or(DecError::Overflow)?;
            return Ok(Self::from_parts(self.negative, mantissa));
        }
        if self.mantissa >= other.mantissa {
            Ok(Self::from_parts(self.negative, self.mantissa - other.mantissa))
        } else {
            Ok(Self::from_parts(other.negative, other.mantissa - self.mantissa))
        }
    }

    pub fn checked_sub(&self, other: Dec) -> Result<Self, DecError> {
        self.checked_add(-other)
    }

    pub fn checked_mul(&self, other: Dec) -> Result<Self, DecError> {
        let product = self.mantissa.checked_mul(other.mantissa).ok_or(DecError::Overflow)?;
        Ok(Self::from_parts(self.negative != other.negative, div_round(product, SCALE)))
    }

    pub fn checked_quo(&self, divisor: Dec) -> Result<Self, DecError> {
        if divisor.is_zero() {
            return Err(DecError::DivisionByZero);
        }
        let scaled = self.mantissa.checked_mul(SCALE).ok_or(DecError::Overflow)?;
        Ok(Self::from_parts(
            self.negative != divisor.negative,
            div_round(scaled, divisor.mantissa),
        ))
    }

    pub fn quo_int(&self, divisor: i64) -> Result<Self, DecError> {
        self.checked_quo(Dec::from_int(divisor))
    }

    /// Square root truncated at the 18th digit.
    pub fn sqrt(&self) -> Result<Self, DecError> {
        if self.is_negative() {
            return Err(DecError::NegativeSqrt(*self));
        }
        let scaled = self.mantissa.checked_mul(SCALE).ok_or(DecError::Overflow)?;
        Ok(Self::from_parts(false, isqrt(scaled)))
    }

    // smallest integer >= self
    pub fn ceil(&self) -> Self {
        let whole = self.mantissa / SCALE * SCALE;
        if whole == self.mantissa || self.negative {
            return Self::from_parts(self.negative, whole);
        }
        Self::from_parts(false, whole + SCALE)
    }

    // banker's rounding to an integer
    pub fn round_int(&self) -> Self {
        Self::from_parts(self.negative, div_round(self.mantissa, SCALE) * SCALE)
    }
}

impl From<Decimal> for Dec {
    fn from(value: Decimal) -> Self {
        let magnitude = U256::from(value.mantissa().unsigned_abs());
        let scale = value.scale();
        let mantissa = if scale <= PRECISION {
            magnitude * pow10(PRECISION - scale)
        } else {
            div_round(magnitude, pow10(scale - PRECISION))
        };
        Self::from_parts(value.is_sign_negative(), mantissa)
    }
}

impl From<i64> for Dec {
    fn from(value: i64) -> Self {
        Self::from_int(value)
    }
}

impl FromStr for Dec {
    type Err = DecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DecError::Parse(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() || fraction.len() > PRECISION as usize {
            return Err(invalid());
        }
        if digits.contains('.') && fraction.is_empty() {
            return Err(invalid());
        }

        let padding = PRECISION as usize - fraction.len();
        let mut mantissa = U256::ZERO;
        for c in whole.chars().chain(fraction.chars()).chain(std::iter::repeat('0').take(padding)) {
            let digit = c.to_digit(10).ok_or_else(invalid)?;
            mantissa = mantissa
                .checked_mul(U256::from(10u64))
                .and_then(|m| m.checked_add(U256::from(u64::from(digit))))
                .ok_or_else(invalid)?;
        }
        Ok(Self::from_parts(negative, mantissa))
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = format!("{:0>19}", self.mantissa.to_string());
        let (whole, fraction) = digits.split_at(digits.len() - PRECISION as usize);
        let fraction = fraction.trim_end_matches('0');
        let sign = if self.negative { "-" } else { "" };
        if fraction.is_empty() {
            write!(f, "{sign}{whole}")
        } else {
            write!(f, "{sign}{whole}.{fraction}")
        }
    }
}

impl fmt::Debug for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dec({self})")
    }
}

impl Ord for Dec {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.mantissa.cmp(&other.mantissa),
            (true, true) => other.mantissa.cmp(&self.mantissa),
        }
    }
}

impl PartialOrd for Dec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// decimal strings on the wire, like the chain's own json
impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// operators panic on overflow like the integer ones. reserve math goes
// through the checked_* methods instead.
impl Add for Dec {
    type Output = Dec;

    fn add(self, rhs: Dec) -> Dec {
        match self.checked_add(rhs) {
            Ok(sum) => sum,
            Err(err) => panic!("{err} in {self} + {rhs}"),
        }
    }
}

impl Sub for Dec {
    type Output = Dec;

    fn sub(self, rhs: Dec) -> Dec {
        self + -rhs
    }
}

impl Mul for Dec {
    type Output = Dec;

    fn mul(self, rhs: Dec) -> Dec {
        match self.checked_mul(rhs) {
            Ok(product) => product,
            Err(err) => panic!("{err} in {self} * {rhs}"),
        }
    }
}

impl Div for Dec {
    type Output = Dec;

    fn div(self, rhs: Dec) -> Dec {
        match self.checked_quo(rhs) {
            Ok(quotient) => quotient,
            Err(err) => panic!("{err} in {self} / {rhs}"),
        }
    }
}

impl Neg for Dec {
    type Output = Dec;

    fn neg(self) -> Dec {
        Self::from_parts(!self.negative, self.mantissa)
    }
}

impl AddAssign for Dec {
    fn add_assign(&mut self, rhs: Dec) {
        *self = *self + rhs;
    }
}

impl SubAssign for Dec {
    fn sub_assign(&mut self, rhs: Dec) {
        *self = *self - rhs;
    }
}

impl Sum for Dec {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Dec::ZERO, |acc, d| acc + d)
    }
}

impl<'a> Sum<&'a Dec> for Dec {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Dec::ZERO, |acc, d| acc + *d)
    }
}
