// 1.0: all the primitives live here. identifiers, signed units, money, timestamps.
// each is a newtype so the compiler catches units/value mixups.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// Decimal places kept by fraction deduction and price-per-unit division.
pub const ROUNDING_SCALE: u32 = 5;

// half-up at 5 dp. ties go away from zero, so -0.000005 becomes -0.00001.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(ROUNDING_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstrumentId(String);

impl InstrumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

// Buy = units flow into the customer. Sell = units flow out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

// 1.1: signed units: positive = buy, negative = sell. exact decimal, never rounded implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Units(Decimal);

impl Units {
    pub fn new(units: Decimal) -> Self {
        Self(units)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn abs(&self) -> Decimal {
        self.0.abs()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_buy(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_sell(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn direction(&self) -> Option<Direction> {
        if self.is_buy() {
            Some(Direction::Buy)
        } else if self.is_sell() {
            Some(Direction::Sell)
        } else {
            None
        }
    }

    // zero and whole numbers (either sign) carry no fraction.
    pub fn is_integer(&self) -> bool {
        self.0.fract().is_zero()
    }

    // 1.1.1: remainder toward zero, keeps the sign of the units. -15.8 -> -0.8
    pub fn fraction(&self) -> Units {
        Self(self.0 % Decimal::ONE)
    }

    // integer portion by subtraction, not rounding.
    pub fn whole(&self) -> Units {
        self.sub(self.fraction())
    }

    pub fn add(&self, other: Units) -> Self {
        Self(self.0 + other.0)
    }

    pub fn sub(&self, other: Units) -> Self {
        Self(self.0 - other.0)
    }

    /// Clamp into the closed range between zero and `bound`, on `bound`'s side of zero.
    pub fn clamp_towards_zero(&self, bound: Units) -> Self {
        match bound.direction() {
            None => Self::zero(),
            Some(dir) if self.direction() != Some(dir) => Self::zero(),
            Some(_) if self.abs() > bound.abs() => bound,
            Some(_) => *self,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sum for Units {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, u| acc.add(u))
    }
}

// 1.2: money. cash balances, per-unit prices and total consideration all use this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quote(Decimal);

impl Quote {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn add(&self, other: Quote) -> Self {
        Self(self.0 + other.0)
    }

    pub fn sub(&self, other: Quote) -> Self {
        Self(self.0 - other.0)
    }

    pub fn mul(&self, factor: Decimal) -> Self {
        Self(self.0 * factor)
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for Quote {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quote {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl Sum for Quote {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, q| acc.add(q))
    }
}

impl<'a> Sum<&'a Quote> for Quote {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, q| acc.add(*q))
    }
}

// 1.3: millisecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }
}
