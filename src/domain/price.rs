//! Two-decimal currency type backed by rust_decimal.
//!
//! Prices cross the wire as strings; all comparisons happen on the decimal
//! value after rounding to two places, never on the string form.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A currency amount with two-decimal semantics.
///
/// Every constructor rounds to two decimal places, so equality and ordering
/// are stable against formatting artifacts like `100` vs `100.00`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Price(Decimal);

impl Price {
    /// Create a Price from a raw decimal, rounding to two places.
    pub fn new(value: Decimal) -> Self {
        Price(value.round_dp(2))
    }

    /// Parse a Price from a decimal string.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn parse(s: &str) -> Result<Self, rust_decimal::Error> {
        Decimal::from_str(s).map(Self::new)
    }

    /// Format for the remote API: exactly two decimal places.
    pub fn to_wire(&self) -> String {
        let mut v = self.0;
        v.rescale(2);
        v.to_string()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.0.is_zero() && self.0.is_sign_positive()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Decimal> for Price {
    fn from(value: Decimal) -> Self {
        Price::new(value)
    }
}

impl std::ops::Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price::new(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Price {
    type Output = Price;

    fn sub(self, rhs: Price) -> Price {
        Price::new(self.0 - rhs.0)
    }
}
