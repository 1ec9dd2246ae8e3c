//! Fixed-point decimal types for prices and volumes
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Cumulative volumes must be exact and spread comparisons must not suffer
//! ULP error, so binary floats are ruled out throughout.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Limit price with fixed-point decimal representation.
///
/// Never negative. Zero is legal and carries meaning: an order submitted with
/// a zero price is a market order on entry. Serialized as string to prevent
/// JSON number precision loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// The zero price (market sentinel on entry, floor sentinel for sells).
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Infinite-aggression sentinel used when crossing a market buy.
    /// Never admitted into the book.
    pub const MAX: Price = Price(Decimal::MAX);

    /// Create a new Price from a Decimal
    ///
    /// # Panics
    /// Panics if the price is negative
    pub fn new(value: Decimal) -> Self {
        assert!(value >= Decimal::ZERO, "Price cannot be negative");
        Self(value)
    }

    /// Try to create a Price, returning None if negative
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create from integer (for testing/convenience)
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Create from string
    pub fn from_str(s: &str) -> Result<Self, rust_decimal::Error> {
        let decimal = Decimal::from_str(s)?;
        Ok(Self::new(decimal))
    }

    /// Get the inner decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// True for the zero price (market order signal on entry)
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Round to the given decimal places, half away from zero
    pub fn round_dp(&self, dp: u32) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl Mul<Volume> for Price {
    type Output = Decimal;

    fn mul(self, rhs: Volume) -> Self::Output {
        self.0 * rhs.as_decimal()
    }
}

// String serde preserves precision across JSON boundaries
impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let decimal = Decimal::from_str(&s).map_err(serde::de::Error::custom)?;
        Self::try_new(decimal).ok_or_else(|| serde::de::Error::custom("Price cannot be negative"))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order volume with fixed-point decimal representation.
///
/// Never negative. Zero is legal: an order whose remaining volume reaches
/// zero is filled. Serialized as string to prevent JSON number precision
/// loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Volume(Decimal);

impl Volume {
    /// The zero volume.
    pub const ZERO: Volume = Volume(Decimal::ZERO);

    /// Create a new Volume from a Decimal
    ///
    /// # Panics
    /// Panics if the volume is negative
    pub fn new(value: Decimal) -> Self {
        assert!(value >= Decimal::ZERO, "Volume cannot be negative");
        Self(value)
    }

    /// Try to create a Volume, returning None if negative
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create from integer (for testing/convenience)
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Create from string
    pub fn from_str(s: &str) -> Result<Self, rust_decimal::Error> {
        let decimal = Decimal::from_str(s)?;
        Ok(Self::new(decimal))
    }

    /// Get the inner decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Check if volume is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Volume {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Volume {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        assert!(self.0 >= rhs.0, "Volume subtraction would go negative");
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Volume {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Volume {
    fn sub_assign(&mut self, rhs: Self) {
        assert!(self.0 >= rhs.0, "Volume subtraction would go negative");
        self.0 -= rhs.0;
    }
}

impl Mul<Price> for Volume {
    type Output = Decimal;

    fn mul(self, rhs: Price) -> Self::Output {
        self.0 * rhs.as_decimal()
    }
}

impl Mul<Decimal> for Volume {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Self::Output {
        self.0 * rhs
    }
}

impl Serialize for Volume {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Volume {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let decimal = Decimal::from_str(&s).map_err(serde::de::Error::custom)?;
        Self::try_new(decimal).ok_or_else(|| serde::de::Error::custom("Volume cannot be negative"))
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
