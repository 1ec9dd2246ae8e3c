//! Maker/taker fee schedule
//!
//! Fee bases follow the usual exchange convention: the buy side of a trade
//! pays on the filled volume (it receives base asset), the sell side pays on
//! the filled notional (it receives quote asset). Fees are rounded half away
//! from zero to the configured price precision.

use crate::numeric::{Price, Volume};
use crate::order::Side;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Immutable fee configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    maker_rate: Decimal,
    taker_rate: Decimal,
    /// Decimal places for fee rounding
    precision: u32,
}

impl FeeSchedule {
    /// Create a new fee schedule
    ///
    /// # Panics
    /// Panics if either rate is negative
    pub fn new(maker_rate: Decimal, taker_rate: Decimal, precision: u32) -> Self {
        assert!(maker_rate >= Decimal::ZERO, "maker rate cannot be negative");
        assert!(taker_rate >= Decimal::ZERO, "taker rate cannot be negative");
        Self {
            maker_rate,
            taker_rate,
            precision,
        }
    }

    /// Zero-rate schedule (useful for tests and fee-free venues)
    pub fn free() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO, 8)
    }

    pub fn maker_rate(&self) -> Decimal {
        self.maker_rate
    }

    pub fn taker_rate(&self) -> Decimal {
        self.taker_rate
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Fee owed by the maker of a fill, given the side the maker traded on
    pub fn maker_fee(&self, maker_side: Side, price: Price, volume: Volume) -> Decimal {
        self.fee(maker_side, self.maker_rate, price, volume)
    }

    /// Fee owed by the taker of a fill, given the side the taker traded on
    pub fn taker_fee(&self, taker_side: Side, price: Price, volume: Volume) -> Decimal {
        self.fee(taker_side, self.taker_rate, price, volume)
    }

    fn fee(&self, side: Side, rate: Decimal, price: Price, volume: Volume) -> Decimal {
        let base = match side {
            Side::Buy => volume.as_decimal(),
            Side::Sell => volume * price,
        };
        (base * rate).round_dp_with_strategy(self.precision, RoundingStrategy::MidpointAwayFromZero)
    }
}
