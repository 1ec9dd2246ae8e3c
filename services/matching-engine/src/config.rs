//! Engine configuration
//!
//! Supplied once at construction and immutable thereafter.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::fee::FeeSchedule;

/// Immutable engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Tick size, reserved for future price validation
    pub step_size: Decimal,
    /// Decimal places for fee rounding
    pub price_precision: u32,
    pub maker_fee_rate: Decimal,
    pub taker_fee_rate: Decimal,
}

impl EngineConfig {
    /// Create a new configuration
    ///
    /// # Panics
    /// Panics if the step size or either fee rate is negative
    pub fn new(
        step_size: Decimal,
        price_precision: u32,
        maker_fee_rate: Decimal,
        taker_fee_rate: Decimal,
    ) -> Self {
        assert!(step_size >= Decimal::ZERO, "step size cannot be negative");
        assert!(
            maker_fee_rate >= Decimal::ZERO && taker_fee_rate >= Decimal::ZERO,
            "fee rates cannot be negative"
        );
        Self {
            step_size,
            price_precision,
            maker_fee_rate,
            taker_fee_rate,
        }
    }

    /// The fee schedule this configuration implies
    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule::new(self.maker_fee_rate, self.taker_fee_rate, self.price_precision)
    }
}

impl Default for EngineConfig {
    /// Fee-free defaults, 8 decimal places
    fn default() -> Self {
        Self::new(Decimal::ZERO, 8, Decimal::ZERO, Decimal::ZERO)
    }
}
