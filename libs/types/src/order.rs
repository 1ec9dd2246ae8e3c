//! Order lifecycle types
//!
//! An order is created by the caller (Prepared), admitted by the engine
//! (Listed when resting), mutated in place by matches, and destroyed when
//! filled or cancelled. All transitions happen through the methods here so
//! the volume invariant is checked at every step.

use crate::ids::{FeeClass, OrderId, OwnerId};
use crate::numeric::{Price, Volume};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Execution condition qualifying an order on entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Condition {
    /// Plain limit order: match what crosses, rest the remainder
    #[default]
    None,
    /// Immediate-Or-Cancel: match on entry, cancel any remainder
    IOC,
    /// Book-Or-Cancel: must not cross on entry, rejected if it would
    BOC,
    /// Fill-Or-Kill: fully executable on entry or rejected
    FOK,
}

/// Order status with wire-stable state ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason")]
pub enum OrderStatus {
    /// State 0: created by the caller, not yet admitted
    #[serde(rename = "PREPARED")]
    Prepared,

    /// State 1: resting in the book, untouched
    #[serde(rename = "LISTED")]
    Listed,

    /// State 2: partially matched, remainder live
    #[serde(rename = "MATCHED")]
    Matched,

    /// State 3: remaining volume reached zero (terminal)
    #[serde(rename = "FILLED")]
    Filled,

    /// State 4: cancelled by user or engine (terminal)
    #[serde(rename = "CANCELLED")]
    Cancelled(CancelReason),

    /// State 5: failed validation or a condition check (terminal)
    #[serde(rename = "REJECTED")]
    Rejected(RejectReason),
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled(_) | OrderStatus::Rejected(_)
        )
    }

    /// Get the state id for wire protocol
    pub fn state_id(&self) -> u8 {
        match self {
            OrderStatus::Prepared => 0,
            OrderStatus::Listed => 1,
            OrderStatus::Matched => 2,
            OrderStatus::Filled => 3,
            OrderStatus::Cancelled(_) => 4,
            OrderStatus::Rejected(_) => 5,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Prepared => write!(f, "PREPARED"),
            OrderStatus::Listed => write!(f, "LISTED"),
            OrderStatus::Matched => write!(f, "MATCHED"),
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::Cancelled(_) => write!(f, "CANCELLED"),
            OrderStatus::Rejected(_) => write!(f, "REJECTED"),
        }
    }
}

/// Why a live order was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelReason {
    UserRequested,
    ImmediateOrCancel,
    // Enum room for policies outside the core; no behavior is wired.
    SelfTrade,
    AdminCancel,
}

/// Why an incoming order was rejected before mutating the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    InvalidVolume,
    InvalidPrice,
    DuplicateOrder,
    NotPrepared,
    BookOrCancel,
    FillOrKill,
    ImmediateOrCancel,
    NoLiquidity,
}

/// A single order, mutated in place over its lifecycle
///
/// `remaining` counts down from `volume`; the order is filled exactly when
/// it reaches zero. `cost` and `fee` accumulate per fill and are
/// informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub owner: OwnerId,
    pub fee_class: FeeClass,
    pub side: Side,
    /// Limit price; zero on entry means market
    pub price: Price,
    /// Original volume
    pub volume: Volume,
    /// Volume still unmatched
    pub remaining: Volume,
    /// Cumulative gross notional over all fills
    pub cost: Decimal,
    /// Cumulative fee over all fills
    pub fee: Decimal,
    pub condition: Condition,
    pub status: OrderStatus,
    /// Arrival timestamp, monotonic milliseconds supplied by the caller
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Create a new prepared order
    pub fn new(
        order_id: OrderId,
        owner: OwnerId,
        side: Side,
        price: Price,
        volume: Volume,
        condition: Condition,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id,
            owner,
            fee_class: FeeClass::default(),
            side,
            price,
            volume,
            remaining: volume,
            cost: Decimal::ZERO,
            fee: Decimal::ZERO,
            condition,
            status: OrderStatus::Prepared,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Attach a fee class (pass-through)
    pub fn with_fee_class(mut self, fee_class: FeeClass) -> Self {
        self.fee_class = fee_class;
        self
    }

    /// True when the order was submitted with a zero price
    pub fn is_market(&self) -> bool {
        self.price.is_zero()
    }

    /// An order is filled iff its remaining volume is zero
    pub fn is_filled(&self) -> bool {
        self.remaining.is_zero()
    }

    /// True while the order rests in the book
    pub fn is_active(&self) -> bool {
        matches!(self.status, OrderStatus::Listed | OrderStatus::Matched)
    }

    /// Volume matched so far
    pub fn filled_volume(&self) -> Volume {
        self.volume - self.remaining
    }

    /// Volume invariant: remaining never exceeds the original volume, and
    /// the Filled status coincides with remaining == 0.
    pub fn check_invariant(&self) -> bool {
        self.remaining.as_decimal() <= self.volume.as_decimal()
            && (self.status != OrderStatus::Filled || self.remaining.is_zero())
    }

    /// Mark the order as resting in the book
    pub fn list(&mut self, timestamp: i64) {
        debug_assert!(!self.status.is_terminal(), "cannot list a terminal order");
        self.status = OrderStatus::Listed;
        self.updated_at = timestamp;
    }

    /// Apply a fill: decrement remaining, accumulate cost and fee
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining volume
    pub fn fill(&mut self, volume: Volume, price: Price, fee: Decimal, timestamp: i64) {
        assert!(
            volume.as_decimal() <= self.remaining.as_decimal(),
            "Fill would exceed remaining volume"
        );

        self.remaining -= volume;
        self.cost += volume * price;
        self.fee += fee;
        self.status = if self.remaining.is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::Matched
        };
        self.updated_at = timestamp;

        debug_assert!(self.check_invariant(), "invariant violated after fill");
    }

    /// Cancel the order
    ///
    /// # Panics
    /// Panics if the order is already in a terminal state
    pub fn cancel(&mut self, reason: CancelReason, timestamp: i64) {
        assert!(!self.status.is_terminal(), "Cannot cancel terminal order");

        self.status = OrderStatus::Cancelled(reason);
        self.updated_at = timestamp;
    }

    /// Reject the order before it touches the book
    pub fn reject(&mut self, reason: RejectReason, timestamp: i64) {
        self.status = OrderStatus::Rejected(reason);
        self.updated_at = timestamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy(volume: u64) -> Order {
        Order::new(
            OrderId::new(),
            OwnerId::new("t"),
            Side::Buy,
            Price::from_u64(100),
            Volume::from_u64(volume),
            Condition::None,
            1,
        )
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_new_order_is_prepared() {
        let order = buy(5);
        assert_eq!(order.status, OrderStatus::Prepared);
        assert_eq!(order.remaining, order.volume);
        assert!(order.check_invariant());
        assert!(!order.is_market());
        assert!(!order.is_filled());
    }

    #[test]
    fn test_zero_price_is_market() {
        let mut order = buy(5);
        order.price = Price::ZERO;
        assert!(order.is_market());
    }

    #[test]
    fn test_fill_accumulates_cost_and_fee() {
        let mut order = buy(5);
        order.fill(
            Volume::from_u64(2),
            Price::from_u64(100),
            Decimal::new(2, 1),
            2,
        );

        assert_eq!(order.status, OrderStatus::Matched);
        assert_eq!(order.remaining, Volume::from_u64(3));
        assert_eq!(order.filled_volume(), Volume::from_u64(2));
        assert_eq!(order.cost, Decimal::from(200));
        assert_eq!(order.fee, Decimal::new(2, 1));
        assert!(order.check_invariant());

        order.fill(
            Volume::from_u64(3),
            Price::from_u64(101),
            Decimal::new(3, 1),
            3,
        );
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.is_filled());
        assert_eq!(order.cost, Decimal::from(503));
        assert_eq!(order.fee, Decimal::new(5, 1));
    }

    #[test]
    #[should_panic(expected = "Fill would exceed remaining volume")]
    fn test_overfill_panics() {
        let mut order = buy(1);
        order.fill(Volume::from_u64(2), Price::from_u64(100), Decimal::ZERO, 2);
    }

    #[test]
    fn test_cancel_sets_reason() {
        let mut order = buy(5);
        order.list(2);
        assert!(order.is_active());

        order.cancel(CancelReason::UserRequested, 3);
        assert_eq!(
            order.status,
            OrderStatus::Cancelled(CancelReason::UserRequested)
        );
        assert!(order.status.is_terminal());
        assert!(!order.is_active());
    }

    #[test]
    #[should_panic(expected = "Cannot cancel terminal order")]
    fn test_cancel_terminal_panics() {
        let mut order = buy(1);
        order.fill(Volume::from_u64(1), Price::from_u64(100), Decimal::ZERO, 2);
        order.cancel(CancelReason::UserRequested, 3);
    }

    #[test]
    fn test_reject_sets_reason() {
        let mut order = buy(5);
        order.reject(RejectReason::BookOrCancel, 2);
        assert_eq!(order.status, OrderStatus::Rejected(RejectReason::BookOrCancel));
        assert!(order.status.is_terminal());
    }

    #[test]
    fn test_state_ids_are_wire_stable() {
        assert_eq!(OrderStatus::Prepared.state_id(), 0);
        assert_eq!(OrderStatus::Listed.state_id(), 1);
        assert_eq!(OrderStatus::Matched.state_id(), 2);
        assert_eq!(OrderStatus::Filled.state_id(), 3);
        assert_eq!(
            OrderStatus::Cancelled(CancelReason::UserRequested).state_id(),
            4
        );
        assert_eq!(
            OrderStatus::Rejected(RejectReason::NoLiquidity).state_id(),
            5
        );
    }

    #[test]
    fn test_order_serialization() {
        let order = buy(5).with_fee_class(FeeClass::new("vip"));
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(order, deserialized);
    }
}
