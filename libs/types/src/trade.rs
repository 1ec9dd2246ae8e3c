//! Trade records
//!
//! A trade record captures one cross between a resting order and the
//! aggressor. The bid/ask slots hold whichever physical order is buying and
//! selling; maker/taker roles are derived from the aggressor side.

use crate::ids::TradeId;
use crate::numeric::{Price, Volume};
use crate::order::{Order, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade state tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeState {
    /// Produced by the match loop
    Matched,
    // Settlement belongs to downstream collaborators; enum room only.
    Settled,
    Failed,
}

/// Record of one match
///
/// Snapshots are taken after the fill is applied, so the embedded orders
/// show post-trade remaining volumes, costs, and fees. The match price is
/// always the maker's price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: TradeId,
    /// Monotonic sequence, replay-stable total order
    pub sequence: u64,

    /// The buying order of this trade
    pub bid_order: Order,
    /// The selling order of this trade
    pub ask_order: Order,

    /// Match price (the maker's price)
    pub price: Price,
    /// Matched volume
    pub volume: Volume,

    /// Which side was the aggressor
    pub taker_side: Side,
    /// Aggressor volume left after this fill; None when exhausted
    pub taker_remaining: Option<Volume>,

    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
    /// Gross cost: price × volume
    pub cost: Decimal,

    pub state: TradeState,
    pub executed_at: i64,
}

impl TradeRecord {
    /// The resting order of this trade
    pub fn maker(&self) -> &Order {
        match self.taker_side {
            Side::Buy => &self.ask_order,
            Side::Sell => &self.bid_order,
        }
    }

    /// The aggressing order of this trade
    pub fn taker(&self) -> &Order {
        match self.taker_side {
            Side::Buy => &self.bid_order,
            Side::Sell => &self.ask_order,
        }
    }

    /// True when this fill exhausted the aggressor
    pub fn taker_exhausted(&self) -> bool {
        self.taker_remaining.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{OrderId, OwnerId};
    use crate::order::Condition;

    fn order(side: Side, price: u64, volume: u64) -> Order {
        Order::new(
            OrderId::new(),
            OwnerId::new("t"),
            side,
            Price::from_u64(price),
            Volume::from_u64(volume),
            Condition::None,
            1,
        )
    }

    fn record(taker_side: Side) -> TradeRecord {
        TradeRecord {
            trade_id: TradeId::new(),
            sequence: 7,
            bid_order: order(Side::Buy, 100, 3),
            ask_order: order(Side::Sell, 100, 5),
            price: Price::from_u64(100),
            volume: Volume::from_u64(3),
            taker_side,
            taker_remaining: None,
            maker_fee: Decimal::ZERO,
            taker_fee: Decimal::new(15, 2),
            cost: Decimal::from(300),
            state: TradeState::Matched,
            executed_at: 2,
        }
    }

    #[test]
    fn test_maker_taker_follow_aggressor_side() {
        let buy_aggresses = record(Side::Buy);
        assert_eq!(buy_aggresses.taker().side, Side::Buy);
        assert_eq!(buy_aggresses.maker().side, Side::Sell);

        let sell_aggresses = record(Side::Sell);
        assert_eq!(sell_aggresses.taker().side, Side::Sell);
        assert_eq!(sell_aggresses.maker().side, Side::Buy);
    }

    #[test]
    fn test_bid_ask_slots_hold_physical_sides() {
        let trade = record(Side::Buy);
        assert_eq!(trade.bid_order.side, Side::Buy);
        assert_eq!(trade.ask_order.side, Side::Sell);
    }

    #[test]
    fn test_gross_cost_matches_price_volume() {
        let trade = record(Side::Buy);
        assert_eq!(trade.cost, trade.volume * trade.price);
    }

    #[test]
    fn test_exhausted_taker() {
        let mut trade = record(Side::Buy);
        assert!(trade.taker_exhausted());

        trade.taker_remaining = Some(Volume::from_u64(2));
        assert!(!trade.taker_exhausted());
    }

    #[test]
    fn test_trade_serialization() {
        let trade = record(Side::Sell);
        let json = serde_json::to_string(&trade).unwrap();
        let deserialized: TradeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deserialized);
    }
}
