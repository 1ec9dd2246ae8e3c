//! Trade execution
//!
//! Turns one cross into a [`TradeRecord`]: assigns the monotonic sequence,
//! computes both fees through the schedule, and files the physical buying
//! and selling orders into the record's bid/ask slots. Snapshots are taken
//! after the fill was applied to both orders.

use rust_decimal::Decimal;
use types::fee::FeeSchedule;
use types::ids::TradeId;
use types::numeric::{Price, Volume};
use types::order::{Order, Side};
use types::trade::{TradeRecord, TradeState};

/// Builds trade records with a replay-stable sequence
#[derive(Debug, Clone)]
pub struct MatchExecutor {
    fees: FeeSchedule,
    sequence: u64,
}

impl MatchExecutor {
    pub fn new(fees: FeeSchedule, starting_sequence: u64) -> Self {
        Self {
            fees,
            sequence: starting_sequence,
        }
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.sequence;
        self.sequence += 1;
        sequence
    }

    /// Record one match between the aggressor and a resting order
    ///
    /// Both snapshots must already reflect this fill; `price` is the
    /// maker's price, `maker_fee`/`taker_fee` the amounts charged for this
    /// fill alone.
    pub fn record(
        &mut self,
        taker: &Order,
        maker: &Order,
        price: Price,
        volume: Volume,
        maker_fee: Decimal,
        taker_fee: Decimal,
        timestamp: i64,
    ) -> TradeRecord {
        debug_assert_ne!(taker.side, maker.side, "a cross needs both sides");

        let (bid_order, ask_order) = match taker.side {
            Side::Buy => (taker.clone(), maker.clone()),
            Side::Sell => (maker.clone(), taker.clone()),
        };

        TradeRecord {
            trade_id: TradeId::new(),
            sequence: self.next_sequence(),
            bid_order,
            ask_order,
            price,
            volume,
            taker_side: taker.side,
            taker_remaining: if taker.is_filled() {
                None
            } else {
                Some(taker.remaining)
            },
            maker_fee,
            taker_fee,
            cost: volume * price,
            state: TradeState::Matched,
            executed_at: timestamp,
        }
    }
}
