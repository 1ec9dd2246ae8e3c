//! Matching engine core
//!
//! The entry point for order flow. Normalizes market orders, runs the
//! BOC/FOK prechecks, drives the match loop against the opposite side, and
//! books the residual of plain limit orders. Every public operation
//! terminates in a [`ResultCode`]; rejections never mutate the book.

use tracing::{debug, trace, warn};

use types::errors::{OrderError, ResultCode};
use types::ids::OrderId;
use types::numeric::{Price, Volume};
use types::order::{CancelReason, Condition, Order, OrderStatus, RejectReason, Side};
use types::trade::TradeRecord;

use crate::book::{BookError, DepthView, OrderBook};
use crate::config::EngineConfig;
use crate::matching::{crossing, MatchExecutor};

/// Terminal outcome of a submission
///
/// `order` carries the submitted order back whenever it did not rest
/// (filled, cancelled, or rejected); a resting order lives in the book and
/// is reachable through [`MatchingEngine::find_order`].
#[derive(Debug, Clone)]
pub struct SubmitResult {
    pub code: ResultCode,
    pub trades: Vec<TradeRecord>,
    pub order: Option<Order>,
}

impl SubmitResult {
    fn rejected(code: ResultCode, order: Order) -> Self {
        Self {
            code,
            trades: Vec::new(),
            order: Some(order),
        }
    }
}

/// Terminal outcome of a cancellation
#[derive(Debug, Clone)]
pub struct CancelResult {
    pub code: ResultCode,
    pub order: Option<Order>,
}

/// Single-symbol matching engine
///
/// Owns the book exclusively; no operation suspends or yields. Timestamps
/// are monotonic milliseconds supplied by the caller.
#[derive(Debug)]
pub struct MatchingEngine {
    config: EngineConfig,
    book: OrderBook,
    executor: MatchExecutor,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        let executor = MatchExecutor::new(config.fee_schedule(), 0);
        Self {
            config,
            book: OrderBook::new(),
            executor,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access to the book, mainly for audits and tests
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    // === Order entry ===

    /// Submit an order
    ///
    /// The full lifecycle runs to completion before this returns: condition
    /// checks, the match loop, and residual booking for limit orders.
    pub fn add_order(&mut self, mut order: Order, timestamp: i64) -> SubmitResult {
        if let Err(error) = self.validate(&order) {
            warn!(%error, order_id = %order.order_id, "order failed validation");
            let reason = match error {
                OrderError::InvalidVolume(_) => RejectReason::InvalidVolume,
                OrderError::InvalidPrice(_) => RejectReason::InvalidPrice,
                OrderError::Duplicate { .. } => RejectReason::DuplicateOrder,
                _ => RejectReason::NotPrepared,
            };
            order.reject(reason, timestamp);
            return SubmitResult::rejected(ResultCode::OrderInvalid, order);
        }

        let is_market = order.is_market();
        if is_market && order.condition == Condition::None {
            order.condition = Condition::IOC;
        }
        // Crossing sentinel for this invocation only; never persisted and
        // never admitted into the book.
        let effective_price = if is_market {
            match order.side {
                Side::Buy => Price::MAX,
                Side::Sell => Price::ZERO,
            }
        } else {
            order.price
        };

        match order.condition {
            Condition::BOC => {
                let best_opposite = self.book.best_price(order.side.opposite());
                if crossing::would_cross(order.side, effective_price, best_opposite) {
                    debug!(order_id = %order.order_id, "BOC order would take liquidity");
                    order.reject(RejectReason::BookOrCancel, timestamp);
                    return SubmitResult::rejected(ResultCode::BOCCannotBook, order);
                }
            }
            Condition::FOK => {
                if !self.book.can_fill(order.side, order.remaining, order.price) {
                    debug!(order_id = %order.order_id, "FOK order cannot be fully filled");
                    order.reject(RejectReason::FillOrKill, timestamp);
                    return SubmitResult::rejected(ResultCode::FOKCannotFill, order);
                }
            }
            Condition::None | Condition::IOC => {}
        }

        let trades = match self.match_loop(&mut order, effective_price, timestamp) {
            Ok(trades) => trades,
            Err(error) => {
                warn!(%error, order_id = %order.order_id, "book desynchronized during matching");
                return SubmitResult {
                    code: ResultCode::SystemError,
                    trades: Vec::new(),
                    order: Some(order),
                };
            }
        };

        if order.condition == Condition::FOK && !order.is_filled() {
            // feasibility said yes; the book can no longer be trusted
            warn!(order_id = %order.order_id, "FOK passed precheck but did not fill");
            return SubmitResult {
                code: ResultCode::SystemError,
                trades,
                order: Some(order),
            };
        }

        if is_market {
            if trades.is_empty() {
                debug!(order_id = %order.order_id, "market order found no liquidity");
                order.reject(RejectReason::NoLiquidity, timestamp);
                return SubmitResult::rejected(ResultCode::MarketNoLiquidity, order);
            }
            if !order.is_filled() {
                order.cancel(CancelReason::ImmediateOrCancel, timestamp);
            }
            return SubmitResult {
                code: ResultCode::OrderAccepted,
                trades,
                order: Some(order),
            };
        }

        match order.condition {
            Condition::IOC => {
                if trades.is_empty() {
                    order.reject(RejectReason::ImmediateOrCancel, timestamp);
                    return SubmitResult::rejected(ResultCode::IOCCannotFill, order);
                }
                if !order.is_filled() {
                    order.cancel(CancelReason::ImmediateOrCancel, timestamp);
                }
                SubmitResult {
                    code: ResultCode::OrderAccepted,
                    trades,
                    order: Some(order),
                }
            }
            Condition::FOK => SubmitResult {
                code: ResultCode::OrderAccepted,
                trades,
                order: Some(order),
            },
            Condition::None | Condition::BOC => {
                if order.is_filled() {
                    SubmitResult {
                        code: ResultCode::OrderAccepted,
                        trades,
                        order: Some(order),
                    }
                } else {
                    order.list(timestamp);
                    debug!(
                        order_id = %order.order_id,
                        price = %order.price,
                        remaining = %order.remaining,
                        "order resting"
                    );
                    if let Err(error) = self.book.add(order, timestamp) {
                        warn!(%error, "failed to book residual");
                        return SubmitResult {
                            code: ResultCode::SystemError,
                            trades,
                            order: None,
                        };
                    }
                    SubmitResult {
                        code: ResultCode::OrderAccepted,
                        trades,
                        order: None,
                    }
                }
            }
        }
    }

    /// Cancel a resting order by id
    pub fn cancel_order(&mut self, order_id: &OrderId, timestamp: i64) -> CancelResult {
        match self.book.remove(order_id, timestamp) {
            Some(mut order) => {
                order.cancel(CancelReason::UserRequested, timestamp);
                debug!(%order_id, "cancel accepted");
                CancelResult {
                    code: ResultCode::CancelAccepted,
                    order: Some(order),
                }
            }
            None => {
                debug!(%order_id, "cancel for unknown order");
                CancelResult {
                    code: ResultCode::OrderNotExists,
                    order: None,
                }
            }
        }
    }

    // === Queries ===

    pub fn best_bid_price(&self) -> Option<Price> {
        self.book.best_bid_price()
    }

    pub fn best_ask_price(&self) -> Option<Price> {
        self.book.best_ask_price()
    }

    pub fn best_bid_volume(&self) -> Option<Volume> {
        self.book.best_bid_volume()
    }

    pub fn best_ask_volume(&self) -> Option<Volume> {
        self.book.best_ask_volume()
    }

    pub fn bid_level_count(&self) -> usize {
        self.book.bid_level_count()
    }

    pub fn ask_level_count(&self) -> usize {
        self.book.ask_level_count()
    }

    pub fn total_orders(&self) -> usize {
        self.book.total_orders()
    }

    /// Level aggregate at an exact price, if such a level exists
    pub fn depth_at(&self, price: Price) -> Option<DepthView> {
        self.book.depth_at(price)
    }

    /// Resolve a resting order by id
    pub fn find_order(&self, order_id: &OrderId) -> Option<&Order> {
        self.book.find(order_id)
    }

    // === Internals ===

    fn validate(&self, order: &Order) -> Result<(), OrderError> {
        if order.status != OrderStatus::Prepared {
            return Err(OrderError::NotPrepared {
                status: order.status.to_string(),
            });
        }
        if order.volume.is_zero() {
            return Err(OrderError::InvalidVolume(
                "volume must be positive".to_string(),
            ));
        }
        if order.remaining != order.volume {
            return Err(OrderError::InvalidVolume(
                "remaining diverges from original volume".to_string(),
            ));
        }
        if self.book.contains(&order.order_id) {
            return Err(OrderError::Duplicate {
                order_id: order.order_id.to_string(),
            });
        }
        Ok(())
    }

    /// Sweep the opposite side while the aggressor crosses and has volume
    ///
    /// Each iteration fills against the front order at the best opposite
    /// price, at that maker's price, and evicts the maker once exhausted.
    fn match_loop(
        &mut self,
        order: &mut Order,
        effective_price: Price,
        timestamp: i64,
    ) -> Result<Vec<TradeRecord>, BookError> {
        let mut trades = Vec::new();
        let opposite = order.side.opposite();

        while !order.is_filled() {
            let Some(resting_price) = self.book.best_price(opposite) else {
                break;
            };
            if !crossing::crosses(order.side, effective_price, resting_price) {
                break;
            }
            let maker_id = self
                .book
                .best_order_id(opposite)
                .ok_or(BookError::MissingLevel(resting_price))?;

            let maker = self
                .book
                .find_mut(&maker_id)
                .ok_or(BookError::UnknownOrder(maker_id))?;
            let volume = order.remaining.min(maker.remaining);
            let maker_fee = self
                .executor
                .fees()
                .maker_fee(maker.side, resting_price, volume);
            let taker_fee = self
                .executor
                .fees()
                .taker_fee(order.side, resting_price, volume);

            maker.fill(volume, resting_price, maker_fee, timestamp);
            let maker_snapshot = maker.clone();
            order.fill(volume, resting_price, taker_fee, timestamp);

            self.book.fill_after_match(&maker_id, volume, timestamp)?;

            trace!(
                taker = %order.order_id,
                maker = %maker_id,
                price = %resting_price,
                %volume,
                "trade executed"
            );
            trades.push(self.executor.record(
                order,
                &maker_snapshot,
                resting_price,
                volume,
                maker_fee,
                taker_fee,
                timestamp,
            ));
        }
        Ok(trades)
    }
}
