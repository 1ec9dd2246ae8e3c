//! Order book infrastructure module
//!
//! Three views over the same resting liquidity, kept in lock-step: an
//! ordered index of distinct prices, a FIFO level per price, and a lazily
//! sorted price cache for cumulative-liquidity queries.

pub mod order_book;
pub mod price_level;
pub mod priority_index;
pub mod sorted_cache;

pub use order_book::{DepthView, OrderBook, OrderLocator};
pub use price_level::{LevelHandle, PriceLevel};
pub use priority_index::{Orientation, PriorityIndex};
pub use sorted_cache::SortedPriceCache;

use thiserror::Error;
use types::ids::OrderId;
use types::numeric::Price;

/// Structural failures inside the book
///
/// These indicate caller misuse (duplicates, unknown ids) or, for
/// [`BookError::Desync`], a broken cross-view invariant. The engine folds
/// the latter into a SystemError result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    #[error("price {0} already indexed")]
    DuplicatePrice(Price),

    #[error("order {0} already booked")]
    DuplicateOrder(OrderId),

    #[error("order {0} not booked")]
    UnknownOrder(OrderId),

    #[error("no level at price {0}")]
    MissingLevel(Price),

    #[error("book views desynchronized: {0}")]
    Desync(String),
}
