//! Crossing detection
//!
//! A trade is possible when the aggressor's price reaches the resting
//! price: buy limit ≥ ask price, or sell limit ≤ bid price. Both predicates
//! are non-strict, so price equality crosses. That also makes equality a
//! reject for Book-Or-Cancel entry.

use types::numeric::Price;
use types::order::Side;

/// Does an aggressor at `taker_price` cross a resting order at
/// `resting_price`?
pub fn crosses(taker_side: Side, taker_price: Price, resting_price: Price) -> bool {
    match taker_side {
        Side::Buy => taker_price >= resting_price,
        Side::Sell => taker_price <= resting_price,
    }
}

/// Book-Or-Cancel entry test: would an order at `price` take liquidity
/// against the best opposite price, were it admitted right now?
pub fn would_cross(side: Side, price: Price, best_opposite: Option<Price>) -> bool {
    match best_opposite {
        Some(resting) => crosses(side, price, resting),
        None => false,
    }
}
