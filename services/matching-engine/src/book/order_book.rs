//! The complete order book: two sides plus the global order index
//!
//! Each side composes three views that must stay in lock-step through every
//! mutation: a [`PriorityIndex`] over the distinct prices (O(1) best-price
//! peek), a price→[`PriceLevel`] map (FIFO queues with cached volume), and
//! a [`SortedPriceCache`] (cumulative-liquidity walks). Globally the book
//! maps every resting order id to an [`OrderLocator`] so cancellation needs
//! nothing but the id.

use std::collections::HashMap;

use rust_decimal::Decimal;
use types::ids::OrderId;
use types::numeric::{Price, Volume};
use types::order::{Order, Side};

use super::price_level::{LevelHandle, PriceLevel};
use super::priority_index::{Orientation, PriorityIndex};
use super::sorted_cache::SortedPriceCache;
use super::BookError;
use crate::matching::crossing;

/// Where a resting order lives: side, price, and the stable FIFO handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLocator {
    pub side: Side,
    pub price: Price,
    pub handle: LevelHandle,
}

/// Aggregate view of one level, as returned by depth queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthView {
    pub price: Price,
    pub volume: Volume,
    pub last_change: i64,
}

/// One side of the book
#[derive(Debug, Clone)]
struct BookSide {
    index: PriorityIndex,
    levels: HashMap<Price, PriceLevel>,
    cache: SortedPriceCache,
}

impl BookSide {
    fn new(side: Side) -> Self {
        let (orientation, descending) = match side {
            Side::Buy => (Orientation::MaxFirst, true),
            Side::Sell => (Orientation::MinFirst, false),
        };
        Self {
            index: PriorityIndex::new(orientation),
            levels: HashMap::new(),
            cache: SortedPriceCache::new(descending),
        }
    }

    fn best_price(&self) -> Option<Price> {
        self.index.peek()
    }

    fn best_level(&self) -> Option<&PriceLevel> {
        self.best_price().and_then(|price| self.levels.get(&price))
    }

    /// Push an order into its level, creating the level (and updating the
    /// index and cache) when the price is new.
    fn insert(&mut self, order: Order, timestamp: i64) -> Result<LevelHandle, BookError> {
        let price = order.price;
        let level = match self.levels.entry(price) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                self.index.insert(price)?;
                self.cache.mark_dirty();
                entry.insert(PriceLevel::new(price, timestamp))
            }
        };
        Ok(level.push_back(order, timestamp))
    }

    /// Unlink an order; destroys the level when it empties.
    fn remove(
        &mut self,
        price: Price,
        handle: LevelHandle,
        timestamp: i64,
    ) -> Result<Order, BookError> {
        let level = self
            .levels
            .get_mut(&price)
            .ok_or(BookError::MissingLevel(price))?;
        let order = level
            .remove(handle, timestamp)
            .ok_or_else(|| BookError::Desync(format!("stale handle at price {price}")))?;

        if level.is_empty() {
            self.levels.remove(&price);
            self.index.remove(&price);
            self.cache.mark_dirty();
        }
        Ok(order)
    }

    /// Cumulative-liquidity walk: can `volume` be exhausted against this
    /// side without crossing past `limit`? A zero limit disables the price
    /// gate (market feasibility).
    ///
    /// `taker_side` is the side of the order asking, i.e. the opposite of
    /// this side. Rebuilds the cache iff dirty.
    fn can_fill(&mut self, taker_side: Side, volume: Volume, limit: Price) -> bool {
        if self.cache.is_dirty() {
            self.cache.rebuild(self.levels.keys().copied());
        }

        let mut cumulative = Decimal::ZERO;
        for price in self.cache.prices() {
            if !limit.is_zero() && !crossing::crosses(taker_side, limit, *price) {
                break;
            }
            if let Some(level) = self.levels.get(price) {
                cumulative += level.total_volume().as_decimal();
            }
            if cumulative >= volume.as_decimal() {
                return true;
            }
        }
        false
    }

    /// Top `depth` levels in priority order
    fn depth(&self, depth: usize) -> Vec<(Price, Volume)> {
        let mut keys: Vec<Price> = self.levels.keys().copied().collect();
        if self.cache.descending() {
            keys.sort_unstable_by(|a, b| b.cmp(a));
        } else {
            keys.sort_unstable();
        }
        keys.into_iter()
            .take(depth)
            .map(|price| (price, self.levels[&price].total_volume()))
            .collect()
    }

    fn validate(&self) -> Result<(), BookError> {
        self.index.validate()?;

        // index keys == level keys
        if self.index.len() != self.levels.len() {
            return Err(BookError::Desync(format!(
                "index holds {} prices for {} levels",
                self.index.len(),
                self.levels.len()
            )));
        }
        for price in self.levels.keys() {
            if !self.index.contains(price) {
                return Err(BookError::Desync(format!("level {price} missing from index")));
            }
        }

        // levels are non-empty and internally consistent
        for (price, level) in &self.levels {
            if level.is_empty() {
                return Err(BookError::Desync(format!("empty level retained at {price}")));
            }
            let sum = level
                .iter()
                .fold(Volume::ZERO, |acc, order| acc + order.remaining);
            if sum != level.total_volume() {
                return Err(BookError::Desync(format!(
                    "level {price} caches {} but holds {}",
                    level.total_volume(),
                    sum
                )));
            }
        }

        // a clean cache equals the sorted level keys
        if !self.cache.is_dirty() {
            let mut keys: Vec<Price> = self.levels.keys().copied().collect();
            if self.cache.descending() {
                keys.sort_unstable_by(|a, b| b.cmp(a));
            } else {
                keys.sort_unstable();
            }
            if self.cache.prices() != keys.as_slice() {
                return Err(BookError::Desync(
                    "clean cache disagrees with level keys".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Both sides plus the id → locator map
#[derive(Debug, Clone)]
pub struct OrderBook {
    bids: BookSide,
    asks: BookSide,
    locators: HashMap<OrderId, OrderLocator>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            locators: HashMap::new(),
        }
    }

    fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    // === Mutation ===

    /// Rest an order at the back of its price level
    pub fn add(&mut self, order: Order, timestamp: i64) -> Result<(), BookError> {
        if self.locators.contains_key(&order.order_id) {
            return Err(BookError::DuplicateOrder(order.order_id));
        }

        let order_id = order.order_id;
        let side = order.side;
        let price = order.price;
        let handle = self.side_mut(side).insert(order, timestamp)?;
        self.locators.insert(
            order_id,
            OrderLocator {
                side,
                price,
                handle,
            },
        );

        debug_assert!(self.check_invariants().is_ok());
        Ok(())
    }

    /// Remove a resting order by id; returns it, or None if unknown
    pub fn remove(&mut self, order_id: &OrderId, timestamp: i64) -> Option<Order> {
        let locator = self.locators.remove(order_id)?;
        let removed = self
            .side_mut(locator.side)
            .remove(locator.price, locator.handle, timestamp);

        debug_assert!(removed.is_ok(), "locator resolved but level removal failed");
        debug_assert!(self.check_invariants().is_ok());
        removed.ok()
    }

    /// After the engine decremented a resting order in place: adjust the
    /// level total and, if the order is now filled, evict it entirely.
    ///
    /// Returns whether the order was evicted.
    pub fn fill_after_match(
        &mut self,
        order_id: &OrderId,
        matched_volume: Volume,
        timestamp: i64,
    ) -> Result<bool, BookError> {
        let locator = *self
            .locators
            .get(order_id)
            .ok_or(BookError::UnknownOrder(*order_id))?;

        let level = self
            .side_mut(locator.side)
            .levels
            .get_mut(&locator.price)
            .ok_or(BookError::MissingLevel(locator.price))?;
        level.reduce(matched_volume, timestamp);
        let filled = level
            .get(locator.handle)
            .ok_or_else(|| BookError::Desync(format!("stale handle for {order_id}")))?
            .is_filled();

        if filled {
            self.remove(order_id, timestamp)
                .ok_or_else(|| BookError::Desync(format!("eviction lost {order_id}")))?;
        } else {
            debug_assert!(self.check_invariants().is_ok());
        }
        Ok(filled)
    }

    // === Lookup ===

    /// Resolve a resting order by id
    pub fn find(&self, order_id: &OrderId) -> Option<&Order> {
        let locator = self.locators.get(order_id)?;
        self.side(locator.side)
            .levels
            .get(&locator.price)?
            .get(locator.handle)
    }

    pub fn find_mut(&mut self, order_id: &OrderId) -> Option<&mut Order> {
        let locator = *self.locators.get(order_id)?;
        self.side_mut(locator.side)
            .levels
            .get_mut(&locator.price)?
            .get_mut(locator.handle)
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.locators.contains_key(order_id)
    }

    // === Peeks ===

    pub fn best_price(&self, side: Side) -> Option<Price> {
        self.side(side).best_price()
    }

    pub fn best_bid_price(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask_price(&self) -> Option<Price> {
        self.asks.best_price()
    }

    pub fn best_bid_volume(&self) -> Option<Volume> {
        self.bids.best_level().map(|level| level.total_volume())
    }

    pub fn best_ask_volume(&self) -> Option<Volume> {
        self.asks.best_level().map(|level| level.total_volume())
    }

    /// Front order at the best price of `side`
    pub fn best_order(&self, side: Side) -> Option<&Order> {
        self.side(side).best_level().and_then(|level| level.first())
    }

    pub fn best_order_id(&self, side: Side) -> Option<OrderId> {
        self.best_order(side).map(|order| order.order_id)
    }

    /// Spread: best ask - best bid, when both exist
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid_price(), self.best_ask_price()) {
            (Some(bid), Some(ask)) => Some(ask.as_decimal() - bid.as_decimal()),
            _ => None,
        }
    }

    /// A crossed book means the match loop missed a cross
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid_price(), self.best_ask_price()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    // === Liquidity queries ===

    /// Is there enough crossable aggregate liquidity on the side opposite
    /// `taker_side` to exhaust `volume` without violating `limit`?
    pub fn can_fill(&mut self, taker_side: Side, volume: Volume, limit: Price) -> bool {
        self.side_mut(taker_side.opposite())
            .can_fill(taker_side, volume, limit)
    }

    /// Level aggregate at an exact price, on whichever side holds it
    pub fn depth_at(&self, price: Price) -> Option<DepthView> {
        self.bids
            .levels
            .get(&price)
            .or_else(|| self.asks.levels.get(&price))
            .map(|level| DepthView {
                price: level.price(),
                volume: level.total_volume(),
                last_change: level.last_change(),
            })
    }

    /// Top `depth` levels per side: (bids descending, asks ascending)
    pub fn depth_snapshot(&self, depth: usize) -> (Vec<(Price, Volume)>, Vec<(Price, Volume)>) {
        (self.bids.depth(depth), self.asks.depth(depth))
    }

    // === Counters ===

    pub fn bid_level_count(&self) -> usize {
        self.bids.levels.len()
    }

    pub fn ask_level_count(&self) -> usize {
        self.asks.levels.len()
    }

    pub fn total_orders(&self) -> usize {
        self.locators.len()
    }

    /// True when either side's cache is awaiting a rebuild
    pub fn cache_dirty(&self, side: Side) -> bool {
        self.side(side).cache.is_dirty()
    }

    // === Audit ===

    /// Full cross-view audit; cheap enough for debug assertions and tests.
    pub fn check_invariants(&self) -> Result<(), BookError> {
        self.bids.validate()?;
        self.asks.validate()?;

        // every locator resolves to an order with the matching id
        for (order_id, locator) in &self.locators {
            let order = self
                .side(locator.side)
                .levels
                .get(&locator.price)
                .and_then(|level| level.get(locator.handle))
                .ok_or_else(|| BookError::Desync(format!("locator for {order_id} dangles")))?;
            if order.order_id != *order_id {
                return Err(BookError::Desync(format!(
                    "locator for {order_id} resolves to {}",
                    order.order_id
                )));
            }
        }

        // every resting order is located
        let resting: usize = self
            .bids
            .levels
            .values()
            .chain(self.asks.levels.values())
            .map(|level| level.order_count())
            .sum();
        if resting != self.locators.len() {
            return Err(BookError::Desync(format!(
                "{resting} resting orders but {} locators",
                self.locators.len()
            )));
        }

        // the spread never closes on a resting book
        if self.is_crossed() {
            return Err(BookError::Desync(format!(
                "book crossed: bid {:?} vs ask {:?}",
                self.best_bid_price(),
                self.best_ask_price()
            )));
        }
        Ok(())
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}
