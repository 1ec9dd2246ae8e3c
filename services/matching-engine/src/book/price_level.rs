//! Price level with FIFO queue
//!
//! All orders resting at one price, in arrival order. Time priority is
//! implicit in insertion order; no timestamp comparisons happen anywhere.
//! Orders live in a slab of doubly-linked nodes, so [`PriceLevel::push_back`]
//! hands out a stable handle and removal by handle is O(1) with no scan.

use slab::Slab;
use types::numeric::{Price, Volume};
use types::order::Order;

/// Stable handle to an order resting in a level's FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelHandle(usize);

#[derive(Debug, Clone)]
struct Node {
    order: Order,
    prev: Option<usize>,
    next: Option<usize>,
}

/// FIFO of orders at one price, with cached aggregates
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Price,
    nodes: Slab<Node>,
    head: Option<usize>,
    tail: Option<usize>,
    total_volume: Volume,
    last_change: i64,
}

impl PriceLevel {
    pub fn new(price: Price, timestamp: i64) -> Self {
        Self {
            price,
            nodes: Slab::new(),
            head: None,
            tail: None,
            total_volume: Volume::ZERO,
            last_change: timestamp,
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Cached Σ remaining volumes of all orders at this level
    pub fn total_volume(&self) -> Volume {
        self.total_volume
    }

    pub fn last_change(&self) -> i64 {
        self.last_change
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn order_count(&self) -> usize {
        self.nodes.len()
    }

    /// Append an order at the back of the queue (time priority)
    ///
    /// Returns a stable handle for later O(1) removal.
    pub fn push_back(&mut self, order: Order, timestamp: i64) -> LevelHandle {
        debug_assert_eq!(order.price, self.price, "order joined the wrong level");

        let volume = order.remaining;
        let idx = self.nodes.insert(Node {
            order,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);

        self.total_volume += volume;
        self.last_change = timestamp;
        LevelHandle(idx)
    }

    /// Unlink and return the order behind `handle`, O(1)
    ///
    /// The total volume drops by the order's remaining volume at the time
    /// of removal.
    pub fn remove(&mut self, handle: LevelHandle, timestamp: i64) -> Option<Order> {
        if !self.nodes.contains(handle.0) {
            return None;
        }
        let node = self.nodes.remove(handle.0);

        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }

        self.total_volume -= node.order.remaining;
        self.last_change = timestamp;
        Some(node.order)
    }

    /// The head order without removing it
    pub fn first(&self) -> Option<&Order> {
        self.head.map(|idx| &self.nodes[idx].order)
    }

    pub fn first_mut(&mut self) -> Option<&mut Order> {
        self.head.map(|idx| &mut self.nodes[idx].order)
    }

    pub fn get(&self, handle: LevelHandle) -> Option<&Order> {
        self.nodes.get(handle.0).map(|node| &node.order)
    }

    pub fn get_mut(&mut self, handle: LevelHandle) -> Option<&mut Order> {
        self.nodes.get_mut(handle.0).map(|node| &mut node.order)
    }

    /// Drop `volume` from the cached total after an in-place fill
    ///
    /// The order itself was already decremented by the engine; only the
    /// aggregate needs to follow.
    pub fn reduce(&mut self, volume: Volume, timestamp: i64) {
        self.total_volume -= volume;
        self.last_change = timestamp;
    }

    /// Walk the queue head→tail in arrival order
    pub fn iter(&self) -> LevelIter<'_> {
        LevelIter {
            level: self,
            cursor: self.head,
        }
    }
}

/// Arrival-order iterator over a level's orders
pub struct LevelIter<'a> {
    level: &'a PriceLevel,
    cursor: Option<usize>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = &self.level.nodes[idx];
        self.cursor = node.next;
        Some(&node.order)
    }
}
