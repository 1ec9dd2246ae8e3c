//! Lazily sorted view of one side's active prices
//!
//! Cumulative-liquidity questions (notably FOK feasibility) want the side's
//! prices in priority order, repeatedly. Sorting the level keys on every
//! query would pay O(n log n) per call, so the sorted list is materialized
//! once and reused until the *set* of prices changes. Volume mutations
//! inside an existing level never touch the cache.

use types::numeric::Price;

/// Sorted price list with a dirty flag
///
/// Descending for bids, ascending for asks. The flag flips exactly on level
/// creation or destruction.
#[derive(Debug, Clone)]
pub struct SortedPriceCache {
    prices: Vec<Price>,
    descending: bool,
    dirty: bool,
}

impl SortedPriceCache {
    pub fn new(descending: bool) -> Self {
        Self {
            prices: Vec::new(),
            descending,
            dirty: false,
        }
    }

    pub fn descending(&self) -> bool {
        self.descending
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Invalidate after the side's price set changed
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Re-materialize from the side's active price keys
    pub fn rebuild(&mut self, keys: impl Iterator<Item = Price>) {
        self.prices.clear();
        self.prices.extend(keys);
        if self.descending {
            self.prices.sort_unstable_by(|a, b| b.cmp(a));
        } else {
            self.prices.sort_unstable();
        }
        self.dirty = false;
    }

    /// The cached prices in priority order; stale when dirty
    pub fn prices(&self) -> &[Price] {
        &self.prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(values: &[u64]) -> Vec<Price> {
        values.iter().map(|v| Price::from_u64(*v)).collect()
    }

    #[test]
    fn test_new_cache_is_clean_and_empty() {
        let cache = SortedPriceCache::new(true);
        assert!(!cache.is_dirty());
        assert!(cache.prices().is_empty());
    }

    #[test]
    fn test_descending_rebuild_for_bids() {
        let mut cache = SortedPriceCache::new(true);
        cache.mark_dirty();
        cache.rebuild(prices(&[100, 103, 99]).into_iter());

        assert!(!cache.is_dirty());
        assert_eq!(cache.prices(), prices(&[103, 100, 99]).as_slice());
    }

    #[test]
    fn test_ascending_rebuild_for_asks() {
        let mut cache = SortedPriceCache::new(false);
        cache.mark_dirty();
        cache.rebuild(prices(&[100, 103, 99]).into_iter());

        assert_eq!(cache.prices(), prices(&[99, 100, 103]).as_slice());
    }

    #[test]
    fn test_dirty_flag_round_trip() {
        let mut cache = SortedPriceCache::new(false);
        cache.mark_dirty();
        assert!(cache.is_dirty());

        cache.rebuild(std::iter::empty());
        assert!(!cache.is_dirty());
        assert!(cache.prices().is_empty());
    }
}
