//! One side of the order book.
//!
//! Levels are kept in a `BTreeMap` keyed by price, so the best price is the
//! first key (asks) or the last key (bids) in O(log N), and no two levels can
//! share a price. Levels are created on first insert and removed as soon as
//! they empty.

use std::collections::BTreeMap;

use pricetime_types::{DepthLevel, Side};
use rust_decimal::Decimal;

use crate::arena::OrderArena;
use crate::price_level::PriceLevel;

#[derive(Debug, Clone)]
pub struct SideBook {
    side: Side,
    levels: BTreeMap<Decimal, PriceLevel>,
}

impl SideBook {
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Highest bid or lowest ask.
    #[must_use]
    pub fn best_price(&self) -> Option<Decimal> {
        match self.side {
            Side::Buy => self.levels.last_key_value().map(|(p, _)| *p),
            Side::Sell => self.levels.first_key_value().map(|(p, _)| *p),
        }
    }

    pub fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        match self.side {
            Side::Buy => self.levels.values_mut().next_back(),
            Side::Sell => self.levels.values_mut().next(),
        }
    }

    #[must_use]
    pub fn level(&self, price: Decimal) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    pub fn level_mut(&mut self, price: Decimal) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// The level at `price`, created empty if absent.
    pub fn level_or_insert(&mut self, price: Decimal) -> &mut PriceLevel {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
    }

    /// Drop the level at `price` if it holds no orders.
    pub fn remove_if_empty(&mut self, price: Decimal) -> bool {
        if self.levels.get(&price).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&price);
            true
        } else {
            false
        }
    }

    /// Levels from best to worst price.
    pub fn levels(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.values().rev()),
            Side::Sell => Box::new(self.levels.values()),
        }
    }

    /// Up to `n` aggregated levels, best first.
    #[must_use]
    pub fn depth(&self, n: usize, arena: &OrderArena) -> Vec<DepthLevel> {
        self.levels()
            .take(n)
            .map(|level| DepthLevel {
                price: level.price,
                quantity: level.total_quantity(arena),
                order_count: level.len(),
            })
            .collect()
    }

    /// Number of distinct price levels.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pricetime_types::Order;

    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn rest(book: &mut SideBook, arena: &mut OrderArena, id: u64, price: i64, qty: u64) {
        let slot = arena.insert(Order::limit(id, book.side(), dec(price), qty));
        book.level_or_insert(dec(price)).push_back(arena, slot);
    }

    #[test]
    fn bids_best_is_highest() {
        let mut arena = OrderArena::default();
        let mut bids = SideBook::new(Side::Buy);
        rest(&mut bids, &mut arena, 1, 90, 1);
        rest(&mut bids, &mut arena, 2, 100, 1);
        rest(&mut bids, &mut arena, 3, 95, 1);

        assert_eq!(bids.best_price(), Some(dec(100)));
        assert_eq!(bids.best_level_mut().unwrap().price, dec(100));
        let prices: Vec<Decimal> = bids.levels().map(|l| l.price).collect();
        assert_eq!(prices, vec![dec(100), dec(95), dec(90)]);
    }

    #[test]
    fn asks_best_is_lowest() {
        let mut arena = OrderArena::default();
        let mut asks = SideBook::new(Side::Sell);
        rest(&mut asks, &mut arena, 1, 110, 1);
        rest(&mut asks, &mut arena, 2, 101, 1);
        rest(&mut asks, &mut arena, 3, 105, 1);

        assert_eq!(asks.best_price(), Some(dec(101)));
        let prices: Vec<Decimal> = asks.levels().map(|l| l.price).collect();
        assert_eq!(prices, vec![dec(101), dec(105), dec(110)]);
    }

    #[test]
    fn same_price_shares_one_level() {
        let mut arena = OrderArena::default();
        let mut bids = SideBook::new(Side::Buy);
        rest(&mut bids, &mut arena, 1, 100, 10);
        rest(&mut bids, &mut arena, 2, 100, 5);
        assert_eq!(bids.level_count(), 1);
        assert_eq!(bids.level(dec(100)).unwrap().len(), 2);
    }

    #[test]
    fn depth_aggregates_and_truncates() {
        let mut arena = OrderArena::default();
        let mut asks = SideBook::new(Side::Sell);
        rest(&mut asks, &mut arena, 1, 110, 8);
        rest(&mut asks, &mut arena, 2, 110, 2);
        rest(&mut asks, &mut arena, 3, 115, 12);
        rest(&mut asks, &mut arena, 4, 120, 1);

        let depth = asks.depth(2, &arena);
        assert_eq!(depth.len(), 2);
        assert_eq!(
            depth[0],
            DepthLevel {
                price: dec(110),
                quantity: 10,
                order_count: 2,
            }
        );
        assert_eq!(
            depth[1],
            DepthLevel {
                price: dec(115),
                quantity: 12,
                order_count: 1,
            }
        );
    }

    #[test]
    fn remove_if_empty_only_removes_empty_levels() {
        let mut arena = OrderArena::default();
        let mut bids = SideBook::new(Side::Buy);
        rest(&mut bids, &mut arena, 1, 100, 1);
        assert!(!bids.remove_if_empty(dec(100)));

        bids.level_or_insert(dec(99));
        assert!(bids.remove_if_empty(dec(99)));
        assert_eq!(bids.level_count(), 1);
        assert!(!bids.remove_if_empty(dec(42)));
    }

    #[test]
    fn empty_side() {
        let mut bids = SideBook::new(Side::Buy);
        assert!(bids.is_empty());
        assert_eq!(bids.best_price(), None);
        assert!(bids.best_level_mut().is_none());
    }
}
