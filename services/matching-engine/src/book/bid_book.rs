//! Bid (long-side) order book
//!
//! Maintains long orders sorted by price descending (best bid first).
//! Uses BTreeMap for deterministic iteration; orders at the same price are
//! kept in FIFO arrival order.

use std::collections::{BTreeMap, VecDeque};
use types::numeric::{Price, Quantity};
use types::order::Order;

/// Bid (long) side of the book
///
/// The best bid is the highest price level; at each level, the front of the
/// queue is the earliest arrival.
#[derive(Debug, Clone, Default)]
pub struct BidBook {
    levels: BTreeMap<Price, VecDeque<Order>>,
}

impl BidBook {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Insert an order at the back of its price level (time priority).
    pub fn insert(&mut self, order: Order) {
        self.levels.entry(order.price).or_default().push_back(order);
    }

    /// Price of the best bid (highest level).
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next_back().copied()
    }

    /// Mutable reference to the order at the head of the best level.
    pub fn best_mut(&mut self) -> Option<&mut Order> {
        self.levels
            .iter_mut()
            .next_back()
            .and_then(|(_, queue)| queue.front_mut())
    }

    /// Remaining size of the best order, if any.
    pub fn best_size(&self) -> Option<Quantity> {
        self.levels
            .iter()
            .next_back()
            .and_then(|(_, queue)| queue.front())
            .map(|o| o.size)
    }

    /// Remove and return the head of the best level if its size is zero.
    /// Empty levels are pruned so the best price stays meaningful.
    pub fn pop_best_if_empty(&mut self) -> Option<Order> {
        let best = *self.levels.keys().next_back()?;
        let queue = self.levels.get_mut(&best)?;
        let popped = match queue.front() {
            Some(order) if order.size.is_zero() => queue.pop_front(),
            _ => None,
        };
        if queue.is_empty() {
            self.levels.remove(&best);
        }
        popped
    }

    /// Remove an order anywhere in the book (explicit cancel path).
    pub fn remove(&mut self, order_id: &types::ids::OrderId) -> Option<Order> {
        let mut found = None;
        for (price, queue) in self.levels.iter_mut() {
            if let Some(idx) = queue.iter().position(|o| &o.order_id == order_id) {
                found = Some((*price, idx));
                break;
            }
        }
        let (price, idx) = found?;
        let queue = self.levels.get_mut(&price)?;
        let order = queue.remove(idx);
        if queue.is_empty() {
            self.levels.remove(&price);
        }
        order
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn order_count(&self) -> usize {
        self.levels.values().map(|q| q.len()).sum()
    }

    /// Aggregated levels, best (highest) price first.
    pub fn depth(&self) -> Vec<(Price, Quantity, usize)> {
        self.levels
            .iter()
            .rev()
            .map(|(price, queue)| {
                let total = queue
                    .iter()
                    .fold(Quantity::zero(), |acc, o| acc + o.size);
                (*price, total, queue.len())
            })
            .collect()
    }

    /// All resting orders, best price first, FIFO within a level.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.levels.values().rev().flat_map(|q| q.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::TraderId;
    use types::order::Side;

    fn order(price: u64, size: &str, ts: i64) -> Order {
        Order::new(
            TraderId::new("bidder11111111111111111111111111").unwrap(),
            Side::Long,
            Quantity::from_str(size).unwrap(),
            Price::from_u64(price),
            ts,
        )
    }

    #[test]
    fn test_best_is_highest_price() {
        let mut book = BidBook::new();
        book.insert(order(50, "1", 1));
        book.insert(order(52, "2", 2));
        book.insert(order(49, "3", 3));

        assert_eq!(book.best_price(), Some(Price::from_u64(52)));
        assert_eq!(book.best_size(), Some(Quantity::from_str("2").unwrap()));
    }

    #[test]
    fn test_fifo_within_level() {
        let mut book = BidBook::new();
        let first = order(50, "1", 1);
        let first_id = first.order_id;
        book.insert(first);
        book.insert(order(50, "2", 2));

        assert_eq!(book.best_mut().unwrap().order_id, first_id);
    }

    #[test]
    fn test_pop_best_if_empty() {
        let mut book = BidBook::new();
        book.insert(order(50, "1", 1));

        // Non-zero head is not popped
        assert!(book.pop_best_if_empty().is_none());

        book.best_mut().unwrap().fill(Quantity::from_str("1").unwrap(), 2);
        let popped = book.pop_best_if_empty().unwrap();
        assert!(popped.size.is_zero());
        assert!(book.is_empty());
    }

    #[test]
    fn test_remove_prunes_level() {
        let mut book = BidBook::new();
        let o = order(50, "1", 1);
        let id = o.order_id;
        book.insert(o);
        book.insert(order(51, "1", 2));

        assert!(book.remove(&id).is_some());
        assert_eq!(book.order_count(), 1);
        assert_eq!(book.best_price(), Some(Price::from_u64(51)));
    }

    #[test]
    fn test_depth_aggregates_descending() {
        let mut book = BidBook::new();
        book.insert(order(50, "1", 1));
        book.insert(order(50, "2", 2));
        book.insert(order(52, "1", 3));

        let depth = book.depth();
        assert_eq!(depth[0].0, Price::from_u64(52));
        assert_eq!(depth[1].0, Price::from_u64(50));
        assert_eq!(depth[1].1, Quantity::from_str("3").unwrap());
        assert_eq!(depth[1].2, 2);
    }
}
