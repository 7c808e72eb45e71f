//! Ask (short-side) order book
//!
//! Maintains short orders sorted by price ascending (best ask first), FIFO
//! within a price level. Mirror image of the bid book.

use std::collections::{BTreeMap, VecDeque};
use types::numeric::{Price, Quantity};
use types::order::Order;

/// Ask (short) side of the book
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    levels: BTreeMap<Price, VecDeque<Order>>,
}

impl AskBook {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Insert an order at the back of its price level (time priority).
    pub fn insert(&mut self, order: Order) {
        self.levels.entry(order.price).or_default().push_back(order);
    }

    /// Price of the best ask (lowest level).
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// Mutable reference to the order at the head of the best level.
    pub fn best_mut(&mut self) -> Option<&mut Order> {
        self.levels
            .iter_mut()
            .next()
            .and_then(|(_, queue)| queue.front_mut())
    }

    /// Remaining size of the best order, if any.
    pub fn best_size(&self) -> Option<Quantity> {
        self.levels
            .iter()
            .next()
            .and_then(|(_, queue)| queue.front())
            .map(|o| o.size)
    }

    /// Remove and return the head of the best level if its size is zero.
    pub fn pop_best_if_empty(&mut self) -> Option<Order> {
        let best = *self.levels.keys().next()?;
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

    /// Aggregated levels, best (lowest) price first.
    pub fn depth(&self) -> Vec<(Price, Quantity, usize)> {
        self.levels
            .iter()
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
        self.levels.values().flat_map(|q| q.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::TraderId;
    use types::order::Side;

    fn order(price: u64, size: &str, ts: i64) -> Order {
        Order::new(
            TraderId::new("asker111111111111111111111111111").unwrap(),
            Side::Short,
            Quantity::from_str(size).unwrap(),
            Price::from_u64(price),
            ts,
        )
    }

    #[test]
    fn test_best_is_lowest_price() {
        let mut book = AskBook::new();
        book.insert(order(50, "1", 1));
        book.insert(order(48, "2", 2));
        book.insert(order(52, "3", 3));

        assert_eq!(book.best_price(), Some(Price::from_u64(48)));
    }

    #[test]
    fn test_fifo_within_level() {
        let mut book = AskBook::new();
        let first = order(49, "1", 1);
        let first_id = first.order_id;
        book.insert(first);
        book.insert(order(49, "2", 2));

        assert_eq!(book.best_mut().unwrap().order_id, first_id);
    }

    #[test]
    fn test_depth_aggregates_ascending() {
        let mut book = AskBook::new();
        book.insert(order(50, "1", 1));
        book.insert(order(48, "2", 2));

        let depth = book.depth();
        assert_eq!(depth[0].0, Price::from_u64(48));
        assert_eq!(depth[1].0, Price::from_u64(50));
    }
}
