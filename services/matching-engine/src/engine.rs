//! Order book coordinator
//!
//! Owns both sides and the matching step. Callers must serialize `add` and
//! `match_one` behind one lock; the book itself is a plain owned struct.

use serde::Serialize;
use types::errors::OrderError;
use types::ids::OrderId;
use types::matching::Match;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

use crate::book::{AskBook, BidBook};

/// One aggregated price level of the public snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookLevel {
    pub price: Price,
    pub size: Quantity,
    pub orders: usize,
}

/// Aggregated book snapshot. Carries no trader identity.
#[derive(Debug, Clone, Serialize)]
pub struct BookSnapshot {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

/// The dark pool order book: long orders against short orders.
#[derive(Debug, Default)]
pub struct Orderbook {
    bids: BidBook,
    asks: AskBook,
}

impl Orderbook {
    pub fn new() -> Self {
        Self {
            bids: BidBook::new(),
            asks: AskBook::new(),
        }
    }

    /// Admit an order to its side of the book.
    ///
    /// Rejects zero remaining size before any mutation. Price positivity is
    /// enforced by construction of `Price`.
    pub fn add(&mut self, order: Order) -> Result<(), OrderError> {
        if order.size.is_zero() {
            return Err(OrderError::InvalidSize);
        }
        match order.side {
            Side::Long => self.bids.insert(order),
            Side::Short => self.asks.insert(order),
        }
        Ok(())
    }

    /// Attempt exactly one match between the best bid and the best ask.
    ///
    /// Returns `None` when either side is empty or the book does not cross
    /// (best bid < best ask). A crossing executes at the bid/ask midpoint
    /// for the smaller of the two remaining sizes; both orders are
    /// decremented and fully filled orders leave the book. Zero-size heads
    /// are dropped without producing a match.
    pub fn match_one(&mut self, timestamp: i64) -> Option<Match> {
        // A zero-size order must never rest at the head.
        let dropped_bid = self.bids.pop_best_if_empty().is_some();
        let dropped_ask = self.asks.pop_best_if_empty().is_some();
        if dropped_bid || dropped_ask {
            return None;
        }

        let bid_price = self.bids.best_price()?;
        let ask_price = self.asks.best_price()?;
        if bid_price < ask_price {
            return None;
        }

        let exec_size = self.bids.best_size()?.min(self.asks.best_size()?);
        if exec_size.is_zero() {
            return None;
        }
        let exec_price = bid_price.midpoint(ask_price);

        let buy = {
            let bid = self.bids.best_mut()?;
            bid.fill(exec_size, timestamp);
            bid.clone()
        };
        let sell = {
            let ask = self.asks.best_mut()?;
            ask.fill(exec_size, timestamp);
            ask.clone()
        };

        self.bids.pop_best_if_empty();
        self.asks.pop_best_if_empty();

        Some(Match {
            buy,
            sell,
            price: exec_price,
            size: exec_size,
        })
    }

    /// Remove a resting order (explicit cancel extension point).
    pub fn cancel(&mut self, order_id: &OrderId, timestamp: i64) -> Option<Order> {
        let mut order = self
            .bids
            .remove(order_id)
            .or_else(|| self.asks.remove(order_id))?;
        order.cancel(timestamp);
        Some(order)
    }

    /// Aggregated snapshot: bids descending, asks ascending, no identity.
    pub fn snapshot(&self) -> BookSnapshot {
        let to_levels = |levels: Vec<(Price, Quantity, usize)>| {
            levels
                .into_iter()
                .map(|(price, size, orders)| BookLevel {
                    price,
                    size,
                    orders,
                })
                .collect()
        };
        BookSnapshot {
            bids: to_levels(self.bids.depth()),
            asks: to_levels(self.asks.depth()),
        }
    }

    /// Rebuild the book from persisted open orders on restart.
    ///
    /// Orders are re-inserted in arrival order so time priority survives
    /// the round trip; zero-size leftovers are skipped.
    pub fn restore(&mut self, mut open_orders: Vec<Order>) {
        open_orders.sort_by_key(|o| o.created_at);
        for order in open_orders {
            if order.size.is_zero() {
                continue;
            }
            match order.side {
                Side::Long => self.bids.insert(order),
                Side::Short => self.asks.insert(order),
            }
        }
    }

    pub fn bid_count(&self) -> usize {
        self.bids.order_count()
    }

    pub fn ask_count(&self) -> usize {
        self.asks.order_count()
    }

    /// All resting orders on both sides (restart persistence sweep).
    pub fn open_orders(&self) -> Vec<Order> {
        self.bids
            .orders()
            .chain(self.asks.orders())
            .cloned()
            .collect()
    }
}
