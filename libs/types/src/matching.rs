//! Transient match value
//!
//! Produced by one matching step and consumed immediately by settlement;
//! never persisted as its own entity (it becomes a Trade).

use crate::numeric::{Price, Quantity};
use crate::order::Order;
use serde::{Deserialize, Serialize};

/// One crossing between the best bid and best ask.
///
/// `buy` and `sell` are post-fill snapshots of the two orders so the caller
/// can persist their updated sizes and statuses without re-locking the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub buy: Order,
    pub sell: Order,
    /// Midpoint of best bid and best ask at crossing time
    pub price: Price,
    /// min(bid remaining, ask remaining) at crossing time
    pub size: Quantity,
}

impl Match {
    /// Notional value of the execution.
    pub fn notional(&self) -> rust_decimal::Decimal {
        self.price.as_decimal() * self.size.as_decimal()
    }
}
