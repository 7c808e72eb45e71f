//! Dark pool order book and matching algorithm
//!
//! Orders are private until matched: the book never exposes trader identity,
//! only aggregated price levels. Matching is price-time priority against the
//! best bid and best ask only, executing at the bid/ask midpoint.
//!
//! **Key invariants:**
//! - Bid side sorted by price descending, time ascending at equal price
//! - Ask side sorted by price ascending, time ascending at equal price
//! - An order with zero remaining size is never resting on a side
//! - `add` and `match_one` share one mutual-exclusion domain (the caller
//!   wraps the book in a single lock)

pub mod book;
pub mod engine;

pub use engine::{BookLevel, BookSnapshot, Orderbook};
