//! Mark price tracking
//!
//! The mark price values open positions for unrealized PnL and margin. It
//! is the last dark pool execution price per symbol, with a configured
//! default before the first print (an oracle feed is the production
//! replacement and a named extension point).

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use types::numeric::Price;

/// The single market this engine serves.
pub const DEFAULT_SYMBOL: &str = "ZEC-PERP";

/// A mark price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkPrice {
    pub price: Price,
    pub updated_at: i64,
}

/// Last-trade mark price store.
#[derive(Debug)]
pub struct MarkPriceStore {
    prices: DashMap<String, MarkPrice>,
    default_price: Price,
}

impl MarkPriceStore {
    pub fn new(default_price: Price) -> Self {
        Self {
            prices: DashMap::new(),
            default_price,
        }
    }

    /// Record an execution as the new mark price.
    pub fn update(&self, symbol: &str, price: Price, timestamp: i64) {
        self.prices.insert(
            symbol.to_string(),
            MarkPrice {
                price,
                updated_at: timestamp,
            },
        );
    }

    /// Current mark price, falling back to the default before any trade.
    pub fn mark_price(&self, symbol: &str) -> Price {
        self.prices
            .get(symbol)
            .map(|m| m.price)
            .unwrap_or(self.default_price)
    }

    /// All tracked marks (read API).
    pub fn all(&self) -> Vec<(String, MarkPrice)> {
        self.prices
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

impl Default for MarkPriceStore {
    fn default() -> Self {
        // $50: the configured reference price before the first execution
        Self::new(Price::from_u64(50))
    }
}

/// Notional exposure of a size at a mark price.
pub fn notional(size: Decimal, mark_price: Price) -> Decimal {
    size.abs() * mark_price.as_decimal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_before_first_trade() {
        let store = MarkPriceStore::default();
        assert_eq!(store.mark_price(DEFAULT_SYMBOL), Price::from_u64(50));
    }

    #[test]
    fn test_last_trade_becomes_mark() {
        let store = MarkPriceStore::default();
        store.update(DEFAULT_SYMBOL, Price::from_str("49.5").unwrap(), 10);
        assert_eq!(
            store.mark_price(DEFAULT_SYMBOL),
            Price::from_str("49.5").unwrap()
        );
    }

    #[test]
    fn test_notional() {
        assert_eq!(
            notional(Decimal::from(10), Price::from_u64(50)),
            Decimal::from(500)
        );
        assert_eq!(
            notional(Decimal::from(-10), Price::from_u64(50)),
            Decimal::from(500)
        );
    }
}
