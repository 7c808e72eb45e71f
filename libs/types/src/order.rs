//! Order lifecycle types
//!
//! An order carries its live remaining size; the matching step is the only
//! mutator during normal flow, with explicit cancel as the extension point.

use crate::ids::{OrderId, TraderId};
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of exposure for a perpetual order or position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy-side interest, profits when price rises
    Long,
    /// Sell-side interest, profits when price falls
    Short,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }

    /// PnL sign multiplier: +1 for long, -1 for short
    pub fn sign(&self) -> Decimal {
        match self {
            Side::Long => Decimal::ONE,
            Side::Short => -Decimal::ONE,
        }
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Resting on the book, no fills yet
    Open,
    /// Some size executed, remainder resting
    PartiallyFilled,
    /// Completely executed (terminal)
    Filled,
    /// Explicitly cancelled (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A limit order resting on (or headed for) the dark book.
///
/// `size` is the live remaining size, decremented on every fill; `filled`
/// accumulates so persistence can reconstruct the original size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub trader: TraderId,
    pub side: Side,
    pub size: Quantity,
    pub filled: Quantity,
    pub price: Price,
    pub status: OrderStatus,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
}

impl Order {
    /// Create a new open order
    pub fn new(
        trader: TraderId,
        side: Side,
        size: Quantity,
        price: Price,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            trader,
            side,
            size,
            filled: Quantity::zero(),
            price,
            status: OrderStatus::Open,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Original size at submission time.
    pub fn original_size(&self) -> Quantity {
        self.size + self.filled
    }

    /// Apply an execution of `exec_size` against this order.
    ///
    /// Size saturates at zero; the order is marked Filled when nothing
    /// remains, PartiallyFilled otherwise.
    pub fn fill(&mut self, exec_size: Quantity, timestamp: i64) {
        let applied = exec_size.min(self.size);
        self.size = self.size.saturating_sub(applied);
        self.filled = self.filled + applied;
        self.status = if self.size.is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.updated_at = timestamp;
    }

    /// Cancel the order. Returns false if already terminal.
    pub fn cancel(&mut self, timestamp: i64) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = timestamp;
        true
    }

    pub fn is_filled(&self) -> bool {
        matches!(self.status, OrderStatus::Filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trader() -> TraderId {
        TraderId::new("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin").unwrap()
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Long.opposite(), Side::Short);
        assert_eq!(Side::Short.opposite(), Side::Long);
    }

    #[test]
    fn test_side_sign() {
        assert_eq!(Side::Long.sign(), Decimal::ONE);
        assert_eq!(Side::Short.sign(), -Decimal::ONE);
    }

    #[test]
    fn test_side_wire_format() {
        assert_eq!(serde_json::to_string(&Side::Long).unwrap(), "\"long\"");
        assert_eq!(serde_json::to_string(&Side::Short).unwrap(), "\"short\"");
    }

    #[test]
    fn test_order_partial_fill() {
        let mut order = Order::new(
            trader(),
            Side::Long,
            Quantity::from_str("10").unwrap(),
            Price::from_u64(50),
            1,
        );

        order.fill(Quantity::from_str("4").unwrap(), 2);
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.size, Quantity::from_str("6").unwrap());
        assert_eq!(order.filled, Quantity::from_str("4").unwrap());
        assert_eq!(order.original_size(), Quantity::from_str("10").unwrap());
    }

    #[test]
    fn test_order_full_fill() {
        let mut order = Order::new(
            trader(),
            Side::Short,
            Quantity::from_str("5").unwrap(),
            Price::from_u64(49),
            1,
        );

        order.fill(Quantity::from_str("5").unwrap(), 2);
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.size.is_zero());
        assert!(order.is_filled());
    }

    #[test]
    fn test_order_overfill_saturates() {
        let mut order = Order::new(
            trader(),
            Side::Long,
            Quantity::from_str("3").unwrap(),
            Price::from_u64(50),
            1,
        );

        order.fill(Quantity::from_str("10").unwrap(), 2);
        assert!(order.size.is_zero());
        // Only the available size is counted as filled
        assert_eq!(order.filled, Quantity::from_str("3").unwrap());
    }

    #[test]
    fn test_cancel_terminal_order() {
        let mut order = Order::new(
            trader(),
            Side::Long,
            Quantity::from_str("3").unwrap(),
            Price::from_u64(50),
            1,
        );
        order.fill(Quantity::from_str("3").unwrap(), 2);
        assert!(!order.cancel(3));
        assert_eq!(order.status, OrderStatus::Filled);
    }

    #[test]
    fn test_cancel_open_order() {
        let mut order = Order::new(
            trader(),
            Side::Long,
            Quantity::from_str("3").unwrap(),
            Price::from_u64(50),
            1,
        );
        assert!(order.cancel(2));
        assert_eq!(order.status, OrderStatus::Cancelled);
    }
}
