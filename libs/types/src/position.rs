//! Position tracking types
//!
//! One open position per trader per direction context. Size is never
//! negative: an opposite-direction fill larger than the current size closes
//! the position and a new one opens for the excess (handled by the ledger).

use crate::ids::TraderId;
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::order::Side;

/// Position lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
    Liquidated,
}

/// An open (or historical) perpetual position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub position_id: Uuid,
    pub trader: TraderId,
    pub side: Side,
    pub size: Quantity,
    pub entry_price: Price,
    pub leverage: u8,
    /// PnL realized by reductions of this position
    pub realized_pnl: Decimal,
    pub status: PositionStatus,
    pub opened_at: i64,
    pub updated_at: i64,
}

impl Position {
    pub fn open(
        trader: TraderId,
        side: Side,
        size: Quantity,
        entry_price: Price,
        leverage: u8,
        timestamp: i64,
    ) -> Self {
        Self {
            position_id: Uuid::now_v7(),
            trader,
            side,
            size,
            entry_price,
            leverage,
            realized_pnl: Decimal::ZERO,
            status: PositionStatus::Open,
            opened_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, PositionStatus::Open)
    }

    /// Unrealized PnL at the given mark price:
    /// `sign(side) * (mark - entry) * size`.
    pub fn unrealized_pnl(&self, mark_price: Price) -> Decimal {
        self.side.sign()
            * (mark_price.as_decimal() - self.entry_price.as_decimal())
            * self.size.as_decimal()
    }

    /// Notional exposure at the given mark price.
    pub fn notional(&self, mark_price: Price) -> Decimal {
        self.size.as_decimal() * mark_price.as_decimal()
    }

    /// Grow the position with a same-direction fill (weighted-average entry).
    pub fn increase(&mut self, fill_size: Quantity, fill_price: Price, timestamp: i64) {
        let old_size = self.size.as_decimal();
        let new_size = old_size + fill_size.as_decimal();
        let new_entry = (self.entry_price.as_decimal() * old_size
            + fill_price.as_decimal() * fill_size.as_decimal())
            / new_size;
        self.size = self.size + fill_size;
        // new_size > 0 and both inputs positive, so the average is positive
        if let Some(price) = Price::try_new(new_entry) {
            self.entry_price = price;
        }
        self.updated_at = timestamp;
    }

    /// Shrink the position with an opposite-direction fill of at most the
    /// current size. Realizes PnL on the closed portion; entry is unchanged.
    /// Marks the position Closed when nothing remains.
    pub fn reduce(&mut self, closing_size: Quantity, fill_price: Price, timestamp: i64) -> Decimal {
        let closing = closing_size.min(self.size);
        let realized = self.side.sign()
            * (fill_price.as_decimal() - self.entry_price.as_decimal())
            * closing.as_decimal();
        self.realized_pnl += realized;
        self.size = self.size.saturating_sub(closing);
        if self.size.is_zero() {
            self.status = PositionStatus::Closed;
        }
        self.updated_at = timestamp;
        realized
    }
}
