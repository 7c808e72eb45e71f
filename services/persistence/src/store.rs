//! Store contract and in-memory implementation
//!
//! Records are keyed by trader hash, never raw identity. The in-memory
//! backend uses dashmap so the order path, the matching tick, and the
//! reconciler can write concurrently without sharing the book lock.

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use types::errors::StoreError;
use types::ids::{OrderId, SubmissionRef, TradeId, TraderHash};
use types::numeric::Price;
use types::order::{Order, OrderStatus};
use types::position::Position;
use types::trade::{SettlementStatus, Trade};
use uuid::Uuid;

/// Aggregate platform metrics (read API).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformMetrics {
    /// Sum of settled trade notionals
    pub total_volume: Decimal,
    /// Sum of open-position notionals at the given mark price
    pub open_interest: Decimal,
    pub trade_count: u64,
    /// Distinct trader hashes that have placed an order
    pub trader_count: u64,
}

/// Durable store contract.
///
/// Writes are best-effort relative to in-memory correctness: the caller
/// logs failures and carries on. Reads back this store only for restart
/// recovery and trader-scoped queries.
pub trait Store: Send + Sync {
    fn save_order(&self, trader_hash: &TraderHash, order: &Order) -> Result<(), StoreError>;
    fn update_order(&self, order: &Order) -> Result<(), StoreError>;
    /// Open orders (Open or PartiallyFilled with size remaining) for restart
    /// restoration, arrival order.
    fn open_orders(&self) -> Result<Vec<Order>, StoreError>;
    fn orders_for(&self, trader_hash: &TraderHash) -> Result<Vec<Order>, StoreError>;

    fn save_trade(
        &self,
        buyer_hash: &TraderHash,
        seller_hash: &TraderHash,
        trade: &Trade,
    ) -> Result<(), StoreError>;
    fn update_trade(&self, trade: &Trade) -> Result<(), StoreError>;
    fn trade(&self, trade_id: &TradeId) -> Result<Option<Trade>, StoreError>;
    fn trade_by_settlement_ref(
        &self,
        reference: &SubmissionRef,
    ) -> Result<Option<Trade>, StoreError>;
    fn trades_for(&self, trader_hash: &TraderHash) -> Result<Vec<Trade>, StoreError>;

    /// Upsert by (trader hash, side): replaces the open position with the
    /// same direction, inserts otherwise.
    fn upsert_position(
        &self,
        trader_hash: &TraderHash,
        position: &Position,
    ) -> Result<(), StoreError>;
    fn positions_for(&self, trader_hash: &TraderHash) -> Result<Vec<Position>, StoreError>;
    /// All open positions with their owner hash (health-check sweep).
    fn open_positions(&self) -> Result<Vec<(TraderHash, Position)>, StoreError>;

    fn metrics(&self, mark_price: Price) -> Result<PlatformMetrics, StoreError>;
}

#[derive(Debug, Clone)]
struct StoredOrder {
    trader_hash: TraderHash,
    order: Order,
}

#[derive(Debug, Clone)]
struct StoredTrade {
    buyer_hash: TraderHash,
    seller_hash: TraderHash,
    trade: Trade,
}

#[derive(Debug, Clone)]
struct StoredPosition {
    trader_hash: TraderHash,
    position: Position,
}

/// In-memory store backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    orders: DashMap<OrderId, StoredOrder>,
    trades: DashMap<TradeId, StoredTrade>,
    trades_by_ref: DashMap<SubmissionRef, TradeId>,
    positions: DashMap<Uuid, StoredPosition>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn save_order(&self, trader_hash: &TraderHash, order: &Order) -> Result<(), StoreError> {
        self.orders.insert(
            order.order_id,
            StoredOrder {
                trader_hash: trader_hash.clone(),
                order: order.clone(),
            },
        );
        Ok(())
    }

    fn update_order(&self, order: &Order) -> Result<(), StoreError> {
        match self.orders.get_mut(&order.order_id) {
            Some(mut stored) => {
                stored.order = order.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(order.order_id.to_string())),
        }
    }

    fn open_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| {
                matches!(
                    entry.order.status,
                    OrderStatus::Open | OrderStatus::PartiallyFilled
                ) && !entry.order.size.is_zero()
            })
            .map(|entry| entry.order.clone())
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    fn orders_for(&self, trader_hash: &TraderHash) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| &entry.trader_hash == trader_hash)
            .map(|entry| entry.order.clone())
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(orders)
    }

    fn save_trade(
        &self,
        buyer_hash: &TraderHash,
        seller_hash: &TraderHash,
        trade: &Trade,
    ) -> Result<(), StoreError> {
        if let Some(reference) = &trade.settlement_ref {
            self.trades_by_ref.insert(reference.clone(), trade.trade_id);
        }
        self.trades.insert(
            trade.trade_id,
            StoredTrade {
                buyer_hash: buyer_hash.clone(),
                seller_hash: seller_hash.clone(),
                trade: trade.clone(),
            },
        );
        Ok(())
    }

    fn update_trade(&self, trade: &Trade) -> Result<(), StoreError> {
        match self.trades.get_mut(&trade.trade_id) {
            Some(mut stored) => {
                stored.trade = trade.clone();
                if let Some(reference) = &trade.settlement_ref {
                    self.trades_by_ref.insert(reference.clone(), trade.trade_id);
                }
                Ok(())
            }
            None => Err(StoreError::NotFound(trade.trade_id.to_string())),
        }
    }

    fn trade(&self, trade_id: &TradeId) -> Result<Option<Trade>, StoreError> {
        Ok(self.trades.get(trade_id).map(|s| s.trade.clone()))
    }

    fn trade_by_settlement_ref(
        &self,
        reference: &SubmissionRef,
    ) -> Result<Option<Trade>, StoreError> {
        let Some(trade_id) = self.trades_by_ref.get(reference).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.trades.get(&trade_id).map(|s| s.trade.clone()))
    }

    fn trades_for(&self, trader_hash: &TraderHash) -> Result<Vec<Trade>, StoreError> {
        let mut trades: Vec<Trade> = self
            .trades
            .iter()
            .filter(|entry| {
                &entry.buyer_hash == trader_hash || &entry.seller_hash == trader_hash
            })
            .map(|entry| entry.trade.clone())
            .collect();
        trades.sort_by_key(|t| std::cmp::Reverse(t.created_at));
        Ok(trades)
    }

    fn upsert_position(
        &self,
        trader_hash: &TraderHash,
        position: &Position,
    ) -> Result<(), StoreError> {
        // Replace the open position with the same (hash, side) if present
        let existing = self
            .positions
            .iter()
            .find(|entry| {
                &entry.trader_hash == trader_hash
                    && entry.position.side == position.side
                    && entry.position.is_open()
                    && entry.position.position_id != position.position_id
            })
            .map(|entry| entry.position.position_id);

        if let Some(old_id) = existing {
            self.positions.remove(&old_id);
        }

        self.positions.insert(
            position.position_id,
            StoredPosition {
                trader_hash: trader_hash.clone(),
                position: position.clone(),
            },
        );
        Ok(())
    }

    fn positions_for(&self, trader_hash: &TraderHash) -> Result<Vec<Position>, StoreError> {
        let mut positions: Vec<Position> = self
            .positions
            .iter()
            .filter(|entry| &entry.trader_hash == trader_hash)
            .map(|entry| entry.position.clone())
            .collect();
        positions.sort_by_key(|p| std::cmp::Reverse(p.opened_at));
        Ok(positions)
    }

    fn open_positions(&self) -> Result<Vec<(TraderHash, Position)>, StoreError> {
        Ok(self
            .positions
            .iter()
            .filter(|entry| entry.position.is_open())
            .map(|entry| (entry.trader_hash.clone(), entry.position.clone()))
            .collect())
    }

    fn metrics(&self, mark_price: Price) -> Result<PlatformMetrics, StoreError> {
        let mut total_volume = Decimal::ZERO;
        let mut trade_count = 0u64;
        for entry in self.trades.iter() {
            trade_count += 1;
            if entry.trade.settlement_status == SettlementStatus::Settled {
                total_volume += entry.trade.notional();
            }
        }

        let open_interest: Decimal = self
            .positions
            .iter()
            .filter(|entry| entry.position.is_open())
            .map(|entry| entry.position.notional(mark_price))
            .sum();

        let traders: HashSet<TraderHash> = self
            .orders
            .iter()
            .map(|entry| entry.trader_hash.clone())
            .collect();

        Ok(PlatformMetrics {
            total_volume,
            open_interest,
            trade_count,
            trader_count: traders.len() as u64,
        })
    }
}
