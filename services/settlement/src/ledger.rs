//! Position ledger
//!
//! Applies settled trades to per-trader positions: same-direction fills
//! grow the position at a weighted-average entry, opposite-direction fills
//! realize PnL against the unchanged entry, and an oversize opposite fill
//! closes the position then re-applies the residual at the fill price as a
//! fresh position in the fill's direction. Each (trader, trade) pair is
//! applied at most once, so webhook redelivery cannot double-count.

use persistence::{Store, TraderHasher};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use types::ids::{TradeId, TraderHash, TraderId};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::position::Position;
use types::trade::Trade;

struct LedgerState {
    /// Open positions keyed by (trader hash, direction)
    open: HashMap<(TraderHash, Side), Position>,
    /// Idempotent-apply guard
    applied: HashSet<(TraderHash, TradeId, Side)>,
}

/// Per-trader position ledger, one exclusion domain for all applies.
pub struct PositionLedger {
    store: Arc<dyn Store>,
    hasher: TraderHasher,
    default_leverage: u8,
    state: Mutex<LedgerState>,
}

impl PositionLedger {
    pub fn new(store: Arc<dyn Store>, hasher: TraderHasher, default_leverage: u8) -> Self {
        Self {
            store,
            hasher,
            default_leverage,
            state: Mutex::new(LedgerState {
                open: HashMap::new(),
                applied: HashSet::new(),
            }),
        }
    }

    /// Reload open positions from the store after a restart. The applied
    /// set starts empty; redelivered confirmations for already-Settled
    /// trades never reach the ledger, so replay stays safe.
    pub async fn restore(&self) -> Result<usize, types::errors::StoreError> {
        let open = self.store.open_positions()?;
        let mut state = self.state.lock().await;
        let count = open.len();
        for (hash, position) in open {
            state.open.insert((hash, position.side), position);
        }
        Ok(count)
    }

    /// Apply a settled trade to both counterparties.
    pub async fn apply_trade(&self, trade: &Trade, timestamp: i64) {
        self.apply_fill(
            &trade.buyer,
            Side::Long,
            trade.size,
            trade.price,
            trade.trade_id,
            timestamp,
        )
        .await;
        self.apply_fill(
            &trade.seller,
            Side::Short,
            trade.size,
            trade.price,
            trade.trade_id,
            timestamp,
        )
        .await;
    }

    /// Apply one side's fill. A repeat (trader, trade, direction) is a no-op.
    pub async fn apply_fill(
        &self,
        trader: &TraderId,
        fill_side: Side,
        size: Quantity,
        price: Price,
        trade_id: TradeId,
        timestamp: i64,
    ) {
        let hash = self.hasher.hash(trader);
        let mut state = self.state.lock().await;

        let guard_key = (hash.clone(), trade_id, fill_side);
        if !state.applied.insert(guard_key) {
            debug!(
                trade_id = %trade_id,
                trader = %trader.abbrev(),
                "fill already applied, skipping"
            );
            return;
        }

        self.fill_locked(&mut state, &hash, trader, fill_side, size, price, timestamp);
    }

    fn fill_locked(
        &self,
        state: &mut LedgerState,
        hash: &TraderHash,
        trader: &TraderId,
        fill_side: Side,
        size: Quantity,
        price: Price,
        timestamp: i64,
    ) {
        if size.is_zero() {
            return;
        }

        let same_key = (hash.clone(), fill_side);
        let opposite_key = (hash.clone(), fill_side.opposite());

        if let Some(position) = state.open.get_mut(&same_key) {
            position.increase(size, price, timestamp);
            self.persist(hash, position);
            return;
        }

        if let Some(mut position) = state.open.remove(&opposite_key) {
            let closing = size.min(position.size);
            let residual = size.saturating_sub(position.size);
            let realized = position.reduce(closing, price, timestamp);
            debug!(
                trader = %trader.abbrev(),
                realized = %realized,
                remaining = %position.size,
                "reduced position against opposite fill"
            );
            self.persist(hash, &position);
            if position.is_open() {
                state.open.insert(opposite_key, position);
            }
            if !residual.is_zero() {
                // Flip: re-apply the excess as a fresh position
                self.fill_locked(state, hash, trader, fill_side, residual, price, timestamp);
            }
            return;
        }

        let position = Position::open(
            trader.clone(),
            fill_side,
            size,
            price,
            self.default_leverage,
            timestamp,
        );
        self.persist(hash, &position);
        state.open.insert(same_key, position);
    }

    // Store writes never block the ledger; in-memory state stays
    // authoritative when the backend misbehaves.
    fn persist(&self, hash: &TraderHash, position: &Position) {
        if let Err(err) = self.store.upsert_position(hash, position) {
            warn!(error = %err, "position upsert failed");
        }
    }

    /// Open position for a trader in the given direction, if any.
    pub async fn open_position(&self, trader: &TraderId, side: Side) -> Option<Position> {
        let hash = self.hasher.hash(trader);
        let state = self.state.lock().await;
        state.open.get(&(hash, side)).cloned()
    }

    /// All open positions for a trader.
    pub async fn open_positions_for(&self, trader: &TraderId) -> Vec<Position> {
        let hash = self.hasher.hash(trader);
        let state = self.state.lock().await;
        let mut positions: Vec<Position> = state
            .open
            .iter()
            .filter(|((h, _), _)| h == &hash)
            .map(|(_, p)| p.clone())
            .collect();
        positions.sort_by_key(|p| p.opened_at);
        positions
    }
}
