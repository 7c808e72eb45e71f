//! Continuous matching loop
//!
//! One matching attempt per tick. The book lock is held only for the
//! `match_one` call itself; persistence, mark-price update, and settlement
//! submission happen on the post-fill snapshots the match carries. The
//! tick awaits only the submission call, never settlement confirmation. A
//! tick that overruns the interval delays the next tick rather than
//! bursting to catch up.

use crate::state::AppState;
use risk_engine::DEFAULT_SYMBOL;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use types::trade::Trade;

pub fn spawn(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = period.as_millis() as u64, "matching loop started");
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = run_tick(&state).await {
                // One bad tick never stops the loop
                error!(error = %err, "matching tick failed");
            }
        }
    })
}

/// One matching attempt: match, persist both orders, update the mark,
/// submit settlement. Returns the resulting trade, if any.
pub async fn run_tick(state: &AppState) -> Result<Option<Trade>, anyhow::Error> {
    let now = types::now_nanos();
    let matched = {
        let mut book = state.book.lock().await;
        book.match_one(now)
    };
    let Some(m) = matched else {
        return Ok(None);
    };

    info!(
        buyer = %m.buy.trader.abbrev(),
        seller = %m.sell.trader.abbrev(),
        price = %m.price,
        size = %m.size,
        "match found"
    );

    if let Err(err) = state.store.update_order(&m.buy) {
        warn!(order_id = %m.buy.order_id, error = %err, "buy order update failed");
    }
    if let Err(err) = state.store.update_order(&m.sell) {
        warn!(order_id = %m.sell.order_id, error = %err, "sell order update failed");
    }

    // Last dark pool execution price becomes the mark
    state.marks.update(DEFAULT_SYMBOL, m.price, now);

    let trade = state.orchestrator.submit_match(&m, now).await?;
    Ok(Some(trade))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::harness;
    use persistence::Store;
    use types::ids::TraderId;
    use types::numeric::{Price, Quantity};
    use types::order::{Order, OrderStatus, Side};
    use types::trade::SettlementStatus;

    fn order(pubkey: &str, side: Side, size: &str, price: u64) -> Order {
        Order::new(
            TraderId::new(pubkey).unwrap(),
            side,
            Quantity::from_str(size).unwrap(),
            Price::from_u64(price),
            types::now_nanos(),
        )
    }

    #[tokio::test]
    async fn test_tick_without_cross_is_quiet() {
        let h = harness();
        {
            let mut book = h.state.book.lock().await;
            book.add(order("buyer111111111111111111111111111", Side::Long, "10", 48))
                .unwrap();
            book.add(order("seller11111111111111111111111111", Side::Short, "10", 49))
                .unwrap();
        }
        assert!(run_tick(&h.state).await.unwrap().is_none());
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_tick_matches_persists_and_submits() {
        let h = harness();
        let buy = order("buyer111111111111111111111111111", Side::Long, "10", 50);
        let sell = order("seller11111111111111111111111111", Side::Short, "5", 49);
        {
            let hasher = persistence::TraderHasher::new("test-salt");
            h.store.save_order(&hasher.hash(&buy.trader), &buy).unwrap();
            h.store.save_order(&hasher.hash(&sell.trader), &sell).unwrap();
            let mut book = h.state.book.lock().await;
            book.add(buy.clone()).unwrap();
            book.add(sell.clone()).unwrap();
        }

        let trade = run_tick(&h.state).await.unwrap().unwrap();
        assert_eq!(trade.price, Price::from_str("49.5").unwrap());
        assert_eq!(trade.size, Quantity::from_str("5").unwrap());
        assert_eq!(trade.settlement_status, SettlementStatus::Queued);

        // Mark price follows the execution
        assert_eq!(
            h.state.marks.mark_price(DEFAULT_SYMBOL),
            Price::from_str("49.5").unwrap()
        );

        // Both post-fill orders were persisted
        let hasher = persistence::TraderHasher::new("test-salt");
        let buyer_orders = h.store.orders_for(&hasher.hash(&buy.trader)).unwrap();
        assert_eq!(buyer_orders[0].status, OrderStatus::PartiallyFilled);
        assert_eq!(buyer_orders[0].size, Quantity::from_str("5").unwrap());
        let seller_orders = h.store.orders_for(&hasher.hash(&sell.trader)).unwrap();
        assert_eq!(seller_orders[0].status, OrderStatus::Filled);

        // A second tick finds no remaining cross
        assert!(run_tick(&h.state).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_submission_failure_leaves_failed_trade() {
        let h = harness();
        h.client.set_failing(true);
        {
            let mut book = h.state.book.lock().await;
            book.add(order("buyer111111111111111111111111111", Side::Long, "5", 50))
                .unwrap();
            book.add(order("seller11111111111111111111111111", Side::Short, "5", 50))
                .unwrap();
        }

        let trade = run_tick(&h.state).await.unwrap().unwrap();
        assert_eq!(trade.settlement_status, SettlementStatus::Failed);
    }
}
