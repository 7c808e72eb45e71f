//! Settlement orchestration
//!
//! Turns a match into a persisted trade and exactly one settlement
//! submission attempt. The trade is durably Pending before the egress call
//! leaves the process, so a crash mid-submission leaves an auditable record
//! instead of a phantom fill. Idempotency offsets are monotonic and
//! consumed per attempt: a failed submission never reuses its offset.

use crate::client::SettlementClient;
use persistence::{Store, TraderHasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use types::errors::{SettlementError, TradeError};
use types::ids::{SubmissionRef, TraderId};
use types::matching::Match;
use types::trade::Trade;

pub struct SettlementOrchestrator {
    client: Arc<dyn SettlementClient>,
    store: Arc<dyn Store>,
    hasher: TraderHasher,
    /// Seeded from the clock at startup so restarts never rewind offsets
    next_offset: AtomicU64,
}

impl SettlementOrchestrator {
    pub fn new(
        client: Arc<dyn SettlementClient>,
        store: Arc<dyn Store>,
        hasher: TraderHasher,
    ) -> Self {
        Self {
            client,
            store,
            hasher,
            next_offset: AtomicU64::new(types::now_nanos() as u64),
        }
    }

    fn take_offset(&self) -> u64 {
        self.next_offset.fetch_add(1, Ordering::Relaxed)
    }

    /// Persist a match as a Pending trade, then attempt submission once.
    ///
    /// Success moves the trade to Queued with the returned submission ref;
    /// failure moves it to Failed. Either way the final state is persisted
    /// and returned.
    pub async fn submit_match(&self, m: &Match, timestamp: i64) -> Result<Trade, TradeError> {
        let mut trade = Trade::new(
            m.buy.order_id,
            m.sell.order_id,
            m.buy.trader.clone(),
            m.sell.trader.clone(),
            m.price,
            m.size,
            timestamp,
        );

        let buyer_hash = self.hasher.hash(&trade.buyer);
        let seller_hash = self.hasher.hash(&trade.seller);
        if let Err(err) = self.store.save_trade(&buyer_hash, &seller_hash, &trade) {
            warn!(trade_id = %trade.trade_id, error = %err, "trade save failed");
        }

        let offset = self.take_offset();
        let outcome = self
            .client
            .enqueue_settlement(&trade.buyer, &trade.seller, trade.price, trade.size, offset)
            .await;

        match outcome {
            Ok(reference) => {
                trade.mark_queued(reference)?;
                info!(
                    trade_id = %trade.trade_id,
                    reference = %trade.settlement_ref.as_ref().map(SubmissionRef::as_str).unwrap_or(""),
                    offset,
                    "settlement queued"
                );
            }
            Err(err) => {
                warn!(trade_id = %trade.trade_id, offset, error = %err, "settlement submission failed");
                trade.mark_failed()?;
            }
        }

        if let Err(err) = self.store.update_trade(&trade) {
            warn!(trade_id = %trade.trade_id, error = %err, "trade update failed");
        }
        Ok(trade)
    }

    /// Queue a confidential health computation for one account.
    pub async fn submit_health_check(
        &self,
        account: &TraderId,
    ) -> Result<SubmissionRef, SettlementError> {
        let offset = self.take_offset();
        self.client.enqueue_health_check(account, offset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockSettlementClient, RecordedCall};
    use persistence::MemoryStore;
    use types::numeric::{Price, Quantity};
    use types::order::{Order, Side};
    use types::trade::SettlementStatus;

    fn fixture() -> (Arc<MockSettlementClient>, Arc<MemoryStore>, SettlementOrchestrator) {
        let client = Arc::new(MockSettlementClient::new());
        let store = Arc::new(MemoryStore::new());
        let orchestrator = SettlementOrchestrator::new(
            client.clone(),
            store.clone(),
            TraderHasher::new("test-salt"),
        );
        (client, store, orchestrator)
    }

    fn sample_match() -> Match {
        let mut buy = Order::new(
            TraderId::new("buyer111111111111111111111111111").unwrap(),
            Side::Long,
            Quantity::from_str("10").unwrap(),
            Price::from_u64(50),
            1,
        );
        let mut sell = Order::new(
            TraderId::new("seller11111111111111111111111111").unwrap(),
            Side::Short,
            Quantity::from_str("5").unwrap(),
            Price::from_u64(49),
            1,
        );
        let size = Quantity::from_str("5").unwrap();
        buy.fill(size, 2);
        sell.fill(size, 2);
        Match {
            buy,
            sell,
            price: Price::from_str("49.5").unwrap(),
            size,
        }
    }

    #[tokio::test]
    async fn test_successful_submission_queues_trade() {
        let (client, store, orchestrator) = fixture();

        let trade = orchestrator.submit_match(&sample_match(), 2).await.unwrap();
        assert_eq!(trade.settlement_status, SettlementStatus::Queued);
        let reference = trade.settlement_ref.clone().unwrap();

        // Persisted copy matches and is findable by submission ref
        let stored = store
            .trade_by_settlement_ref(&reference)
            .unwrap()
            .unwrap();
        assert_eq!(stored.settlement_status, SettlementStatus::Queued);

        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_submission_marks_failed() {
        let (client, store, orchestrator) = fixture();
        client.set_failing(true);

        let trade = orchestrator.submit_match(&sample_match(), 2).await.unwrap();
        assert_eq!(trade.settlement_status, SettlementStatus::Failed);
        assert!(trade.settlement_ref.is_none());

        let stored = store.trade(&trade.trade_id).unwrap().unwrap();
        assert_eq!(stored.settlement_status, SettlementStatus::Failed);
    }

    #[tokio::test]
    async fn test_offsets_are_distinct_per_attempt() {
        let (client, _store, orchestrator) = fixture();

        orchestrator.submit_match(&sample_match(), 2).await.unwrap();
        orchestrator.submit_match(&sample_match(), 3).await.unwrap();

        let offsets: Vec<u64> = client
            .calls()
            .into_iter()
            .map(|c| match c {
                RecordedCall::Settlement { offset, .. } => offset,
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(offsets.len(), 2);
        assert!(offsets[1] > offsets[0]);
    }

    #[tokio::test]
    async fn test_offset_not_reused_after_failure() {
        let (client, _store, orchestrator) = fixture();

        client.set_failing(true);
        orchestrator.submit_match(&sample_match(), 2).await.unwrap();
        client.set_failing(false);

        orchestrator.submit_match(&sample_match(), 3).await.unwrap();

        // The failed attempt consumed its offset; the retry gets a fresh one
        let offsets: Vec<u64> = client
            .calls()
            .into_iter()
            .map(|c| match c {
                RecordedCall::Settlement { offset, .. } => offset,
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(offsets.len(), 2);
        assert!(offsets[1] > offsets[0]);
    }

    #[tokio::test]
    async fn test_health_check_consumes_offset() {
        let (client, _store, orchestrator) = fixture();
        let account = TraderId::new("acct1111111111111111111111111111").unwrap();

        orchestrator.submit_health_check(&account).await.unwrap();
        orchestrator.submit_health_check(&account).await.unwrap();

        let offsets: Vec<u64> = client
            .calls()
            .into_iter()
            .map(|c| match c {
                RecordedCall::HealthCheck { offset, .. } => offset,
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert!(offsets[1] > offsets[0]);
    }
}
