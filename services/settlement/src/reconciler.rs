//! Webhook reconciliation
//!
//! Confirmation webhooks arrive at-least-once and in no particular order.
//! Reconciliation is therefore idempotent end to end: a completed-settlement
//! marker settles its trade exactly once and applies the position ledger
//! exactly once, no matter how many times it is delivered; a liquidatable
//! marker triggers liquidation at most once per (account, tx signature) but
//! is retried on a later delivery if the trigger call failed.

use crate::client::SettlementClient;
use crate::events::{LogMarker, WebhookPayload};
use crate::ledger::PositionLedger;
use dashmap::DashSet;
use persistence::Store;
use std::sync::Arc;
use tracing::{debug, info, warn};
use types::ids::{SubmissionRef, TraderId};

pub struct WebhookReconciler {
    store: Arc<dyn Store>,
    client: Arc<dyn SettlementClient>,
    ledger: Arc<PositionLedger>,
    /// (account ref, tx signature) pairs already liquidated
    liquidated: DashSet<(String, String)>,
}

impl WebhookReconciler {
    pub fn new(
        store: Arc<dyn Store>,
        client: Arc<dyn SettlementClient>,
        ledger: Arc<PositionLedger>,
    ) -> Self {
        Self {
            store,
            client,
            ledger,
            liquidated: DashSet::new(),
        }
    }

    /// Process one webhook delivery. Never fails: every marker outcome is a
    /// log line, because the sender has already been acknowledged.
    pub async fn process(&self, payload: WebhookPayload) {
        debug!(webhook_id = %payload.webhook_id, txs = payload.txs.len(), "webhook received");
        for tx in &payload.txs {
            for marker in tx.markers() {
                match marker {
                    LogMarker::SettlementCompleted(reference) => {
                        self.reconcile_settlement(&reference).await;
                    }
                    LogMarker::HealthLiquidatable(account) => {
                        self.reconcile_liquidation(&account, &tx.signature).await;
                    }
                }
            }
        }
    }

    async fn reconcile_settlement(&self, reference: &SubmissionRef) {
        let mut trade = match self.store.trade_by_settlement_ref(reference) {
            Ok(Some(trade)) => trade,
            Ok(None) => {
                debug!(reference = %reference, "confirmation for unknown submission ref");
                return;
            }
            Err(err) => {
                warn!(reference = %reference, error = %err, "trade lookup failed");
                return;
            }
        };

        let now = types::now_nanos();
        match trade.mark_settled(now) {
            Ok(true) => {
                if let Err(err) = self.store.update_trade(&trade) {
                    warn!(trade_id = %trade.trade_id, error = %err, "trade update failed");
                }
                self.ledger.apply_trade(&trade, now).await;
                info!(trade_id = %trade.trade_id, reference = %reference, "trade settled");
            }
            Ok(false) => {
                debug!(trade_id = %trade.trade_id, "duplicate settlement confirmation");
            }
            Err(err) => {
                // e.g. the trade never left Pending, or already Failed
                debug!(trade_id = %trade.trade_id, error = %err, "stale settlement confirmation");
            }
        }
    }

    async fn reconcile_liquidation(&self, account: &str, signature: &str) {
        let key = (account.to_string(), signature.to_string());
        if !self.liquidated.insert(key.clone()) {
            debug!(account, signature, "liquidation already triggered for this tx");
            return;
        }

        let trader = match TraderId::new(account) {
            Ok(trader) => trader,
            Err(err) => {
                debug!(account, error = %err, "liquidatable marker with invalid account ref");
                return;
            }
        };

        info!(account = %trader.abbrev(), signature, "liquidatable account detected");
        if let Err(err) = self.client.trigger_liquidation(&trader).await {
            warn!(account = %trader.abbrev(), error = %err, "liquidation trigger failed");
            // Allow a redelivery of the same tx to retry
            self.liquidated.remove(&key);
        }
    }
}
