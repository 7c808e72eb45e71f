//! Shared application state
//!
//! Exclusion domains: the order book sits behind one tokio mutex shared by
//! the order handler and the matching loop; trade/position state lives in
//! the store and ledger; margin balances have their own map. Nothing else
//! is shared mutably.

use matching_engine::Orderbook;
use persistence::{Store, TraderHasher};
use risk_engine::{MarginEngine, MarkPriceStore};
use settlement::{PositionLedger, SettlementOrchestrator, WebhookReconciler};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub book: Arc<Mutex<Orderbook>>,
    pub store: Arc<dyn Store>,
    pub margin: Arc<MarginEngine>,
    pub marks: Arc<MarkPriceStore>,
    pub ledger: Arc<PositionLedger>,
    pub orchestrator: Arc<SettlementOrchestrator>,
    pub reconciler: Arc<WebhookReconciler>,
    pub hasher: TraderHasher,
}


impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        book: Arc<Mutex<Orderbook>>,
        store: Arc<dyn Store>,
        margin: Arc<MarginEngine>,
        marks: Arc<MarkPriceStore>,
        ledger: Arc<PositionLedger>,
        orchestrator: Arc<SettlementOrchestrator>,
        reconciler: Arc<WebhookReconciler>,
        hasher: TraderHasher,
    ) -> Self {
        Self {
            book,
            store,
            margin,
            marks,
            ledger,
            orchestrator,
            reconciler,
            hasher,
        }
    }
}
