mod config;
mod error;
mod handlers;
mod health;
mod matcher;
mod models;
mod router;
mod state;

use config::Config;
use matching_engine::Orderbook;
use persistence::{MemoryStore, Store, TraderHasher};
use risk_engine::{MarginEngine, MarkPriceStore, RiskConfig};
use router::create_router;
use settlement::{
    HttpSettlementClient, PositionLedger, SettlementOrchestrator, WebhookReconciler,
};
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    tracing::info!(port = config.port, "starting matching core");

    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let hasher = TraderHasher::new(config.salt_secret.clone());
    let client = Arc::new(HttpSettlementClient::new(config.settlement_url.clone()));
    let risk = RiskConfig::default();

    let margin = Arc::new(MarginEngine::new(risk.clone()));
    let marks = Arc::new(MarkPriceStore::default());
    let ledger = Arc::new(PositionLedger::new(
        store.clone(),
        hasher.clone(),
        risk.default_leverage,
    ));
    let orchestrator = Arc::new(SettlementOrchestrator::new(
        client.clone(),
        store.clone(),
        hasher.clone(),
    ));
    let reconciler = Arc::new(WebhookReconciler::new(
        store.clone(),
        client,
        ledger.clone(),
    ));

    // Restore in-memory state from the store before serving
    let mut book = Orderbook::new();
    let open_orders = store.open_orders()?;
    if !open_orders.is_empty() {
        tracing::info!(count = open_orders.len(), "restoring open orders");
    }
    book.restore(open_orders);
    let restored = ledger.restore().await?;
    if restored > 0 {
        tracing::info!(count = restored, "restored open positions");
    }

    let state = AppState::new(
        Arc::new(Mutex::new(book)),
        store,
        margin,
        marks,
        ledger,
        orchestrator,
        reconciler,
        hasher,
    );

    matcher::spawn(state.clone(), config.match_interval);
    health::spawn(state.clone(), config.health_check_interval);

    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
