//! Settlement orchestration, webhook reconciliation, and position tracking
//!
//! This crate owns the trade side of a match: persisting it, submitting it
//! to the external settlement layer exactly once per attempt, reconciling
//! the asynchronous confirmation webhooks, and applying settled trades to
//! per-trader positions. Everything downstream of the book is built to
//! survive duplicate, delayed, and reordered deliveries.

pub mod client;
pub mod events;
pub mod ledger;
pub mod orchestrator;
pub mod reconciler;

pub use client::{HttpSettlementClient, SettlementClient};
pub use events::{LogMarker, WebhookPayload, WebhookTx};
pub use ledger::PositionLedger;
pub use orchestrator::SettlementOrchestrator;
pub use reconciler::WebhookReconciler;
