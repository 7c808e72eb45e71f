//! Periodic account health sweep
//!
//! Walks every account with an open position, runs the local maintenance
//! check as a fast-path filter, and submits a confidential health
//! computation for the at-risk ones. The verdict comes back asynchronously
//! as a liquidatable webhook marker, so this loop never liquidates anyone
//! directly.

use crate::state::AppState;
use risk_engine::DEFAULT_SYMBOL;
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use types::ids::TraderHash;
use types::position::Position;

pub fn spawn(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = period.as_millis() as u64, "health check loop started");
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            run_sweep(&state).await;
        }
    })
}

/// One sweep over all open positions. Returns the number of health checks
/// submitted.
pub async fn run_sweep(state: &AppState) -> usize {
    let open = match state.store.open_positions() {
        Ok(open) => open,
        Err(err) => {
            warn!(error = %err, "open position scan failed");
            return 0;
        }
    };

    let mut by_account: HashMap<TraderHash, Vec<Position>> = HashMap::new();
    for (hash, position) in open {
        by_account.entry(hash).or_default().push(position);
    }

    let mark_price = state.marks.mark_price(DEFAULT_SYMBOL);
    let mut submitted = 0;
    for positions in by_account.into_values() {
        // Every position in the group carries the same trader identity
        let Some(trader) = positions.first().map(|p| p.trader.clone()) else {
            continue;
        };
        let check = state.margin.check_liquidation(&trader, &positions, mark_price);
        if !check.liquidatable {
            continue;
        }
        debug!(
            account = %trader.abbrev(),
            equity = %check.equity,
            maintenance = %check.maintenance_required,
            "account below maintenance, submitting health check"
        );
        match state.orchestrator.submit_health_check(&trader).await {
            Ok(reference) => {
                submitted += 1;
                debug!(account = %trader.abbrev(), reference = %reference, "health check queued");
            }
            Err(err) => {
                // The next sweep retries; liquidation is at-least-once
                warn!(account = %trader.abbrev(), error = %err, "health check submission failed");
            }
        }
    }
    submitted
}
