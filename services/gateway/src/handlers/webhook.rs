use crate::models::WebhookAck;
use crate::state::AppState;
use axum::{extract::State, Json};
use settlement::WebhookPayload;
use tracing::debug;

/// Settlement confirmation ingress.
///
/// Always acknowledges with 200 so the sender never retries because of us;
/// reconciliation runs in a spawned task and is idempotent, so losing a
/// race with a redelivery is harmless. A body that does not parse as a
/// webhook payload is logged and dropped, never an error.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Json<WebhookAck> {
    match serde_json::from_value::<WebhookPayload>(body) {
        Ok(payload) => {
            let reconciler = state.reconciler.clone();
            tokio::spawn(async move {
                reconciler.process(payload).await;
            });
        }
        Err(err) => {
            debug!(error = %err, "unparseable webhook payload ignored");
        }
    }
    Json(WebhookAck { received: true })
}
