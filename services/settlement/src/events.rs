//! Confirmation webhook payload and log-marker decoding
//!
//! The settlement layer reports outcomes by emitting marker lines inside
//! transaction logs. Exactly two marker kinds are meaningful here; every
//! other log line is ignored by construction, so third-party noise in the
//! same transaction can never corrupt reconciliation.

use serde::Deserialize;
use types::ids::SubmissionRef;

/// Marker prefix for a confirmed settlement, followed by the submission ref.
pub const SETTLEMENT_COMPLETED_MARKER: &str = "SETTLEMENT_COMPLETED:";

/// Marker prefix for a failed confidential health check, followed by the
/// account reference to liquidate.
pub const HEALTH_LIQUIDATABLE_MARKER: &str = "HEALTH_LIQUIDATABLE:";

/// Inbound webhook body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub webhook_id: String,
    #[serde(default)]
    pub txs: Vec<WebhookTx>,
}

/// One transaction inside a webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookTx {
    pub signature: String,
    #[serde(default)]
    pub logs: Vec<String>,
}

/// A decoded marker from a transaction log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMarker {
    /// Settlement confirmed for the referenced submission
    SettlementCompleted(SubmissionRef),
    /// Health check flagged the account as liquidatable
    HealthLiquidatable(String),
}

/// Decode a single log line. Lines without a known marker (or with an empty
/// payload after the marker) decode to None.
pub fn decode_log_line(line: &str) -> Option<LogMarker> {
    if let Some(idx) = line.find(SETTLEMENT_COMPLETED_MARKER) {
        let reference = line[idx + SETTLEMENT_COMPLETED_MARKER.len()..].trim();
        if reference.is_empty() {
            return None;
        }
        return Some(LogMarker::SettlementCompleted(SubmissionRef::new(reference)));
    }
    if let Some(idx) = line.find(HEALTH_LIQUIDATABLE_MARKER) {
        let account = line[idx + HEALTH_LIQUIDATABLE_MARKER.len()..].trim();
        if account.is_empty() {
            return None;
        }
        return Some(LogMarker::HealthLiquidatable(account.to_string()));
    }
    None
}

impl WebhookTx {
    /// All decodable markers in this transaction's logs, in log order.
    pub fn markers(&self) -> Vec<LogMarker> {
        self.logs.iter().filter_map(|l| decode_log_line(l)).collect()
    }
}
