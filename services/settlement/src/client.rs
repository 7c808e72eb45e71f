//! Settlement-layer egress port
//!
//! All outbound calls to the external settlement layer go through this
//! trait, so the orchestrator, health checker, and reconciler are testable
//! against a mock without a live endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use types::errors::SettlementError;
use types::ids::{SubmissionRef, TraderId};
use types::numeric::{Price, Quantity};

/// Outbound calls to the external settlement layer.
#[async_trait]
pub trait SettlementClient: Send + Sync {
    /// Submit a matched trade for settlement. The idempotency offset is
    /// consumed by this attempt whether or not it succeeds.
    async fn enqueue_settlement(
        &self,
        buyer: &TraderId,
        seller: &TraderId,
        price: Price,
        size: Quantity,
        offset: u64,
    ) -> Result<SubmissionRef, SettlementError>;

    /// Queue a confidential health computation for one account. The result
    /// arrives later as a HEALTH_LIQUIDATABLE webhook marker, never inline.
    async fn enqueue_health_check(
        &self,
        account: &TraderId,
        offset: u64,
    ) -> Result<SubmissionRef, SettlementError>;

    /// Invoke liquidation for an unhealthy account.
    async fn trigger_liquidation(&self, account: &TraderId) -> Result<(), SettlementError>;
}

#[derive(Serialize)]
struct SettlementRequest<'a> {
    buyer: &'a str,
    seller: &'a str,
    price: Price,
    size: Quantity,
    offset: u64,
}

#[derive(Serialize)]
struct HealthCheckRequest<'a> {
    account: &'a str,
    offset: u64,
}

#[derive(Serialize)]
struct LiquidationRequest<'a> {
    account: &'a str,
}

#[derive(Deserialize)]
struct SubmissionResponse {
    signature: String,
}

/// HTTP implementation of the egress port.
pub struct HttpSettlementClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSettlementClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn post_for_signature<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<SubmissionRef, SettlementError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    SettlementError::Unreachable(e.to_string())
                } else {
                    SettlementError::SubmissionFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(SettlementError::SubmissionFailed(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        let parsed: SubmissionResponse = response
            .json()
            .await
            .map_err(|e| SettlementError::MalformedResponse(e.to_string()))?;
        Ok(SubmissionRef::new(parsed.signature))
    }
}

#[async_trait]
impl SettlementClient for HttpSettlementClient {
    async fn enqueue_settlement(
        &self,
        buyer: &TraderId,
        seller: &TraderId,
        price: Price,
        size: Quantity,
        offset: u64,
    ) -> Result<SubmissionRef, SettlementError> {
        self.post_for_signature(
            "/settlements",
            &SettlementRequest {
                buyer: buyer.as_str(),
                seller: seller.as_str(),
                price,
                size,
                offset,
            },
        )
        .await
    }

    async fn enqueue_health_check(
        &self,
        account: &TraderId,
        offset: u64,
    ) -> Result<SubmissionRef, SettlementError> {
        self.post_for_signature(
            "/health-checks",
            &HealthCheckRequest {
                account: account.as_str(),
                offset,
            },
        )
        .await
    }

    async fn trigger_liquidation(&self, account: &TraderId) -> Result<(), SettlementError> {
        self.post_for_signature(
            "/liquidations",
            &LiquidationRequest {
                account: account.as_str(),
            },
        )
        .await
        .map(|_| ())
    }
}

pub mod mock {
    //! Recording mock for tests and offline runs.

    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedCall {
        Settlement {
            buyer: TraderId,
            seller: TraderId,
            price: Price,
            size: Quantity,
            offset: u64,
        },
        HealthCheck {
            account: TraderId,
            offset: u64,
        },
        Liquidation {
            account: TraderId,
        },
    }

    /// Records every call; returns sequential signatures, or fails every
    /// call while `fail` is set.
    #[derive(Debug, Default)]
    pub struct MockSettlementClient {
        calls: Mutex<Vec<RecordedCall>>,
        counter: AtomicU64,
        fail: AtomicBool,
    }

    impl MockSettlementClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, failing: bool) {
            self.fail.store(failing, Ordering::SeqCst);
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().expect("mock lock").clone()
        }

        fn record(&self, call: RecordedCall) -> Result<SubmissionRef, SettlementError> {
            self.calls.lock().expect("mock lock").push(call);
            if self.fail.load(Ordering::SeqCst) {
                return Err(SettlementError::Unreachable("mock failure".to_string()));
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(SubmissionRef::new(format!("mock-sig-{n}")))
        }
    }

    #[async_trait]
    impl SettlementClient for MockSettlementClient {
        async fn enqueue_settlement(
            &self,
            buyer: &TraderId,
            seller: &TraderId,
            price: Price,
            size: Quantity,
            offset: u64,
        ) -> Result<SubmissionRef, SettlementError> {
            self.record(RecordedCall::Settlement {
                buyer: buyer.clone(),
                seller: seller.clone(),
                price,
                size,
                offset,
            })
        }

        async fn enqueue_health_check(
            &self,
            account: &TraderId,
            offset: u64,
        ) -> Result<SubmissionRef, SettlementError> {
            self.record(RecordedCall::HealthCheck {
                account: account.clone(),
                offset,
            })
        }

        async fn trigger_liquidation(&self, account: &TraderId) -> Result<(), SettlementError> {
            self.record(RecordedCall::Liquidation {
                account: account.clone(),
            })
            .map(|_| ())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockSettlementClient, RecordedCall};
    use super::*;

    fn trader(key: &str) -> TraderId {
        TraderId::new(key).unwrap()
    }

    #[tokio::test]
    async fn test_mock_records_and_signs() {
        let client = MockSettlementClient::new();
        let sig = client
            .enqueue_settlement(
                &trader("buyer111111111111111111111111111"),
                &trader("seller11111111111111111111111111"),
                Price::from_str("49.5").unwrap(),
                Quantity::from_str("5").unwrap(),
                7,
            )
            .await
            .unwrap();
        assert_eq!(sig.as_str(), "mock-sig-0");

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], RecordedCall::Settlement { offset: 7, .. }));
    }

    #[tokio::test]
    async fn test_mock_failure_mode() {
        let client = MockSettlementClient::new();
        client.set_failing(true);
        let result = client
            .trigger_liquidation(&trader("acct1111111111111111111111111111"))
            .await;
        assert!(matches!(result, Err(SettlementError::Unreachable(_))));
        // Failed attempts are still recorded so tests can inspect them
        assert_eq!(client.calls().len(), 1);
    }
}
