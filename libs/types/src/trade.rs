//! Trade and settlement lifecycle types
//!
//! A trade is born Pending when a match is recorded, moves to Queued once
//! the external settlement request is accepted, and reaches Settled (or
//! Failed) when the confirmation webhook arrives. The status only advances
//! forward; the single permitted "sideways" edge is Queued -> Failed.

use crate::errors::TradeError;
use crate::ids::{OrderId, SubmissionRef, TradeId, TraderId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Settlement status of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    /// Match recorded, settlement not yet submitted
    Pending,
    /// Settlement request accepted by the external layer
    Queued,
    /// Balance update confirmed (terminal)
    Settled,
    /// Submission or settlement failed (terminal)
    Failed,
}

impl SettlementStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SettlementStatus::Settled | SettlementStatus::Failed)
    }

    /// Whether a forward transition to `next` is legal.
    fn allows(&self, next: SettlementStatus) -> bool {
        use SettlementStatus::*;
        matches!(
            (self, next),
            (Pending, Queued) | (Pending, Failed) | (Queued, Settled) | (Queued, Failed)
        )
    }
}

/// A matched execution awaiting (or past) external settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub buyer: TraderId,
    pub seller: TraderId,
    pub price: Price,
    pub size: Quantity,
    pub settlement_status: SettlementStatus,
    /// External submission reference, set on the Pending -> Queued edge
    pub settlement_ref: Option<SubmissionRef>,
    pub created_at: i64,
    pub settled_at: Option<i64>,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        buyer: TraderId,
        seller: TraderId,
        price: Price,
        size: Quantity,
        timestamp: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            buy_order_id,
            sell_order_id,
            buyer,
            seller,
            price,
            size,
            settlement_status: SettlementStatus::Pending,
            settlement_ref: None,
            created_at: timestamp,
            settled_at: None,
        }
    }

    /// Record successful submission: Pending -> Queued with the external ref.
    pub fn mark_queued(&mut self, reference: SubmissionRef) -> Result<(), TradeError> {
        self.transition(SettlementStatus::Queued)?;
        self.settlement_ref = Some(reference);
        Ok(())
    }

    /// Record confirmation: Queued -> Settled.
    ///
    /// Returns Ok(false) without touching anything when the trade is
    /// already Settled, so redelivered confirmations are no-ops.
    pub fn mark_settled(&mut self, timestamp: i64) -> Result<bool, TradeError> {
        if self.settlement_status == SettlementStatus::Settled {
            return Ok(false);
        }
        self.transition(SettlementStatus::Settled)?;
        self.settled_at = Some(timestamp);
        Ok(true)
    }

    /// Record failure: Pending/Queued -> Failed (terminal, no retry here).
    pub fn mark_failed(&mut self) -> Result<(), TradeError> {
        self.transition(SettlementStatus::Failed)
    }

    fn transition(&mut self, next: SettlementStatus) -> Result<(), TradeError> {
        if !self.settlement_status.allows(next) {
            return Err(TradeError::InvalidTransition {
                from: self.settlement_status,
                to: next,
            });
        }
        self.settlement_status = next;
        Ok(())
    }

    /// Notional value of the trade.
    pub fn notional(&self) -> rust_decimal::Decimal {
        self.price.as_decimal() * self.size.as_decimal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade() -> Trade {
        Trade::new(
            OrderId::new(),
            OrderId::new(),
            TraderId::new("buyerpubkey11111111111111111111").unwrap(),
            TraderId::new("sellerpubkey2222222222222222222").unwrap(),
            Price::from_str("49.5").unwrap(),
            Quantity::from_str("5").unwrap(),
            1,
        )
    }

    #[test]
    fn test_happy_path() {
        let mut t = trade();
        assert_eq!(t.settlement_status, SettlementStatus::Pending);

        t.mark_queued(SubmissionRef::new("sig1")).unwrap();
        assert_eq!(t.settlement_status, SettlementStatus::Queued);
        assert_eq!(t.settlement_ref.as_ref().unwrap().as_str(), "sig1");

        assert!(t.mark_settled(2).unwrap());
        assert_eq!(t.settlement_status, SettlementStatus::Settled);
        assert_eq!(t.settled_at, Some(2));
    }

    #[test]
    fn test_settle_is_idempotent() {
        let mut t = trade();
        t.mark_queued(SubmissionRef::new("sig1")).unwrap();
        assert!(t.mark_settled(2).unwrap());
        // Second delivery changes nothing
        assert!(!t.mark_settled(99).unwrap());
        assert_eq!(t.settled_at, Some(2));
    }

    #[test]
    fn test_pending_cannot_settle() {
        let mut t = trade();
        assert!(matches!(
            t.mark_settled(2),
            Err(TradeError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_queued_can_fail() {
        let mut t = trade();
        t.mark_queued(SubmissionRef::new("sig1")).unwrap();
        t.mark_failed().unwrap();
        assert_eq!(t.settlement_status, SettlementStatus::Failed);
    }

    #[test]
    fn test_no_regression_from_terminal() {
        let mut t = trade();
        t.mark_queued(SubmissionRef::new("sig1")).unwrap();
        t.mark_settled(2).unwrap();
        assert!(t.mark_failed().is_err());
        assert!(t.mark_queued(SubmissionRef::new("sig2")).is_err());
    }

    #[test]
    fn test_pending_can_fail() {
        let mut t = trade();
        t.mark_failed().unwrap();
        assert!(t.settlement_status.is_terminal());
    }

    #[test]
    fn test_notional() {
        let t = trade();
        assert_eq!(
            t.notional(),
            rust_decimal::Decimal::from_str_exact("247.5").unwrap()
        );
    }
}
