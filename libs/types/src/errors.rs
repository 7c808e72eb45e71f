//! Error taxonomy for the matching core
//!
//! Comprehensive error types using thiserror. Rejections that carry data
//! for the caller (margin shortfall) are structured, not stringly-typed.

use crate::trade::SettlementStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Order admission errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("Invalid price: must be positive")]
    InvalidPrice,

    #[error("Invalid size: must be positive")]
    InvalidSize,

    #[error("Invalid trader identity: {0}")]
    InvalidTrader(String),

    #[error("Insufficient margin: required {required}, equity {equity}")]
    MarginShortfall {
        equity: Decimal,
        required: Decimal,
        shortfall: Decimal,
    },

    #[error("Order not found: {order_id}")]
    NotFound { order_id: String },
}

/// Trade lifecycle errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("Invalid settlement transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: SettlementStatus,
        to: SettlementStatus,
    },

    #[error("Trade not found: {trade_id}")]
    NotFound { trade_id: String },
}

/// Persistence errors (non-fatal for live matching)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Settlement egress errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettlementError {
    #[error("Settlement submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Settlement layer unreachable: {0}")]
    Unreachable(String),

    #[error("Malformed settlement response: {0}")]
    MalformedResponse(String),
}
