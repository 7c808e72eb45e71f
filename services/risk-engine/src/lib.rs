//! Margin and risk engine
//!
//! Gates every incoming order with an initial-margin check and evaluates
//! open accounts against the maintenance-margin liquidation threshold.
//! All dollar math is deterministic `Decimal` at the current mark price.

pub mod margin;
pub mod pricing;

pub use margin::{AccountSummary, LiquidationCheck, MarginCheck, MarginEngine, RiskConfig};
pub use pricing::{MarkPrice, MarkPriceStore, DEFAULT_SYMBOL};
