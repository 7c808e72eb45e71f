//! Types library for the dark perps matching engine
//!
//! This library provides all core type definitions shared across the
//! matching, risk, settlement, and persistence services, ensuring type
//! safety and deterministic behavior.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, TradeId, TraderId, TraderHash, SubmissionRef)
//! - `numeric`: Fixed-point decimal types (Price, Quantity)
//! - `order`: Order lifecycle types
//! - `matching`: Transient match value produced by one matching step
//! - `trade`: Trade and settlement lifecycle types
//! - `position`: Position tracking types
//! - `errors`: Error taxonomy

pub mod errors;
pub mod ids;
pub mod matching;
pub mod numeric;
pub mod order;
pub mod position;
pub mod trade;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Current wall-clock time as Unix nanoseconds.
pub fn now_nanos() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::matching::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::position::*;
    pub use crate::trade::*;
}
