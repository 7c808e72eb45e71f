//! Persistence gateway
//!
//! Durable store contract for orders, trades, and positions, keyed by a
//! privacy-preserving deterministic hash of trader identity. In-memory
//! order book state stays authoritative for live matching; this layer is
//! authoritative only for restart recovery, so writes are best-effort from
//! the caller's perspective.

pub mod hashing;
pub mod store;

pub use hashing::TraderHasher;
pub use store::{MemoryStore, PlatformMetrics, Store};
