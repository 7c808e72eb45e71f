//! Privacy-preserving trader identity hashing
//!
//! The same trader always hashes to the same key (deterministic), but the
//! raw identity cannot be recovered from stored records. SHA-256 over
//! pubkey + salt, hex-encoded.

use sha2::{Digest, Sha256};
use types::ids::{TraderHash, TraderId};

/// Deterministic hasher with a deployment-scoped salt.
#[derive(Debug, Clone)]
pub struct TraderHasher {
    salt: String,
}

impl TraderHasher {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Hash a trader identity into its storage key.
    pub fn hash(&self, trader: &TraderId) -> TraderHash {
        let mut hasher = Sha256::new();
        hasher.update(trader.as_str().as_bytes());
        hasher.update(self.salt.as_bytes());
        TraderHash::from_hex(hex::encode(hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trader(key: &str) -> TraderId {
        TraderId::new(key).unwrap()
    }

    #[test]
    fn test_deterministic() {
        let hasher = TraderHasher::new("test-salt");
        let t = trader("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin");
        assert_eq!(hasher.hash(&t), hasher.hash(&t));
    }

    #[test]
    fn test_distinct_traders_distinct_hashes() {
        let hasher = TraderHasher::new("test-salt");
        assert_ne!(
            hasher.hash(&trader("trader-a-key-111111111111111111")),
            hasher.hash(&trader("trader-b-key-222222222222222222"))
        );
    }

    #[test]
    fn test_salt_changes_hash() {
        let t = trader("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin");
        assert_ne!(
            TraderHasher::new("salt-a").hash(&t),
            TraderHasher::new("salt-b").hash(&t)
        );
    }

    #[test]
    fn test_hash_does_not_leak_identity() {
        let hasher = TraderHasher::new("test-salt");
        let t = trader("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin");
        let hash = hasher.hash(&t);
        assert!(!hash.as_str().contains("9xQeWvG8"));
        assert_eq!(hash.as_str().len(), 64); // hex SHA-256
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hash_is_deterministic_and_fixed_width(
                key in "[A-Za-z0-9]{1,64}",
                salt in "[a-z]{1,16}",
            ) {
                let hasher = TraderHasher::new(salt);
                let t = TraderId::new(key).unwrap();
                let first = hasher.hash(&t);
                prop_assert_eq!(&first, &hasher.hash(&t));
                prop_assert_eq!(first.as_str().len(), 64);
            }
        }
    }
}
