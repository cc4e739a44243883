//! Signal persistence
//!
//! The persisted signal set is the only shared mutable state of the engine.
//! Every store applies a [`SignalBatch`] all-or-nothing: readers see the set
//! before the batch or after it, never in between.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemorySignalStore;

use crate::signal::{ArbitrageSignal, SignalBatch, SignalKey};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Batch both upserts and deletes {0}")]
    ConflictingBatch(SignalKey),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Durable home of the signal set
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Committed signals keyed by natural key
    async fn snapshot(&self) -> Result<HashMap<SignalKey, ArbitrageSignal>, StoreError>;
    /// Apply upserts and deletes as one unit
    async fn commit(&self, batch: SignalBatch) -> Result<(), StoreError>;
}

/// Next state after `batch`, leaving `current` untouched.
/// Rejects a batch that touches a key twice in opposite directions.
pub(crate) fn apply_batch(
    current: &HashMap<SignalKey, ArbitrageSignal>,
    batch: &SignalBatch,
) -> Result<HashMap<SignalKey, ArbitrageSignal>, StoreError> {
    let deleted: HashSet<&SignalKey> = batch.deletes.iter().collect();
    let mut next = current.clone();

    for key in &batch.deletes {
        next.remove(key);
    }
    for signal in &batch.upserts {
        let key = signal.key();
        if deleted.contains(&key) {
            return Err(StoreError::ConflictingBatch(key));
        }
        next.insert(key, signal.clone());
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Candidate;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn signal(asset: &str) -> ArbitrageSignal {
        let candidate = Candidate {
            key: SignalKey::new(asset, "A", "B"),
            buy_price: dec!(100),
            sell_price: dec!(104),
            spread_pct: dec!(4),
        };
        ArbitrageSignal::from_candidate(&candidate, Utc::now())
    }

    #[test]
    fn test_apply_batch() {
        let mut current = HashMap::new();
        let btc = signal("BTC");
        current.insert(btc.key(), btc.clone());

        let batch = SignalBatch {
            upserts: vec![signal("ETH")],
            deletes: vec![btc.key()],
        };
        let next = apply_batch(&current, &batch).unwrap();

        assert_eq!(next.len(), 1);
        assert!(next.contains_key(&SignalKey::new("ETH", "A", "B")));
        assert_eq!(current.len(), 1);
    }

    #[test]
    fn test_conflicting_batch_rejected() {
        let btc = signal("BTC");
        let batch = SignalBatch {
            upserts: vec![btc.clone()],
            deletes: vec![btc.key()],
        };
        let result = apply_batch(&HashMap::new(), &batch);
        assert!(matches!(result, Err(StoreError::ConflictingBatch(k)) if k == btc.key()));
    }
}
