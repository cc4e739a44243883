//! In-memory signal store

use super::{apply_batch, SignalStore, StoreError};
use crate::signal::{ArbitrageSignal, SignalBatch, SignalKey};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Signal set held in process memory
#[derive(Clone, Default)]
pub struct MemorySignalStore {
    signals: Arc<RwLock<HashMap<SignalKey, ArbitrageSignal>>>,
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.signals.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.signals.read().await.is_empty()
    }
}

#[async_trait]
impl SignalStore for MemorySignalStore {
    async fn snapshot(&self) -> Result<HashMap<SignalKey, ArbitrageSignal>, StoreError> {
        Ok(self.signals.read().await.clone())
    }

    async fn commit(&self, batch: SignalBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut signals = self.signals.write().await;
        *signals = apply_batch(&signals, &batch)?;
        Ok(())
    }
}
