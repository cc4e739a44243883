//! JSON file signal store
//!
//! Each commit writes the full set to a sibling temp file and renames it over
//! the target, so the file on disk is always a complete committed set.

use super::{apply_batch, SignalStore, StoreError};
use crate::signal::{ArbitrageSignal, SignalBatch, SignalKey};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Signal set persisted as a JSON array
pub struct JsonFileStore {
    path: PathBuf,
    signals: RwLock<HashMap<SignalKey, ArbitrageSignal>>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading any committed set already there
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let signals = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let rows: Vec<ArbitrageSignal> = serde_json::from_slice(&bytes)?;
                rows.into_iter().map(|s| (s.key(), s)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), signals = signals.len(), "Opened signal store");

        Ok(Self {
            path,
            signals: RwLock::new(signals),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "signals.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write(&self, signals: &HashMap<SignalKey, ArbitrageSignal>) -> Result<(), StoreError> {
        let mut rows: Vec<&ArbitrageSignal> = signals.values().collect();
        rows.sort_by(|a, b| {
            (&a.asset, &a.buy_exchange, &a.sell_exchange)
                .cmp(&(&b.asset, &b.buy_exchange, &b.sell_exchange))
        });
        let bytes = serde_json::to_vec_pretty(&rows)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!(path = %self.path.display(), signals = rows.len(), "Wrote signal store");
        Ok(())
    }
}

#[async_trait]
impl SignalStore for JsonFileStore {
    async fn snapshot(&self) -> Result<HashMap<SignalKey, ArbitrageSignal>, StoreError> {
        Ok(self.signals.read().await.clone())
    }

    async fn commit(&self, batch: SignalBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut signals = self.signals.write().await;
        let next = apply_batch(&signals, &batch)?;
        // Disk first; memory only moves once the file is in place
        self.write(&next).await?;
        *signals = next;
        Ok(())
    }
}
