//! Swappable market state shared between ingestion and the engine

use super::{
    retry_with_backoff, BackoffPolicy, FeedHealth, HealthMonitor, LiquidityView,
    LiquidityVolume, MarketSnapshot, OrderBookView, PriceView, Quote,
};
use crate::orderbook::{Direction, OrderBookSide};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Latest market snapshot, replaced wholesale by ingestion
///
/// Readers clone the current `Arc` and work on it, so a single lookup never
/// observes a partially applied update. Consecutive lookups within one pass
/// may straddle a swap.
#[derive(Debug, Default)]
pub struct LiveMarket {
    current: RwLock<Arc<MarketSnapshot>>,
}

impl LiveMarket {
    pub fn new(snapshot: MarketSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Install a new snapshot
    pub fn replace(&self, snapshot: MarketSnapshot) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(snapshot);
    }

    /// Current snapshot
    pub fn current(&self) -> Arc<MarketSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl PriceView for LiveMarket {
    fn latest(&self, exchange: &str, asset: &str) -> Option<Decimal> {
        self.current().latest(exchange, asset)
    }

    fn all_quotes(&self) -> Vec<Quote> {
        self.current().all_quotes()
    }
}

impl OrderBookView for LiveMarket {
    fn side(&self, exchange: &str, asset: &str, direction: Direction) -> Option<OrderBookSide> {
        self.current().side(exchange, asset, direction)
    }
}

impl LiquidityView for LiveMarket {
    fn volume(&self, exchange: &str, asset: &str) -> Option<LiquidityVolume> {
        self.current().volume(exchange, asset)
    }
}

/// Reloads a [`LiveMarket`] from the snapshot file ingestion keeps current
pub struct SnapshotRefresher {
    market: Arc<LiveMarket>,
    path: PathBuf,
    book_depth: usize,
    liquidity_depth: usize,
    policy: BackoffPolicy,
    health: HealthMonitor,
}

impl SnapshotRefresher {
    pub fn new(
        market: Arc<LiveMarket>,
        path: impl AsRef<Path>,
        book_depth: usize,
        liquidity_depth: usize,
        policy: BackoffPolicy,
    ) -> Self {
        Self {
            market,
            path: path.as_ref().to_path_buf(),
            book_depth,
            liquidity_depth,
            policy,
            health: HealthMonitor::new(),
        }
    }

    pub fn health(&self) -> FeedHealth {
        self.health.status()
    }

    /// Re-read the snapshot, retrying with backoff. On failure the market
    /// keeps its previous snapshot.
    pub async fn refresh(&self) -> anyhow::Result<()> {
        let snapshot = retry_with_backoff(&self.policy, &self.health, "market_snapshot", || {
            let path = self.path.clone();
            let depth = self.book_depth;
            async move {
                match tokio::task::spawn_blocking(move || MarketSnapshot::load(&path, depth)).await
                {
                    Ok(loaded) => loaded,
                    Err(e) => Err(anyhow::Error::from(e)),
                }
            }
        })
        .await?;

        tracing::debug!(
            path = %self.path.display(),
            quotes = snapshot.quote_count(),
            "Market snapshot refreshed"
        );
        self.market
            .replace(snapshot.with_liquidity_depth(self.liquidity_depth));
        Ok(())
    }
}
