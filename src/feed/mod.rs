//! Market data views
//!
//! Read-only access to prices, order books and liquidity that ingestion has
//! already materialized. The engine never fetches anything itself.

mod adapter;
mod backoff;
mod live;
mod snapshot;
mod types;

pub use adapter::{AdapterError, ExchangeAdapter};
pub use backoff::{retry_with_backoff, Backoff, BackoffPolicy, FeedHealth, HealthMonitor};
pub use live::{LiveMarket, SnapshotRefresher};
pub use snapshot::{LiquidityEntry, MarketSnapshot, RawOrderBook, RawTicker, SnapshotDocument};
pub use types::{LiquidityVolume, Quote};

use crate::orderbook::{Direction, OrderBookSide};
use rust_decimal::Decimal;

/// Latest known price per (exchange, asset)
pub trait PriceView: Send + Sync {
    /// Latest price for one exchange and asset
    fn latest(&self, exchange: &str, asset: &str) -> Option<Decimal>;
    /// Every latest quote across all exchanges and assets
    fn all_quotes(&self) -> Vec<Quote>;
}

/// Top-N ladder per (exchange, asset)
pub trait OrderBookView: Send + Sync {
    /// Side a taker walks for `direction`: asks for buys, bids for sells.
    /// Returns an owned copy so a walk never observes a half-applied update.
    fn side(&self, exchange: &str, asset: &str, direction: Direction) -> Option<OrderBookSide>;
}

/// Most recent bid/ask volume per (exchange, asset)
pub trait LiquidityView: Send + Sync {
    fn volume(&self, exchange: &str, asset: &str) -> Option<LiquidityVolume>;
}
