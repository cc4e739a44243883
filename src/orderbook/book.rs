//! Order book state

use super::{Direction, OrderBookSide};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// L2 aggregated order book for one asset on one exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    /// Exchange name
    pub exchange: String,
    /// Canonical asset symbol (e.g. "BTCUSDT")
    pub asset: String,
    /// Bid levels, sorted best (highest) to worst
    #[serde(default)]
    pub bids: OrderBookSide,
    /// Ask levels, sorted best (lowest) to worst
    #[serde(default)]
    pub asks: OrderBookSide,
    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new(exchange: impl Into<String>, asset: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            asset: asset.into(),
            bids: OrderBookSide::default(),
            asks: OrderBookSide::default(),
            updated_at: Utc::now(),
        }
    }

    /// Side a taker walks for the given direction: asks to buy, bids to sell
    pub fn side(&self, direction: Direction) -> &OrderBookSide {
        match direction {
            Direction::Buy => &self.asks,
            Direction::Sell => &self.bids,
        }
    }
}
