//! Market data types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest price of an asset on one exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Exchange name (e.g., "Binance")
    pub exchange: String,
    /// Canonical asset symbol (e.g., "BTCUSDT")
    pub asset: String,
    /// Last price in quote currency
    pub price: Decimal,
    /// When the price was observed
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(exchange: impl Into<String>, asset: impl Into<String>, price: Decimal) -> Self {
        Self {
            exchange: exchange.into(),
            asset: asset.into(),
            price,
            observed_at: Utc::now(),
        }
    }
}

/// Resting volume near the top of the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityVolume {
    /// Base units resting on the bid side
    pub bid_volume: Decimal,
    /// Base units resting on the ask side
    pub ask_volume: Decimal,
    pub observed_at: DateTime<Utc>,
}
