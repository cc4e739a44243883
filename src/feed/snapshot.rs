//! In-memory market snapshot
//!
//! Holds the latest quotes, books and liquidity volumes as materialized by
//! ingestion, and serves them through the read-only views.

use super::{
    ExchangeAdapter, LiquidityView, LiquidityVolume, OrderBookView, PriceView, Quote,
};
use crate::orderbook::{Direction, OrderBook, OrderBookSide};
use anyhow::Context;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Levels summed when liquidity is derived from a book
const DEFAULT_LIQUIDITY_DEPTH: usize = 5;

type MarketKey = (String, String);

fn key(exchange: &str, asset: &str) -> MarketKey {
    (exchange.to_string(), asset.to_string())
}

/// Explicit liquidity reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityEntry {
    pub exchange: String,
    pub asset: String,
    pub bid_volume: Decimal,
    pub ask_volume: Decimal,
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

/// Native exchange order book payload awaiting normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOrderBook {
    pub exchange: String,
    pub asset: String,
    pub payload: serde_json::Value,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Native ticker payload: one entry or an exchange's full ticker list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTicker {
    pub exchange: String,
    pub payload: serde_json::Value,
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

/// On-disk form of a snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotDocument {
    pub quotes: Vec<Quote>,
    pub order_books: Vec<OrderBook>,
    pub liquidity: Vec<LiquidityEntry>,
    pub raw_order_books: Vec<RawOrderBook>,
    pub raw_tickers: Vec<RawTicker>,
}

/// Point-in-time market state implementing every view the engine reads
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    quotes: HashMap<MarketKey, Quote>,
    books: HashMap<MarketKey, OrderBook>,
    liquidity: HashMap<MarketKey, LiquidityVolume>,
    liquidity_depth: usize,
}

impl Default for MarketSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketSnapshot {
    pub fn new() -> Self {
        Self {
            quotes: HashMap::new(),
            books: HashMap::new(),
            liquidity: HashMap::new(),
            liquidity_depth: DEFAULT_LIQUIDITY_DEPTH,
        }
    }

    /// Levels summed when no explicit liquidity reading exists
    pub fn with_liquidity_depth(mut self, depth: usize) -> Self {
        self.liquidity_depth = depth;
        self
    }

    /// Build from a document, normalizing raw books to `book_depth` levels
    ///
    /// Raw books and tickers that cannot be normalized are logged and left
    /// out; the affected legs then read as missing data.
    pub fn from_document(doc: SnapshotDocument, book_depth: usize) -> Self {
        let mut snapshot = Self::new();

        for quote in doc.quotes {
            snapshot.insert_quote(quote);
        }
        for book in doc.order_books {
            snapshot.insert_book(book);
        }
        for entry in doc.liquidity {
            snapshot.insert_liquidity(
                &entry.exchange,
                &entry.asset,
                LiquidityVolume {
                    bid_volume: entry.bid_volume,
                    ask_volume: entry.ask_volume,
                    observed_at: entry.observed_at,
                },
            );
        }
        for raw in doc.raw_order_books {
            let normalized = ExchangeAdapter::from_name(&raw.exchange)
                .and_then(|adapter| adapter.normalize_book(&raw.payload, book_depth));
            match normalized {
                Ok((bids, asks)) => snapshot.insert_book(OrderBook {
                    exchange: raw.exchange,
                    asset: raw.asset,
                    bids,
                    asks,
                    updated_at: raw.updated_at,
                }),
                Err(e) => {
                    tracing::warn!(
                        exchange = %raw.exchange,
                        asset = %raw.asset,
                        error = %e,
                        "Skipping unparsable order book"
                    );
                }
            }
        }

        for raw in doc.raw_tickers {
            snapshot.insert_raw_ticker(raw);
        }

        snapshot
    }

    fn insert_raw_ticker(&mut self, raw: RawTicker) {
        let adapter = match ExchangeAdapter::from_name(&raw.exchange) {
            Ok(adapter) => adapter,
            Err(e) => {
                tracing::warn!(exchange = %raw.exchange, error = %e, "Skipping ticker");
                return;
            }
        };
        let entries: Vec<&serde_json::Value> = match &raw.payload {
            serde_json::Value::Array(items) => items.iter().collect(),
            single => vec![single],
        };

        for entry in entries {
            match adapter.normalize_ticker(entry) {
                Ok((asset, price)) => self.insert_quote(Quote {
                    exchange: raw.exchange.clone(),
                    asset,
                    price,
                    observed_at: raw.observed_at,
                }),
                Err(e) => {
                    tracing::debug!(
                        exchange = %raw.exchange,
                        error = %e,
                        "Skipping unparsable ticker entry"
                    );
                }
            }
        }
    }

    /// Read and parse a JSON snapshot file
    pub fn load(path: impl AsRef<Path>, book_depth: usize) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read market snapshot {}", path.display()))?;
        let doc: SnapshotDocument = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse market snapshot {}", path.display()))?;
        Ok(Self::from_document(doc, book_depth))
    }

    /// Store a quote unless a newer one is already held
    pub fn insert_quote(&mut self, quote: Quote) {
        let k = key(&quote.exchange, &quote.asset);
        match self.quotes.get(&k) {
            Some(existing) if existing.observed_at > quote.observed_at => {}
            _ => {
                self.quotes.insert(k, quote);
            }
        }
    }

    pub fn insert_book(&mut self, book: OrderBook) {
        self.books.insert(key(&book.exchange, &book.asset), book);
    }

    pub fn insert_liquidity(&mut self, exchange: &str, asset: &str, volume: LiquidityVolume) {
        self.liquidity.insert(key(exchange, asset), volume);
    }

    pub fn book(&self, exchange: &str, asset: &str) -> Option<&OrderBook> {
        self.books.get(&key(exchange, asset))
    }

    pub fn quote_count(&self) -> usize {
        self.quotes.len()
    }
}

impl PriceView for MarketSnapshot {
    fn latest(&self, exchange: &str, asset: &str) -> Option<Decimal> {
        self.quotes.get(&key(exchange, asset)).map(|q| q.price)
    }

    fn all_quotes(&self) -> Vec<Quote> {
        self.quotes.values().cloned().collect()
    }
}

impl OrderBookView for MarketSnapshot {
    fn side(&self, exchange: &str, asset: &str, direction: Direction) -> Option<OrderBookSide> {
        self.book(exchange, asset)
            .map(|book| book.side(direction).clone())
    }
}

impl LiquidityView for MarketSnapshot {
    fn volume(&self, exchange: &str, asset: &str) -> Option<LiquidityVolume> {
        if let Some(volume) = self.liquidity.get(&key(exchange, asset)) {
            return Some(*volume);
        }
        self.book(exchange, asset).map(|book| LiquidityVolume {
            bid_volume: book.bids.volume(self.liquidity_depth),
            ask_volume: book.asks.volume(self.liquidity_depth),
            observed_at: book.updated_at,
        })
    }
}
