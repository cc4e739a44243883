//! Per-exchange payload normalization
//!
//! Every supported exchange has one variant. Each variant knows where its
//! native REST payloads keep book levels and ticker prices, and maps them
//! into the canonical shapes the engine reads.

use crate::orderbook::OrderBookSide;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Payload normalization errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Invalid book level: {0}")]
    InvalidLevel(String),
}

/// Supported exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExchangeAdapter {
    Binance,
    Bybit,
    KuCoin,
    Okx,
    Mexc,
    Gateio,
    Bitget,
    Htx,
    Poloniex,
}

impl ExchangeAdapter {
    pub const ALL: [ExchangeAdapter; 9] = [
        ExchangeAdapter::Binance,
        ExchangeAdapter::Bybit,
        ExchangeAdapter::KuCoin,
        ExchangeAdapter::Okx,
        ExchangeAdapter::Mexc,
        ExchangeAdapter::Gateio,
        ExchangeAdapter::Bitget,
        ExchangeAdapter::Htx,
        ExchangeAdapter::Poloniex,
    ];

    /// Resolve an exchange by name, case-insensitively
    pub fn from_name(name: &str) -> Result<Self, AdapterError> {
        match name.to_ascii_lowercase().as_str() {
            "binance" => Ok(Self::Binance),
            "bybit" => Ok(Self::Bybit),
            "kucoin" => Ok(Self::KuCoin),
            "okx" => Ok(Self::Okx),
            "mexc" => Ok(Self::Mexc),
            "gateio" | "gate.io" | "gate" => Ok(Self::Gateio),
            "bitget" => Ok(Self::Bitget),
            "htx" | "huobi" => Ok(Self::Htx),
            "poloniex" => Ok(Self::Poloniex),
            _ => Err(AdapterError::UnknownExchange(name.to_string())),
        }
    }

    /// Display name used as the exchange key in quotes and signals
    pub fn name(&self) -> &'static str {
        match self {
            Self::Binance => "Binance",
            Self::Bybit => "Bybit",
            Self::KuCoin => "KuCoin",
            Self::Okx => "OKX",
            Self::Mexc => "MEXC",
            Self::Gateio => "Gateio",
            Self::Bitget => "Bitget",
            Self::Htx => "HTX",
            Self::Poloniex => "Poloniex",
        }
    }

    /// Map a native order book payload into `(bids, asks)`, keeping `depth` levels
    pub fn normalize_book(
        &self,
        payload: &Value,
        depth: usize,
    ) -> Result<(OrderBookSide, OrderBookSide), AdapterError> {
        let root = match self {
            Self::Binance | Self::Mexc | Self::Gateio | Self::Poloniex => payload,
            Self::Bybit => field(payload, "result")?,
            Self::KuCoin | Self::Bitget => field(payload, "data")?,
            Self::Okx => field(payload, "data")?
                .get(0)
                .ok_or(AdapterError::MissingField("data[0]"))?,
            Self::Htx => field(payload, "tick")?,
        };
        let (bid_key, ask_key) = match self {
            Self::Bybit => ("b", "a"),
            _ => ("bids", "asks"),
        };

        let mut bids = parse_side(field(root, bid_key)?)?;
        let mut asks = parse_side(field(root, ask_key)?)?;
        bids.truncate(depth);
        asks.truncate(depth);
        Ok((bids, asks))
    }

    /// Map one native ticker entry into `(canonical symbol, last price)`
    pub fn normalize_ticker(&self, ticker: &Value) -> Result<(String, Decimal), AdapterError> {
        let (symbol_key, price_key) = match self {
            Self::Binance | Self::Mexc | Self::Poloniex => ("symbol", "price"),
            Self::Bybit => ("symbol", "lastPrice"),
            Self::Bitget => ("symbol", "lastPr"),
            Self::Gateio => ("currency_pair", "last"),
            Self::Htx => ("symbol", "close"),
            Self::KuCoin => ("symbol", "last"),
            Self::Okx => ("instId", "last"),
        };

        let symbol = field(ticker, symbol_key)?
            .as_str()
            .ok_or(AdapterError::MissingField(symbol_key))?
            .replace(['-', '_'], "")
            .to_uppercase();
        let price = parse_decimal(field(ticker, price_key)?)?;
        Ok((symbol, price))
    }
}

impl fmt::Display for ExchangeAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExchangeAdapter {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

fn field<'a>(value: &'a Value, key: &'static str) -> Result<&'a Value, AdapterError> {
    value.get(key).ok_or(AdapterError::MissingField(key))
}

/// Levels arrive either as `[price, qty, ...]` arrays or `{price, size}` objects
fn parse_side(levels: &Value) -> Result<OrderBookSide, AdapterError> {
    let levels = levels
        .as_array()
        .ok_or_else(|| AdapterError::InvalidLevel(levels.to_string()))?;

    let mut pairs = Vec::with_capacity(levels.len());
    for level in levels {
        let (price, quantity) = match level {
            Value::Array(items) if items.len() >= 2 => (&items[0], &items[1]),
            Value::Object(_) => (field(level, "price")?, field(level, "size")?),
            other => return Err(AdapterError::InvalidLevel(other.to_string())),
        };
        pairs.push((parse_decimal(price)?, parse_decimal(quantity)?));
    }
    Ok(OrderBookSide::from_pairs(pairs))
}

fn parse_decimal(value: &Value) -> Result<Decimal, AdapterError> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => return Err(AdapterError::InvalidNumber(other.to_string())),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| AdapterError::InvalidNumber(text))
}
