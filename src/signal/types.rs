//! Signal data types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Natural key of a signal: one live signal per (asset, buy leg, sell leg)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalKey {
    pub asset: String,
    pub buy_exchange: String,
    pub sell_exchange: String,
}

impl SignalKey {
    pub fn new(
        asset: impl Into<String>,
        buy_exchange: impl Into<String>,
        sell_exchange: impl Into<String>,
    ) -> Self {
        Self {
            asset: asset.into(),
            buy_exchange: buy_exchange.into(),
            sell_exchange: sell_exchange.into(),
        }
    }
}

impl fmt::Display for SignalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}->{}",
            self.asset, self.buy_exchange, self.sell_exchange
        )
    }
}

/// Extreme-pair evaluation of one asset in one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub key: SignalKey,
    /// Cheapest quote, the buy leg
    pub buy_price: Decimal,
    /// Richest quote, the sell leg
    pub sell_price: Decimal,
    /// (sell - buy) / buy * 100
    pub spread_pct: Decimal,
}

impl Candidate {
    pub fn asset(&self) -> &str {
        &self.key.asset
    }
}

/// Signal classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalClass {
    /// Same asset, two venues
    #[default]
    InterExchange,
}

impl fmt::Display for SignalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalClass::InterExchange => write!(f, "inter-exchange"),
        }
    }
}

/// A persisted arbitrage opportunity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrageSignal {
    /// Assigned at creation, stable across updates
    pub id: Uuid,
    pub asset: String,
    pub buy_exchange: String,
    pub sell_exchange: String,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    /// Spread in percent at the last qualifying pass
    pub spread_pct: Decimal,
    #[serde(default)]
    pub class: SignalClass,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArbitrageSignal {
    /// New signal from a qualifying candidate
    pub fn from_candidate(candidate: &Candidate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset: candidate.key.asset.clone(),
            buy_exchange: candidate.key.buy_exchange.clone(),
            sell_exchange: candidate.key.sell_exchange.clone(),
            buy_price: candidate.buy_price,
            sell_price: candidate.sell_price,
            spread_pct: candidate.spread_pct,
            class: SignalClass::InterExchange,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> SignalKey {
        SignalKey::new(&self.asset, &self.buy_exchange, &self.sell_exchange)
    }

    /// Whether the candidate carries exactly the stored prices and spread
    pub fn matches(&self, candidate: &Candidate) -> bool {
        self.buy_price == candidate.buy_price
            && self.sell_price == candidate.sell_price
            && self.spread_pct == candidate.spread_pct
    }

    /// Copy with the candidate's prices; key, id and created_at are kept
    pub fn refreshed(&self, candidate: &Candidate, now: DateTime<Utc>) -> Self {
        Self {
            buy_price: candidate.buy_price,
            sell_price: candidate.sell_price,
            spread_pct: candidate.spread_pct,
            updated_at: now,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candidate(sell: Decimal) -> Candidate {
        Candidate {
            key: SignalKey::new("BTCUSDT", "Binance", "OKX"),
            buy_price: dec!(100),
            sell_price: sell,
            spread_pct: sell - dec!(100),
        }
    }

    #[test]
    fn test_refresh_keeps_identity() {
        let created = Utc::now();
        let signal = ArbitrageSignal::from_candidate(&candidate(dec!(104)), created);
        let later = created + chrono::Duration::seconds(10);
        let refreshed = signal.refreshed(&candidate(dec!(105)), later);

        assert_eq!(refreshed.id, signal.id);
        assert_eq!(refreshed.key(), signal.key());
        assert_eq!(refreshed.created_at, created);
        assert_eq!(refreshed.updated_at, later);
        assert_eq!(refreshed.spread_pct, dec!(5));
        assert!(!signal.matches(&candidate(dec!(105))));
        assert!(refreshed.matches(&candidate(dec!(105))));
    }

    #[test]
    fn test_class_serializes_kebab_case() {
        let json = serde_json::to_string(&SignalClass::InterExchange).unwrap();
        assert_eq!(json, "\"inter-exchange\"");
    }

    #[test]
    fn test_key_display() {
        let key = SignalKey::new("ETHUSDT", "Bybit", "KuCoin");
        assert_eq!(key.to_string(), "ETHUSDT Bybit->KuCoin");
    }
}
