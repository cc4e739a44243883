//! Order book module
//!
//! Bid/ask ladders per (exchange, asset) and the depth-walk price impact estimator

mod book;
mod impact;

pub use book::OrderBook;
pub use impact::{ImpactEstimate, PriceImpactEstimator, UNUSABLE_IMPACT_PCT};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price level in the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Price at this level
    pub price: Decimal,
    /// Quantity available, in base units
    pub quantity: Decimal,
}

impl PriceLevel {
    pub fn new(price: Decimal, quantity: Decimal) -> Self {
        Self { price, quantity }
    }
}

/// Taker direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Lift the asks
    Buy,
    /// Hit the bids
    Sell,
}

impl Direction {
    /// Whether `next` is at least as costly to the taker as `prev`
    fn is_ordered(self, prev: Decimal, next: Decimal) -> bool {
        match self {
            Direction::Buy => next >= prev,
            Direction::Sell => next <= prev,
        }
    }
}

/// One side of a book, best price first
///
/// Asks are ascending and bids descending, so that walking the levels in
/// order always increases the cost to the taker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderBookSide {
    levels: Vec<PriceLevel>,
}

impl OrderBookSide {
    pub fn new(levels: Vec<PriceLevel>) -> Self {
        Self { levels }
    }

    /// Build from `(price, quantity)` pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Decimal, Decimal)>,
    {
        Self {
            levels: pairs
                .into_iter()
                .map(|(price, quantity)| PriceLevel { price, quantity })
                .collect(),
        }
    }

    pub fn levels(&self) -> &[PriceLevel] {
        &self.levels
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Top-of-book price
    pub fn best_price(&self) -> Option<Decimal> {
        self.levels.first().map(|l| l.price)
    }

    /// Sum of quantity over the first `depth` levels
    pub fn volume(&self, depth: usize) -> Decimal {
        self.levels.iter().take(depth).map(|l| l.quantity).sum()
    }

    /// Keep at most `depth` levels
    pub fn truncate(&mut self, depth: usize) {
        self.levels.truncate(depth);
    }

    /// Whether levels are sorted by increasing taker cost for `direction`
    pub fn is_sorted_for(&self, direction: Direction) -> bool {
        self.levels
            .windows(2)
            .all(|w| direction.is_ordered(w[0].price, w[1].price))
    }
}
