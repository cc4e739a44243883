//! Cross-exchange spread scanner
//!
//! Groups the latest quotes by asset and compares only the two extremes: the
//! cheapest exchange is the buy leg, the richest the sell leg.

use super::{Candidate, SignalKey};
use crate::feed::{PriceView, Quote};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, HashMap};

/// Finds the widest spread per asset
#[derive(Debug, Clone)]
pub struct SpreadScanner {
    entry_threshold: Decimal,
}

impl Default for SpreadScanner {
    fn default() -> Self {
        Self::new(dec!(3))
    }
}

impl SpreadScanner {
    pub fn new(entry_threshold: Decimal) -> Self {
        Self { entry_threshold }
    }

    pub fn entry_threshold(&self) -> Decimal {
        self.entry_threshold
    }

    /// Extreme-pair evaluation for every asset quoted on at least two
    /// exchanges, regardless of spread. Sorted by asset.
    pub fn observe(&self, prices: &dyn PriceView) -> Vec<Candidate> {
        let mut by_asset: BTreeMap<String, HashMap<String, Quote>> = BTreeMap::new();

        for quote in prices.all_quotes() {
            if quote.price.is_sign_negative() {
                tracing::trace!(
                    exchange = %quote.exchange,
                    asset = %quote.asset,
                    price = %quote.price,
                    "Ignoring negative quote"
                );
                continue;
            }
            let exchanges = by_asset.entry(quote.asset.clone()).or_default();
            match exchanges.get(&quote.exchange) {
                Some(held) if held.observed_at > quote.observed_at => {}
                _ => {
                    exchanges.insert(quote.exchange.clone(), quote);
                }
            }
        }

        by_asset
            .into_iter()
            .filter_map(|(asset, exchanges)| extreme_pair(asset, exchanges))
            .collect()
    }

    /// Candidates whose spread reaches the entry threshold
    pub fn scan(&self, prices: &dyn PriceView) -> Vec<Candidate> {
        self.observe(prices)
            .into_iter()
            .filter(|c| c.spread_pct >= self.entry_threshold)
            .collect()
    }
}

fn extreme_pair(asset: String, exchanges: HashMap<String, Quote>) -> Option<Candidate> {
    if exchanges.len() < 2 {
        return None;
    }

    let mut quotes: Vec<Quote> = exchanges.into_values().collect();
    // Price ascending, exchange name breaks ties
    quotes.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.exchange.cmp(&b.exchange)));

    let buy = quotes.first()?;
    let top = quotes.last()?.price;
    let sell = quotes.iter().skip(1).find(|q| q.price == top)?;

    if buy.price.is_zero() {
        return None;
    }

    let spread_pct = match sell
        .price
        .checked_sub(buy.price)
        .and_then(|gap| gap.checked_div(buy.price))
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
    {
        Some(spread) => spread,
        None => {
            tracing::debug!(
                asset = %asset,
                buy_price = %buy.price,
                sell_price = %sell.price,
                "Spread overflows, skipping asset"
            );
            return None;
        }
    };

    Some(Candidate {
        key: SignalKey::new(asset, buy.exchange.clone(), sell.exchange.clone()),
        buy_price: buy.price,
        sell_price: sell.price,
        spread_pct,
    })
}
