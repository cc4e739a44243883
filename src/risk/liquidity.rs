//! Volume-based liquidity gate

use super::{LiquidityGate, LiquidityRejection};
use crate::config::LiquidityConfig;
use crate::feed::LiquidityView;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Passes a leg when both sides of its book carry more than the configured volume
pub struct VolumeLiquidityGate {
    view: Arc<dyn LiquidityView>,
    min_bid_volume: Decimal,
    min_ask_volume: Decimal,
}

impl VolumeLiquidityGate {
    /// Gate requiring any non-zero volume on both sides
    pub fn new(view: Arc<dyn LiquidityView>) -> Self {
        Self {
            view,
            min_bid_volume: Decimal::ZERO,
            min_ask_volume: Decimal::ZERO,
        }
    }

    pub fn from_config(view: Arc<dyn LiquidityView>, config: &LiquidityConfig) -> Self {
        Self {
            view,
            min_bid_volume: config.min_bid_volume,
            min_ask_volume: config.min_ask_volume,
        }
    }

    pub fn assess(&self, asset: &str, exchange: &str) -> Result<(), LiquidityRejection> {
        let volume = self
            .view
            .volume(exchange, asset)
            .ok_or(LiquidityRejection::NoData)?;

        if volume.bid_volume <= self.min_bid_volume {
            return Err(LiquidityRejection::ThinBids(volume.bid_volume));
        }
        if volume.ask_volume <= self.min_ask_volume {
            return Err(LiquidityRejection::ThinAsks(volume.ask_volume));
        }
        Ok(())
    }
}

impl LiquidityGate for VolumeLiquidityGate {
    fn check(&self, asset: &str, exchange: &str) -> bool {
        match self.assess(asset, exchange) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!(asset, exchange, %reason, "Liquidity gate rejected leg");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{LiquidityVolume, MarketSnapshot};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn snapshot_with(bid: Decimal, ask: Decimal) -> Arc<MarketSnapshot> {
        let mut snapshot = MarketSnapshot::new();
        snapshot.insert_liquidity(
            "Binance",
            "BTCUSDT",
            LiquidityVolume {
                bid_volume: bid,
                ask_volume: ask,
                observed_at: Utc::now(),
            },
        );
        Arc::new(snapshot)
    }

    #[test]
    fn test_positive_volume_passes() {
        let gate = VolumeLiquidityGate::new(snapshot_with(dec!(1), dec!(2)));
        assert!(gate.check("BTCUSDT", "Binance"));
    }

    #[test]
    fn test_missing_data_fails() {
        let gate = VolumeLiquidityGate::new(snapshot_with(dec!(1), dec!(2)));
        assert_eq!(
            gate.assess("BTCUSDT", "OKX"),
            Err(LiquidityRejection::NoData)
        );
        assert!(!gate.check("ETHUSDT", "Binance"));
    }

    #[test]
    fn test_zero_side_fails() {
        let gate = VolumeLiquidityGate::new(snapshot_with(dec!(0), dec!(2)));
        assert_eq!(
            gate.assess("BTCUSDT", "Binance"),
            Err(LiquidityRejection::ThinBids(dec!(0)))
        );

        let gate = VolumeLiquidityGate::new(snapshot_with(dec!(3), dec!(0)));
        assert_eq!(
            gate.assess("BTCUSDT", "Binance"),
            Err(LiquidityRejection::ThinAsks(dec!(0)))
        );
    }

    #[test]
    fn test_configured_minimums() {
        let config = LiquidityConfig {
            min_bid_volume: dec!(5),
            min_ask_volume: dec!(5),
            depth: 5,
        };
        let gate = VolumeLiquidityGate::from_config(snapshot_with(dec!(6), dec!(5)), &config);
        assert_eq!(
            gate.assess("BTCUSDT", "Binance"),
            Err(LiquidityRejection::ThinAsks(dec!(5)))
        );
    }
}
