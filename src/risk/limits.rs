//! Fee, price-jump and settlement-time limits

use super::{RiskGate, RiskRejection};
use crate::config::RiskConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Risk budget for one arbitrage round trip
#[derive(Debug, Clone)]
pub struct RiskLimits {
    /// Maximum plausible spread in percent
    pub max_price_jump_pct: Decimal,
    /// Trading fee in percent
    pub trading_fee_pct: Decimal,
    /// Withdrawal fee in percent
    pub withdrawal_fee_pct: Decimal,
    /// Maximum combined fees in percent
    pub max_fee_pct: Decimal,
    /// Expected withdrawal time in minutes
    pub withdrawal_minutes: u32,
    /// Maximum withdrawal time in minutes
    pub max_withdrawal_minutes: u32,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_price_jump_pct: dec!(10),
            trading_fee_pct: dec!(0.1),
            withdrawal_fee_pct: dec!(0.2),
            max_fee_pct: dec!(0.5),
            withdrawal_minutes: 30,
            max_withdrawal_minutes: 60,
        }
    }
}

impl From<&RiskConfig> for RiskLimits {
    fn from(config: &RiskConfig) -> Self {
        Self {
            max_price_jump_pct: config.max_price_jump_percent,
            trading_fee_pct: config.trading_fee_percent,
            withdrawal_fee_pct: config.withdrawal_fee_percent,
            max_fee_pct: config.max_fee_percent,
            withdrawal_minutes: config.withdrawal_minutes,
            max_withdrawal_minutes: config.max_withdrawal_minutes,
        }
    }
}

impl RiskLimits {
    pub fn total_fee_pct(&self) -> Decimal {
        self.trading_fee_pct + self.withdrawal_fee_pct
    }
}

/// Risk gate applying [`RiskLimits`] to every pair
#[derive(Debug, Clone, Default)]
pub struct FeeBudgetRiskGate {
    limits: RiskLimits,
}

impl FeeBudgetRiskGate {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// First limit the pair breaks, if any
    pub fn assess(&self, buy_price: Decimal, sell_price: Decimal) -> Result<(), RiskRejection> {
        if buy_price.is_zero() {
            return Err(RiskRejection::ZeroBuyPrice);
        }

        let jump = sell_price
            .checked_sub(buy_price)
            .and_then(|gap| gap.abs().checked_div(buy_price))
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .ok_or(RiskRejection::PriceJumpOverflow)?;
        if jump > self.limits.max_price_jump_pct {
            return Err(RiskRejection::PriceJumpTooLarge(jump));
        }

        let fees = self.limits.total_fee_pct();
        if fees > self.limits.max_fee_pct {
            return Err(RiskRejection::FeesTooHigh(fees));
        }

        if self.limits.withdrawal_minutes > self.limits.max_withdrawal_minutes {
            return Err(RiskRejection::WithdrawalTooSlow(self.limits.withdrawal_minutes));
        }

        Ok(())
    }
}

impl RiskGate for FeeBudgetRiskGate {
    fn check(
        &self,
        asset: &str,
        buy_exchange: &str,
        sell_exchange: &str,
        buy_price: Decimal,
        sell_price: Decimal,
    ) -> bool {
        match self.assess(buy_price, sell_price) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!(
                    asset,
                    buy_exchange,
                    sell_exchange,
                    %reason,
                    "Risk gate rejected pair"
                );
                false
            }
        }
    }
}
