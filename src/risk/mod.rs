//! Candidate gates
//!
//! Liquidity and risk checks a candidate must pass before it can become a
//! signal. Both are pass/fail; a failure disqualifies the candidate for the
//! current pass only.

mod limits;
mod liquidity;
mod types;

pub use limits::{FeeBudgetRiskGate, RiskLimits};
pub use liquidity::VolumeLiquidityGate;
pub use types::{LiquidityRejection, RiskRejection};

use rust_decimal::Decimal;

/// Liquidity check for one leg
pub trait LiquidityGate: Send + Sync {
    /// Whether `asset` on `exchange` has enough resting volume to trade
    fn check(&self, asset: &str, exchange: &str) -> bool;
}

/// Risk check for a buy/sell pair
pub trait RiskGate: Send + Sync {
    fn check(
        &self,
        asset: &str,
        buy_exchange: &str,
        sell_exchange: &str,
        buy_price: Decimal,
        sell_price: Decimal,
    ) -> bool;
}
