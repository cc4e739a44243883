//! Gate rejection types

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Why a pair failed the risk gate
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum RiskRejection {
    /// Spread so wide it is more likely bad data than opportunity
    #[error("Price jump too large: {}%", .0.round_dp(4))]
    PriceJumpTooLarge(Decimal),
    /// Jump does not fit in a decimal
    #[error("Price jump overflows")]
    PriceJumpOverflow,
    /// Fees eat the budget
    #[error("Fees too high: {0}%")]
    FeesTooHigh(Decimal),
    /// Moving funds between exchanges takes too long
    #[error("Withdrawal too slow: {0} minutes")]
    WithdrawalTooSlow(u32),
    #[error("Zero buy price")]
    ZeroBuyPrice,
}

/// Why a leg failed the liquidity gate
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum LiquidityRejection {
    #[error("No liquidity data")]
    NoData,
    #[error("Bid volume too thin: {0}")]
    ThinBids(Decimal),
    #[error("Ask volume too thin: {0}")]
    ThinAsks(Decimal),
}
