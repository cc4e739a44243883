//! arb-signal-engine: cross-exchange arbitrage signal detection
//!
//! Periodically compares the latest prices of each asset across exchanges,
//! filters the widest spreads through liquidity, risk and price-impact gates,
//! and keeps a reconciled set of live signals in a store.

pub mod cli;
pub mod config;
pub mod engine;
pub mod feed;
pub mod orderbook;
pub mod risk;
pub mod signal;
pub mod store;
pub mod telemetry;
