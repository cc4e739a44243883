//! Arbitrage detection engine
//!
//! One pass = scan the latest prices, gate each candidate, reconcile the
//! survivors against the persisted signal set and commit the result as one
//! unit. The [`Scheduler`] drives passes on a fixed interval.

mod arbitrage;
mod report;
mod scheduler;

pub use arbitrage::{ArbitrageEngine, EngineSettings, GateOutcome};
pub use report::{PassReport, SkipCounters};
pub use scheduler::Scheduler;

use crate::store::StoreError;
use thiserror::Error;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Another pass holds the engine
    #[error("A pass is already in progress")]
    PassInProgress,
    /// Reading or committing the signal set failed; nothing was applied
    #[error("Signal store error: {0}")]
    Store(#[from] StoreError),
}
