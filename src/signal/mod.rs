//! Signal generation module
//!
//! Turns raw cross-exchange spreads into a reconciled set of signals

mod reconciler;
mod scanner;
mod types;

pub use reconciler::{Action, ReconcileCounts, ReconcilePlan, SignalBatch, SignalReconciler};
pub use scanner::SpreadScanner;
pub use types::{ArbitrageSignal, Candidate, SignalClass, SignalKey};
