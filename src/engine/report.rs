//! Per-pass counters

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Candidates dropped in a pass, by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounters {
    pub spread: usize,
    pub liquidity: usize,
    pub risk: usize,
    pub impact: usize,
}

impl SkipCounters {
    pub fn total(&self) -> usize {
        self.spread + self.liquidity + self.risk + self.impact
    }
}

/// Outcome of one committed pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Assets quoted on at least two exchanges
    pub assets_observed: usize,
    /// Candidates that passed every gate
    pub qualifying: usize,
    pub skipped: SkipCounters,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Matched a stored signal exactly, nothing written
    pub unchanged: usize,
}

impl PassReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            duration_ms: 0,
            assets_observed: 0,
            qualifying: 0,
            skipped: SkipCounters::default(),
            created: 0,
            updated: 0,
            deleted: 0,
            unchanged: 0,
        }
    }

    /// Record the pass duration, saturating at `u64::MAX` milliseconds
    pub fn set_duration(&mut self, elapsed: Duration) {
        self.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    }

    /// Whether the pass changed the persisted set
    pub fn has_writes(&self) -> bool {
        self.created + self.updated + self.deleted > 0
    }
}
