//! Periodic pass driver

use super::{ArbitrageEngine, EngineError};
use crate::feed::SnapshotRefresher;
use crate::telemetry::{self, LatencyMetric};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Runs engine passes on a fixed interval until shutdown
pub struct Scheduler {
    engine: Arc<ArbitrageEngine>,
    interval: Duration,
    max_passes: Option<u64>,
    refresher: Option<Arc<SnapshotRefresher>>,
}

impl Scheduler {
    pub fn new(engine: Arc<ArbitrageEngine>, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            max_passes: None,
            refresher: None,
        }
    }

    /// Stop after this many attempted passes
    pub fn with_max_passes(mut self, max_passes: Option<u64>) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Reload market data before every pass
    pub fn with_refresher(mut self, refresher: Arc<SnapshotRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Drive passes until `shutdown` flips to true or the pass budget runs out.
    ///
    /// Passes run inline, so a tick that lands during a pass is skipped
    /// rather than queued. Failed passes are logged and retried on the next
    /// tick. Returns the number of attempted passes.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut attempted = 0u64;
        info!(
            interval_secs = self.interval.as_secs_f64(),
            max_passes = ?self.max_passes,
            "Scheduler started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            if self.max_passes.is_some_and(|max| attempted >= max) {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    // Sender dropped counts as shutdown
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    attempted += 1;
                    self.tick(attempted).await;
                }
            }
        }

        info!(passes = attempted, "Scheduler stopped");
        attempted
    }

    async fn tick(&self, pass: u64) {
        if let Some(refresher) = &self.refresher {
            let timer = Instant::now();
            let refreshed = refresher.refresh().await;
            telemetry::record_latency(LatencyMetric::FeedRefresh, timer.elapsed());
            telemetry::set_feed_health(&refresher.health());

            if let Err(e) = refreshed {
                warn!(pass, error = %e, health = ?refresher.health(), "Market refresh failed, skipping pass");
                telemetry::record_failed_pass();
                return;
            }
        }

        match self.engine.run_pass().await {
            Ok(_) => {}
            Err(EngineError::PassInProgress) => {
                warn!(pass, "Previous pass still running, skipping tick");
            }
            Err(e) => {
                warn!(pass, error = %e, "Pass failed, retrying next tick");
                telemetry::record_failed_pass();
            }
        }
    }
}
