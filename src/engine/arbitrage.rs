//! Single-pass arbitrage detection

use super::{EngineError, PassReport};
use crate::config::EngineConfig;
use crate::feed::{OrderBookView, PriceView};
use crate::orderbook::{Direction, PriceImpactEstimator};
use crate::risk::{LiquidityGate, RiskGate};
use crate::signal::{Action, Candidate, SignalReconciler, SpreadScanner};
use crate::store::SignalStore;
use crate::telemetry::{self, GaugeMetric, LatencyMetric};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Thresholds one pass runs with
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Minimum spread (percent) to create a signal
    pub entry_threshold: Decimal,
    /// Minimum spread (percent) to keep one
    pub retention_threshold: Decimal,
    /// Both legs must estimate strictly below this impact (percent)
    pub impact_ceiling: Decimal,
    /// Notional walked through each leg's book
    pub probe_notional: Decimal,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            entry_threshold: dec!(3),
            retention_threshold: dec!(3),
            impact_ceiling: dec!(1.5),
            probe_notional: dec!(100),
        }
    }
}

impl From<&EngineConfig> for EngineSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            entry_threshold: config.entry_threshold_percent,
            retention_threshold: config.retention_threshold_percent,
            impact_ceiling: config.impact_ceiling_percent,
            probe_notional: config.probe_notional,
        }
    }
}

/// Result of gating one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Passed,
    Liquidity,
    Risk,
    Impact,
}

/// Scans, gates and reconciles on demand
pub struct ArbitrageEngine {
    prices: Arc<dyn PriceView>,
    books: Arc<dyn OrderBookView>,
    liquidity: Arc<dyn LiquidityGate>,
    risk: Arc<dyn RiskGate>,
    store: Arc<dyn SignalStore>,
    estimator: PriceImpactEstimator,
    scanner: SpreadScanner,
    reconciler: SignalReconciler,
    settings: EngineSettings,
    pass_lock: Mutex<()>,
}

impl ArbitrageEngine {
    pub fn new(
        settings: EngineSettings,
        prices: Arc<dyn PriceView>,
        books: Arc<dyn OrderBookView>,
        liquidity: Arc<dyn LiquidityGate>,
        risk: Arc<dyn RiskGate>,
        store: Arc<dyn SignalStore>,
    ) -> Self {
        Self {
            prices,
            books,
            liquidity,
            risk,
            store,
            estimator: PriceImpactEstimator::new(),
            scanner: SpreadScanner::new(settings.entry_threshold),
            reconciler: SignalReconciler::new(
                settings.entry_threshold,
                settings.retention_threshold,
            ),
            settings,
            pass_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn SignalStore> {
        &self.store
    }

    /// Gates cheapest first: liquidity on both legs, risk on the pair,
    /// then impact on both legs
    pub fn gate(&self, candidate: &Candidate) -> GateOutcome {
        let key = &candidate.key;

        if !self.liquidity.check(&key.asset, &key.buy_exchange)
            || !self.liquidity.check(&key.asset, &key.sell_exchange)
        {
            return GateOutcome::Liquidity;
        }

        if !self.risk.check(
            &key.asset,
            &key.buy_exchange,
            &key.sell_exchange,
            candidate.buy_price,
            candidate.sell_price,
        ) {
            return GateOutcome::Risk;
        }

        let buy_side = self
            .books
            .side(&key.buy_exchange, &key.asset, Direction::Buy);
        let buy_impact = self.estimator.estimate(
            buy_side.as_ref(),
            Direction::Buy,
            self.settings.probe_notional,
        );
        if buy_impact >= self.settings.impact_ceiling {
            debug!(%key, %buy_impact, "Buy leg impact too high");
            return GateOutcome::Impact;
        }

        let sell_side = self
            .books
            .side(&key.sell_exchange, &key.asset, Direction::Sell);
        let sell_impact = self.estimator.estimate(
            sell_side.as_ref(),
            Direction::Sell,
            self.settings.probe_notional,
        );
        if sell_impact >= self.settings.impact_ceiling {
            debug!(%key, %sell_impact, "Sell leg impact too high");
            return GateOutcome::Impact;
        }

        GateOutcome::Passed
    }

    /// Run one full pass and commit its writes atomically.
    ///
    /// Fails fast with [`EngineError::PassInProgress`] if another pass is
    /// running. A store failure aborts the pass with nothing applied.
    pub async fn run_pass(&self) -> Result<PassReport, EngineError> {
        let _guard = self
            .pass_lock
            .try_lock()
            .map_err(|_| EngineError::PassInProgress)?;

        let started_at = Utc::now();
        let timer = Instant::now();
        let mut report = PassReport::new(started_at);

        let evaluations = self.scanner.observe(self.prices.as_ref());
        report.assets_observed = evaluations.len();

        let existing = self.store.snapshot().await?;
        let mut survivors = Vec::with_capacity(evaluations.len());

        for candidate in evaluations {
            match self.reconciler.action(candidate.spread_pct) {
                // Can only delete; the reconciler decides
                Action::Drain => {
                    survivors.push(candidate);
                    continue;
                }
                Action::Retain if !existing.contains_key(&candidate.key) => {
                    report.skipped.spread += 1;
                    continue;
                }
                Action::Retain | Action::Upsert => {}
            }

            match self.gate(&candidate) {
                GateOutcome::Passed => {
                    report.qualifying += 1;
                    survivors.push(candidate);
                }
                GateOutcome::Liquidity => report.skipped.liquidity += 1,
                GateOutcome::Risk => report.skipped.risk += 1,
                GateOutcome::Impact => report.skipped.impact += 1,
            }
        }

        let plan = self.reconciler.reconcile(&survivors, &existing, started_at);
        let counts = plan.counts;

        let commit_timer = Instant::now();
        self.store.commit(plan.batch).await?;
        telemetry::record_latency(LatencyMetric::Commit, commit_timer.elapsed());

        report.skipped.spread += counts.skipped_by_spread;
        report.created = counts.created;
        report.updated = counts.updated;
        report.deleted = counts.deleted;
        report.unchanged = counts.unchanged;
        report.set_duration(timer.elapsed());

        let live = existing.len() + counts.created - counts.deleted;
        telemetry::record_pass(&report);
        telemetry::set_count_gauge(GaugeMetric::LiveSignals, live);

        info!(
            assets = report.assets_observed,
            qualifying = report.qualifying,
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            skipped_spread = report.skipped.spread,
            skipped_liquidity = report.skipped.liquidity,
            skipped_risk = report.skipped.risk,
            skipped_impact = report.skipped.impact,
            live_signals = live,
            duration_ms = report.duration_ms,
            "Pass complete"
        );

        Ok(report)
    }
}
