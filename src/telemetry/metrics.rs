//! Prometheus metrics

use crate::engine::PassReport;
use crate::feed::FeedHealth;
use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Full engine pass
    Pass,
    /// Market snapshot reload
    FeedRefresh,
    /// Signal store commit
    Commit,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Signals currently persisted
    LiveSignals,
    /// Assets quoted on two or more exchanges in the last pass
    ObservedAssets,
    /// 0 healthy, 1 degraded, 2 down
    FeedHealth,
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::Pass => "arbsig_pass_duration_ms",
        LatencyMetric::FeedRefresh => "arbsig_feed_refresh_duration_ms",
        LatencyMetric::Commit => "arbsig_commit_duration_ms",
    };

    metrics::histogram!(metric_name).record(duration.as_secs_f64() * 1000.0);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::LiveSignals => "arbsig_live_signals",
        GaugeMetric::ObservedAssets => "arbsig_observed_assets",
        GaugeMetric::FeedHealth => "arbsig_feed_health",
    };

    metrics::gauge!(metric_name).set(value);
}

/// Set a gauge from a count, saturating at `u32::MAX`
pub fn set_count_gauge(metric: GaugeMetric, count: usize) {
    set_gauge(metric, gauge_value(count));
}

fn gauge_value(count: usize) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

fn counter_value(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// Publish the counters of a completed pass
pub fn record_pass(report: &PassReport) {
    metrics::counter!("arbsig_passes_total", "outcome" => "ok").increment(1);
    metrics::counter!("arbsig_candidates_qualifying_total").increment(counter_value(report.qualifying));

    let skipped = &report.skipped;
    for (reason, count) in [
        ("spread", skipped.spread),
        ("liquidity", skipped.liquidity),
        ("risk", skipped.risk),
        ("impact", skipped.impact),
    ] {
        metrics::counter!("arbsig_candidates_skipped_total", "reason" => reason)
            .increment(counter_value(count));
    }

    for (op, count) in [
        ("created", report.created),
        ("updated", report.updated),
        ("deleted", report.deleted),
    ] {
        metrics::counter!("arbsig_signals_total", "op" => op).increment(counter_value(count));
    }

    set_count_gauge(GaugeMetric::ObservedAssets, report.assets_observed);
    record_latency(LatencyMetric::Pass, Duration::from_millis(report.duration_ms));
}

/// Count a pass that ended in an error
pub fn record_failed_pass() {
    metrics::counter!("arbsig_passes_total", "outcome" => "failed").increment(1);
}

pub fn set_feed_health(health: &FeedHealth) {
    set_gauge(GaugeMetric::FeedHealth, f64::from(health.level()));
}
