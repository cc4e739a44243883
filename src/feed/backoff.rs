//! Bounded exponential backoff for market data collaborators

use crate::config::BackoffConfig;
use rand::Rng;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// Retry schedule
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound on the un-jittered delay
    pub max_delay: Duration,
    /// Retries allowed after the first failure
    pub max_retries: u32,
    /// Extra random delay, as a fraction of the current delay
    pub jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            max_retries: 3,
            jitter: 0.2,
        }
    }
}

impl From<&BackoffConfig> for BackoffPolicy {
    fn from(config: &BackoffConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            max_retries: config.max_retries,
            jitter: config.jitter,
        }
    }
}

/// Stateful delay generator for one retry sequence
#[derive(Debug)]
pub struct Backoff {
    policy: BackoffPolicy,
    attempts: u32,
    current: Duration,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        let current = policy.initial_delay;
        Self {
            policy,
            attempts: 0,
            current,
        }
    }

    /// Next delay to wait, or `None` once retries are exhausted
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.policy.max_retries {
            return None;
        }
        self.attempts += 1;

        let base = self.current.min(self.policy.max_delay);
        self.current = (self.current * 2).min(self.policy.max_delay);

        let jitter_ms = (base.as_millis() as f64 * self.policy.jitter.clamp(0.0, 1.0)) as u64;
        let extra = if jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=jitter_ms)
        } else {
            0
        };
        Some(base + Duration::from_millis(extra))
    }

    /// Retries handed out so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
        self.current = self.policy.initial_delay;
    }
}

/// Feed status as seen by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FeedHealth {
    Healthy,
    /// Failing, still retrying
    Degraded { consecutive_failures: u32 },
    /// Retries exhausted on the last attempt
    Down { consecutive_failures: u32 },
}

impl FeedHealth {
    /// Numeric form for gauges: 0 healthy, 1 degraded, 2 down
    pub fn level(&self) -> u8 {
        match self {
            FeedHealth::Healthy => 0,
            FeedHealth::Degraded { .. } => 1,
            FeedHealth::Down { .. } => 2,
        }
    }
}

/// Lock-free health tracker shared between a feed and the scheduler
#[derive(Debug, Default)]
pub struct HealthMonitor {
    consecutive_failures: AtomicU32,
    down: AtomicBool,
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.down.store(false, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_down(&self) {
        self.down.store(true, Ordering::Relaxed);
    }

    pub fn status(&self) -> FeedHealth {
        let consecutive_failures = self.consecutive_failures.load(Ordering::Relaxed);
        if self.down.load(Ordering::Relaxed) {
            FeedHealth::Down {
                consecutive_failures,
            }
        } else if consecutive_failures > 0 {
            FeedHealth::Degraded {
                consecutive_failures,
            }
        } else {
            FeedHealth::Healthy
        }
    }
}

/// Run `op` until it succeeds or the policy runs out of retries
///
/// Every failure is recorded on `health`; exhausting the policy marks the
/// feed down and returns the last error to the caller.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &BackoffPolicy,
    health: &HealthMonitor,
    label: &str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut backoff = Backoff::new(policy.clone());

    loop {
        match op().await {
            Ok(value) => {
                health.record_success();
                return Ok(value);
            }
            Err(e) => {
                health.record_failure();
                match backoff.next_delay() {
                    Some(delay) => {
                        tracing::warn!(
                            feed = label,
                            error = %e,
                            attempt = backoff.attempts(),
                            delay_ms = delay.as_millis() as u64,
                            "Feed read failed, backing off"
                        );
                        sleep(delay).await;
                    }
                    None => {
                        tracing::warn!(feed = label, error = %e, "Feed retries exhausted");
                        health.mark_down();
                        return Err(e);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn no_jitter(max_retries: u32) -> BackoffPolicy {
        BackoffPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
            max_retries,
            jitter: 0.0,
        }
    }

    #[test]
    fn test_backoff_doubles_until_cap() {
        let mut backoff = Backoff::new(no_jitter(5));
        let delays: Vec<_> = std::iter::from_fn(|| backoff.next_delay()).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(350),
                Duration::from_millis(350),
                Duration::from_millis(350),
            ]
        );
    }

    #[test]
    fn test_backoff_is_bounded() {
        let mut backoff = Backoff::new(no_jitter(2));
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_none());
        assert_eq!(backoff.attempts(), 2);

        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_jitter_stays_within_fraction() {
        let policy = BackoffPolicy {
            jitter: 0.5,
            ..no_jitter(10)
        };
        for _ in 0..50 {
            let mut backoff = Backoff::new(policy.clone());
            let first = backoff.next_delay().unwrap();
            assert!(first >= Duration::from_millis(100));
            assert!(first <= Duration::from_millis(150));
        }
    }

    #[test]
    fn test_health_transitions() {
        let health = HealthMonitor::new();
        assert_eq!(health.status(), FeedHealth::Healthy);

        health.record_failure();
        health.record_failure();
        assert_eq!(
            health.status(),
            FeedHealth::Degraded {
                consecutive_failures: 2
            }
        );

        health.mark_down();
        assert_eq!(health.status().level(), 2);

        health.record_success();
        assert_eq!(health.status(), FeedHealth::Healthy);
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let health = HealthMonitor::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let result: Result<u32, String> =
            retry_with_backoff(&no_jitter(3), &health, "test", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("not yet".to_string())
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(health.status(), FeedHealth::Healthy);
    }

    #[tokio::test]
    async fn test_retry_gives_up_and_marks_down() {
        let health = HealthMonitor::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let result: Result<(), String> =
            retry_with_backoff(&no_jitter(2), &health, "test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("boom".to_string())
            })
            .await;

        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(
            health.status(),
            FeedHealth::Down {
                consecutive_failures: 3
            }
        );
    }
}
