//! Signal lifecycle reconciliation
//!
//! Diffs one pass's evaluated candidates against the persisted signal set
//! and produces a single batch of upserts and deletes.
//!
//! | spread                     | no signal | signal |
//! |----------------------------|-----------|--------|
//! | >= entry                   | create    | update |
//! | retention <= spread < entry| skip      | update |
//! | < retention                | skip      | delete |
//!
//! Keys that were not evaluated in the pass are left alone.

use super::{ArbitrageSignal, Candidate, SignalKey};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Writes for one pass, applied atomically by a store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalBatch {
    pub upserts: Vec<ArbitrageSignal>,
    pub deletes: Vec<SignalKey>,
}

impl SignalBatch {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }
}

/// Outcome counts of one reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileCounts {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    /// Evaluations that neither created nor kept a signal
    pub skipped_by_spread: usize,
}

/// Batch plus counts
#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    pub batch: SignalBatch,
    pub counts: ReconcileCounts,
}

/// What to do with one evaluated key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upsert,
    /// Keep an existing signal, never create one
    Retain,
    Drain,
}

/// Applies entry/retention thresholds to candidates
#[derive(Debug, Clone)]
pub struct SignalReconciler {
    entry_threshold: Decimal,
    retention_threshold: Decimal,
}

impl Default for SignalReconciler {
    fn default() -> Self {
        Self::new(dec!(3), dec!(3))
    }
}

impl SignalReconciler {
    pub fn new(entry_threshold: Decimal, retention_threshold: Decimal) -> Self {
        Self {
            entry_threshold,
            retention_threshold,
        }
    }

    /// Classify a spread against the thresholds
    pub fn action(&self, spread_pct: Decimal) -> Action {
        if spread_pct >= self.entry_threshold {
            Action::Upsert
        } else if spread_pct >= self.retention_threshold {
            Action::Retain
        } else {
            Action::Drain
        }
    }

    /// Plan the writes for one pass. Pure: same inputs, same plan.
    ///
    /// Candidates at or above retention are expected to have passed the
    /// gates already. Duplicate keys collapse, last one wins.
    pub fn reconcile(
        &self,
        candidates: &[Candidate],
        existing: &HashMap<SignalKey, ArbitrageSignal>,
        now: DateTime<Utc>,
    ) -> ReconcilePlan {
        let mut latest: BTreeMap<&SignalKey, &Candidate> = BTreeMap::new();
        for candidate in candidates {
            latest.insert(&candidate.key, candidate);
        }

        let mut plan = ReconcilePlan::default();

        for (key, candidate) in latest {
            let current = existing.get(key);
            match (self.action(candidate.spread_pct), current) {
                (Action::Upsert, None) => {
                    plan.batch
                        .upserts
                        .push(ArbitrageSignal::from_candidate(candidate, now));
                    plan.counts.created += 1;
                }
                (Action::Upsert | Action::Retain, Some(signal)) => {
                    if signal.matches(candidate) {
                        plan.counts.unchanged += 1;
                    } else {
                        plan.batch.upserts.push(signal.refreshed(candidate, now));
                        plan.counts.updated += 1;
                    }
                }
                (Action::Drain, Some(_)) => {
                    plan.batch.deletes.push(key.clone());
                    plan.counts.deleted += 1;
                }
                (Action::Retain | Action::Drain, None) => {
                    plan.counts.skipped_by_spread += 1;
                }
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(asset: &str, buy: Decimal, sell: Decimal) -> Candidate {
        Candidate {
            key: SignalKey::new(asset, "A", "B"),
            buy_price: buy,
            sell_price: sell,
            spread_pct: (sell - buy) / buy * dec!(100),
        }
    }

    fn apply(
        existing: &mut HashMap<SignalKey, ArbitrageSignal>,
        batch: &SignalBatch,
    ) {
        for key in &batch.deletes {
            existing.remove(key);
        }
        for signal in &batch.upserts {
            existing.insert(signal.key(), signal.clone());
        }
    }

    #[test]
    fn test_creates_then_deletes() {
        let reconciler = SignalReconciler::default();
        let mut store = HashMap::new();

        let plan = reconciler.reconcile(
            &[candidate("BTC", dec!(100), dec!(103.5))],
            &store,
            Utc::now(),
        );
        assert_eq!(plan.counts.created, 1);
        apply(&mut store, &plan.batch);

        let signal = &store[&SignalKey::new("BTC", "A", "B")];
        assert_eq!(signal.spread_pct, dec!(3.5));
        assert_eq!(signal.sell_price, dec!(103.5));

        let plan = reconciler.reconcile(
            &[candidate("BTC", dec!(100), dec!(101))],
            &store,
            Utc::now(),
        );
        assert_eq!(plan.counts.deleted, 1);
        assert_eq!(plan.batch.upserts.len(), 0);
        apply(&mut store, &plan.batch);
        assert!(store.is_empty());
    }

    #[test]
    fn test_identical_pass_is_idempotent() {
        let reconciler = SignalReconciler::default();
        let mut store = HashMap::new();
        let candidates = vec![
            candidate("BTC", dec!(100), dec!(104)),
            candidate("ETH", dec!(10), dec!(10.5)),
        ];

        let first = reconciler.reconcile(&candidates, &store, Utc::now());
        apply(&mut store, &first.batch);
        let second = reconciler.reconcile(&candidates, &store, Utc::now());

        assert_eq!(first.counts.created, 2);
        assert!(second.batch.is_empty());
        assert_eq!(second.counts.unchanged, 2);
        assert_eq!(second.counts.created + second.counts.updated + second.counts.deleted, 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_keeps_id_and_created_at() {
        let reconciler = SignalReconciler::default();
        let mut store = HashMap::new();
        let t0 = Utc::now();

        let plan = reconciler.reconcile(&[candidate("BTC", dec!(100), dec!(104))], &store, t0);
        apply(&mut store, &plan.batch);
        let original = store[&SignalKey::new("BTC", "A", "B")].clone();

        let t1 = t0 + chrono::Duration::seconds(10);
        let plan = reconciler.reconcile(&[candidate("BTC", dec!(100), dec!(105))], &store, t1);
        assert_eq!(plan.counts.updated, 1);
        apply(&mut store, &plan.batch);

        let updated = &store[&original.key()];
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, t0);
        assert_eq!(updated.updated_at, t1);
        assert_eq!(updated.spread_pct, dec!(5));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_absent_keys_not_swept() {
        let reconciler = SignalReconciler::default();
        let mut store = HashMap::new();

        let plan = reconciler.reconcile(
            &[candidate("BTC", dec!(100), dec!(104))],
            &store,
            Utc::now(),
        );
        apply(&mut store, &plan.batch);

        let plan = reconciler.reconcile(&[], &store, Utc::now());
        assert!(plan.batch.is_empty());
        assert_eq!(plan.counts, ReconcileCounts::default());
    }

    #[test]
    fn test_below_threshold_without_signal_is_skipped() {
        let reconciler = SignalReconciler::default();
        let plan = reconciler.reconcile(
            &[candidate("BTC", dec!(100), dec!(101))],
            &HashMap::new(),
            Utc::now(),
        );
        assert!(plan.batch.is_empty());
        assert_eq!(plan.counts.skipped_by_spread, 1);
    }

    #[test]
    fn test_hysteresis_band_keeps_but_never_creates() {
        let reconciler = SignalReconciler::new(dec!(3), dec!(2));
        let mut store = HashMap::new();

        // 2.5% alone does not create
        let plan = reconciler.reconcile(
            &[candidate("BTC", dec!(100), dec!(102.5))],
            &store,
            Utc::now(),
        );
        assert!(plan.batch.is_empty());
        assert_eq!(plan.counts.skipped_by_spread, 1);

        let plan = reconciler.reconcile(
            &[candidate("BTC", dec!(100), dec!(104))],
            &store,
            Utc::now(),
        );
        apply(&mut store, &plan.batch);

        // Falls into the band: kept and refreshed
        let plan = reconciler.reconcile(
            &[candidate("BTC", dec!(100), dec!(102.5))],
            &store,
            Utc::now(),
        );
        assert_eq!(plan.counts.updated, 1);
        apply(&mut store, &plan.batch);
        assert_eq!(store[&SignalKey::new("BTC", "A", "B")].spread_pct, dec!(2.5));

        // Below retention: drained
        let plan = reconciler.reconcile(
            &[candidate("BTC", dec!(100), dec!(101.5))],
            &store,
            Utc::now(),
        );
        assert_eq!(plan.counts.deleted, 1);
    }

    #[test]
    fn test_duplicate_keys_collapse_last_wins() {
        let reconciler = SignalReconciler::default();
        let plan = reconciler.reconcile(
            &[
                candidate("BTC", dec!(100), dec!(104)),
                candidate("BTC", dec!(100), dec!(106)),
            ],
            &HashMap::new(),
            Utc::now(),
        );
        assert_eq!(plan.batch.upserts.len(), 1);
        assert_eq!(plan.batch.upserts[0].spread_pct, dec!(6));
        assert_eq!(plan.counts.created, 1);
    }

    #[test]
    fn test_action_thresholds() {
        let reconciler = SignalReconciler::new(dec!(3), dec!(2));
        assert_eq!(reconciler.action(dec!(3)), Action::Upsert);
        assert_eq!(reconciler.action(dec!(2.99)), Action::Retain);
        assert_eq!(reconciler.action(dec!(2)), Action::Retain);
        assert_eq!(reconciler.action(dec!(1.99)), Action::Drain);
    }
}
