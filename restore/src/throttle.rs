//! Bandwidth/TPS throttle.
//!
//! Leaky-bucket with periodic top-up: the configured per-second limits
//! are turned into two absolute ceilings (`bytes_limit`, `records_limit`)
//! that a dedicated refill task raises by one interval's allowance per
//! tick. Workers compare the running totals against the ceilings before
//! each write and block until the next refill when a ceiling is exceeded.
//!
//! The throttle never fails; it only delays. Waits are interruptible via
//! the job's stop signal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Notify, watch};

use crate::config::RestoreConfig;
use crate::counters::CounterBlock;

#[derive(Debug)]
pub struct Throttle {
    /// Per-interval allowances; `None` means that limit is unlimited and
    /// its ceiling is never consulted.
    bytes_per_interval: Option<u64>,
    records_per_interval: Option<u64>,

    interval: Duration,
    burst_intervals: u64,

    /// Absolute rising ceilings for `total_bytes` / `total_records`.
    /// Written only by the refill task, read by all workers.
    bytes_limit: AtomicU64,
    records_limit: AtomicU64,

    /// Woken after every refill.
    refilled: Notify,
}

impl Throttle {
    pub fn new(cfg: &RestoreConfig) -> Self {
        let interval = cfg.refill_interval();
        let bytes_per_interval = cfg.bandwidth_limit.map(|l| per_interval(l, interval));
        let records_per_interval = cfg.tps_limit.map(|l| per_interval(l, interval));

        Self {
            bytes_per_interval,
            records_per_interval,
            interval,
            burst_intervals: cfg.burst_intervals,
            // Initial allowance: one interval's worth.
            bytes_limit: AtomicU64::new(bytes_per_interval.unwrap_or(0)),
            records_limit: AtomicU64::new(records_per_interval.unwrap_or(0)),
            refilled: Notify::new(),
        }
    }

    /// True when neither limit is configured; the refill task is not
    /// needed in that case.
    pub fn unlimited(&self) -> bool {
        self.bytes_per_interval.is_none() && self.records_per_interval.is_none()
    }

    pub fn refill_interval(&self) -> Duration {
        self.interval
    }

    pub fn bytes_limit(&self) -> u64 {
        self.bytes_limit.load(Ordering::Acquire)
    }

    pub fn records_limit(&self) -> u64 {
        self.records_limit.load(Ordering::Acquire)
    }

    /// Raise each configured ceiling by one interval's allowance, capped
    /// so unused budget never exceeds `burst_intervals` allowances beyond
    /// what has already been consumed. Wakes all blocked workers.
    ///
    /// Called only by the refill task.
    pub fn refill(&self, counters: &CounterBlock) {
        if let Some(per) = self.bytes_per_interval {
            let cap = counters
                .total_bytes()
                .saturating_add(self.burst_intervals.saturating_mul(per));
            let raised = self.bytes_limit.load(Ordering::Acquire).saturating_add(per);
            self.bytes_limit.store(raised.min(cap), Ordering::Release);
        }
        if let Some(per) = self.records_per_interval {
            let cap = counters
                .total_records()
                .saturating_add(self.burst_intervals.saturating_mul(per));
            let raised = self
                .records_limit
                .load(Ordering::Acquire)
                .saturating_add(per);
            self.records_limit.store(raised.min(cap), Ordering::Release);
        }
        self.refilled.notify_waiters();
    }

    /// True when the current totals are inside every configured ceiling.
    /// When both limits are set, both must admit (most restrictive governs).
    pub fn admits(&self, counters: &CounterBlock) -> bool {
        let bytes_ok = self.bytes_per_interval.is_none()
            || counters.total_bytes() <= self.bytes_limit.load(Ordering::Acquire);
        let records_ok = self.records_per_interval.is_none()
            || counters.total_records() <= self.records_limit.load(Ordering::Acquire);
        bytes_ok && records_ok
    }

    /// Block until the budgets admit the current totals, or until the stop
    /// signal fires. Returns `false` when stopped.
    ///
    /// Increments `backoff_count` exactly once per call that actually had
    /// to wait.
    pub async fn acquire(
        &self,
        counters: &CounterBlock,
        stop: &mut watch::Receiver<bool>,
    ) -> bool {
        if self.admits(counters) {
            return true;
        }
        if *stop.borrow() {
            return false;
        }

        counters.incr_backoff();

        loop {
            // Register interest before the re-check so a refill landing in
            // between cannot be missed.
            let notified = self.refilled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.admits(counters) {
                return true;
            }

            tokio::select! {
                _ = &mut notified => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        return false;
                    }
                }
            }
        }
    }
}

fn per_interval(limit_per_sec: u64, interval: Duration) -> u64 {
    let per = (limit_per_sec as u128 * interval.as_millis()) / 1_000;
    (per as u64).max(1)
}
