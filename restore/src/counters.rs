//! The shared counter block of a restore run.
//!
//! All counters are monotonically increasing atomics, shared across
//! workers without a lock. Each worker owns disjoint records, so plain
//! atomic adds are sufficient; nothing here performs I/O.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// The mutually exclusive category assigned to each processed record.
/// Exactly one is counted per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Written successfully.
    Inserted,
    /// Dropped: already exists and the policy forbids overwrite.
    Existed,
    /// Dropped: the cluster holds a newer generation.
    Fresher,
    /// Dropped: void time already passed.
    Expired,
    /// Dropped: excluded by the bin/set/namespace filters.
    Skipped,
    /// Dropped: record-level write error under the ignore policy.
    Ignored,
}

/// The mutually exclusive category assigned to each enqueued index
/// definition during the registrar drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    Created,
    /// Exists and was left alone (or creation was refused non-fatally).
    Skipped,
    /// Exists with an identical definition.
    Matched,
    /// Exists with a conflicting definition.
    Mismatched,
}

#[derive(Debug, Default)]
pub struct CounterBlock {
    total_bytes: AtomicU64,
    total_records: AtomicU64,

    inserted: AtomicU64,
    existed: AtomicU64,
    fresher: AtomicU64,
    expired: AtomicU64,
    skipped: AtomicU64,
    ignored: AtomicU64,

    backoff_count: AtomicU64,

    indexes_created: AtomicU64,
    indexes_skipped: AtomicU64,
    indexes_matched: AtomicU64,
    indexes_mismatched: AtomicU64,
    udfs_created: AtomicU64,
}

impl CounterBlock {
    /// Account for one record pulled from a decoder.
    pub fn record_read(&self, bytes: u64) {
        self.total_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.total_records.fetch_add(1, Ordering::Relaxed);
    }

    /// Count the final disposition of one record. Callers must invoke this
    /// exactly once per record read.
    pub fn classify(&self, outcome: RecordOutcome) {
        let counter = match outcome {
            RecordOutcome::Inserted => &self.inserted,
            RecordOutcome::Existed => &self.existed,
            RecordOutcome::Fresher => &self.fresher,
            RecordOutcome::Expired => &self.expired,
            RecordOutcome::Skipped => &self.skipped,
            RecordOutcome::Ignored => &self.ignored,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn classify_index(&self, outcome: IndexOutcome) {
        let counter = match outcome {
            IndexOutcome::Created => &self.indexes_created,
            IndexOutcome::Skipped => &self.indexes_skipped,
            IndexOutcome::Matched => &self.indexes_matched,
            IndexOutcome::Mismatched => &self.indexes_mismatched,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn udf_created(&self) {
        self.udfs_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one throttle-induced wait event (not one per waited record
    /// re-check; exactly one per time a worker actually blocked).
    pub fn incr_backoff(&self) {
        self.backoff_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    pub fn total_records(&self) -> u64 {
        self.total_records.load(Ordering::Relaxed)
    }

    pub fn backoff_count(&self) -> u64 {
        self.backoff_count.load(Ordering::Relaxed)
    }

    /// Consistent-enough copy of every counter for progress reporting and
    /// the final job report.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total_bytes: self.total_bytes.load(Ordering::Relaxed),
            total_records: self.total_records.load(Ordering::Relaxed),
            inserted: self.inserted.load(Ordering::Relaxed),
            existed: self.existed.load(Ordering::Relaxed),
            fresher: self.fresher.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            backoff_count: self.backoff_count.load(Ordering::Relaxed),
            indexes_created: self.indexes_created.load(Ordering::Relaxed),
            indexes_skipped: self.indexes_skipped.load(Ordering::Relaxed),
            indexes_matched: self.indexes_matched.load(Ordering::Relaxed),
            indexes_mismatched: self.indexes_mismatched.load(Ordering::Relaxed),
            udfs_created: self.udfs_created.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counter block, safe to hand to a report layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub total_bytes: u64,
    pub total_records: u64,

    pub inserted: u64,
    pub existed: u64,
    pub fresher: u64,
    pub expired: u64,
    pub skipped: u64,
    pub ignored: u64,

    pub backoff_count: u64,

    pub indexes_created: u64,
    pub indexes_skipped: u64,
    pub indexes_matched: u64,
    pub indexes_mismatched: u64,
    pub udfs_created: u64,
}

impl CounterSnapshot {
    /// Sum of the six record outcome counters. Equals `total_records` for
    /// every run that finished (completed or cleanly cancelled).
    pub fn outcome_total(&self) -> u64 {
        self.inserted + self.existed + self.fresher + self.expired + self.skipped + self.ignored
    }

    /// Sum of the four index outcome counters. Equals the number of index
    /// definitions enqueued once the registrar drain has run.
    pub fn index_outcome_total(&self) -> u64 {
        self.indexes_created + self.indexes_skipped + self.indexes_matched + self.indexes_mismatched
    }
}
