//! The aggregate status object of one restore run.
//!
//! Constructed once from validated configuration before any worker
//! starts; shared read-only (filters, file list) and shared-write
//! (counters, throttle ceilings, registrar queues) for the job's
//! duration; dropped only after every worker and the refill task have
//! terminated.

use std::path::{Path, PathBuf};

use backup::model::Record;

use crate::config::{NamespaceMapping, RestoreConfig};
use crate::counters::{CounterBlock, RecordOutcome};
use crate::error::RestoreError;
use crate::registrar::Registrar;
use crate::throttle::Throttle;

#[derive(Debug)]
pub struct RestoreStatus {
    pub counters: CounterBlock,
    pub throttle: Throttle,
    pub registrar: Registrar,

    // Set once at init, read-only thereafter.
    file_list: Vec<PathBuf>,
    namespace: Option<NamespaceMapping>,
    bin_filter: Vec<String>,
    set_filter: Vec<String>,
    estimated_total_bytes: u64,
}

impl RestoreStatus {
    /// Validate the configuration, probe every backup file for its size,
    /// and build the zeroed status object.
    ///
    /// Fails without starting anything when the configuration is
    /// internally inconsistent or a backup file cannot be probed.
    pub async fn init(cfg: &RestoreConfig) -> Result<Self, RestoreError> {
        cfg.validate().map_err(RestoreError::InvalidConfig)?;

        let mut estimated_total_bytes: u64 = 0;
        for path in &cfg.file_list {
            let meta = tokio::fs::metadata(path).await.map_err(|source| {
                RestoreError::FileInaccessible {
                    path: path.clone(),
                    source,
                }
            })?;
            estimated_total_bytes = estimated_total_bytes.saturating_add(meta.len());
        }

        Ok(Self {
            counters: CounterBlock::default(),
            throttle: Throttle::new(cfg),
            registrar: Registrar::new(),
            file_list: cfg.file_list.clone(),
            namespace: cfg.namespace.clone(),
            bin_filter: cfg.bin_filter.clone(),
            set_filter: cfg.set_filter.clone(),
            estimated_total_bytes,
        })
    }

    pub fn file_list(&self) -> &[PathBuf] {
        &self.file_list
    }

    pub fn estimated_total_bytes(&self) -> u64 {
        self.estimated_total_bytes
    }

    /// Fraction of the estimated input consumed so far, for live progress
    /// reporting. Saturates at 1.0 (estimates are approximate).
    pub fn progress(&self) -> f64 {
        if self.estimated_total_bytes == 0 {
            return 0.0;
        }
        let done = self.counters.total_bytes() as f64 / self.estimated_total_bytes as f64;
        done.min(1.0)
    }

    /// The namespace a record should be written into, applying the
    /// optional source→target remap.
    pub fn target_namespace<'a>(&'a self, source: &'a str) -> &'a str {
        match &self.namespace {
            Some(mapping) if mapping.source == source => &mapping.target,
            _ => source,
        }
    }

    /// Pre-write disposition of one record.
    ///
    /// Returns `Some(outcome)` when the record must be dropped without a
    /// write attempt (expired void time, namespace/set excluded, or the
    /// bin filter leaves no bins). Retained records have their bins
    /// reduced to the filtered set in place.
    pub fn filter_record(&self, record: &mut Record, now_ms: u64) -> Option<RecordOutcome> {
        if record.has_expired(now_ms) {
            return Some(RecordOutcome::Expired);
        }

        if let Some(mapping) = &self.namespace {
            if record.namespace != mapping.source {
                return Some(RecordOutcome::Skipped);
            }
        }

        if !self.set_filter.is_empty() && !self.set_filter.contains(&record.set) {
            return Some(RecordOutcome::Skipped);
        }

        if !self.bin_filter.is_empty() {
            record.bins.retain(|b| self.bin_filter.contains(&b.name));
            if record.bins.is_empty() {
                return Some(RecordOutcome::Skipped);
            }
        }

        None
    }

    /// Whether `path` is part of this job's input. Used by callers that
    /// resume or cross-check file lists.
    pub fn contains_file(&self, path: &Path) -> bool {
        self.file_list.iter().any(|p| p == path)
    }
}
