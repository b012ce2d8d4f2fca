//! Job configuration as handed over by the surrounding CLI/config layer.
//!
//! Parsing and flag handling happen outside this core; what arrives here
//! is already a plain struct. `RestoreStatus::init` copies the filter
//! lists out of it, so the configuration can be dropped once the job is
//! constructed.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use cluster::types::WritePolicy;

/// Optional source→target namespace remap.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamespaceMapping {
    pub source: String,
    pub target: String,
}

/// Configuration knobs for one restore run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RestoreConfig {
    /// Backup files to restore, in scan order.
    pub file_list: Vec<PathBuf>,

    /// Restore only records from `source`, rewriting them into `target`.
    /// `None` restores every namespace as-is.
    pub namespace: Option<NamespaceMapping>,

    /// Bins to restore; empty means all bins.
    pub bin_filter: Vec<String>,
    /// Sets to restore; empty means all sets.
    pub set_filter: Vec<String>,

    /// Number of concurrent restore workers.
    pub parallelism: usize,

    /// Aggregate bandwidth ceiling in bytes/second; `None` is unlimited.
    pub bandwidth_limit: Option<u64>,
    /// Aggregate throughput ceiling in records/second; `None` is unlimited.
    pub tps_limit: Option<u64>,

    /// Count record-level write failures as ignored instead of aborting.
    pub ignore_record_errors: bool,

    pub write_policy: WritePolicy,

    /// How often the throttle budgets are topped up.
    pub refill_interval_ms: u64,
    /// How many intervals of unused budget may accumulate as burst.
    pub burst_intervals: u64,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            file_list: Vec::new(),
            namespace: None,
            bin_filter: Vec::new(),
            set_filter: Vec::new(),
            parallelism: 4,
            bandwidth_limit: None,
            tps_limit: None,
            ignore_record_errors: false,
            write_policy: WritePolicy::default(),
            refill_interval_ms: 1_000,
            burst_intervals: 2,
        }
    }
}

impl RestoreConfig {
    pub fn refill_interval(&self) -> Duration {
        Duration::from_millis(self.refill_interval_ms)
    }

    /// Internal-consistency check, run by `RestoreStatus::init` before
    /// anything else starts.
    pub fn validate(&self) -> Result<(), String> {
        if self.parallelism == 0 {
            return Err("parallelism must be at least 1".into());
        }
        if self.refill_interval_ms == 0 {
            return Err("refill interval must be non-zero".into());
        }
        if self.burst_intervals == 0 {
            return Err("burst_intervals must be at least 1".into());
        }
        if let Some(mapping) = &self.namespace {
            if mapping.source.is_empty() || mapping.target.is_empty() {
                return Err("namespace mapping requires a source and a target".into());
            }
        }
        if let Some(0) = self.bandwidth_limit {
            return Err("bandwidth limit must be positive (omit it for unlimited)".into());
        }
        if let Some(0) = self.tps_limit {
            return Err("tps limit must be positive (omit it for unlimited)".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RestoreConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_parallelism_rejected() {
        let cfg = RestoreConfig {
            parallelism: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_mapping_names_rejected() {
        let cfg = RestoreConfig {
            namespace: Some(NamespaceMapping {
                source: "".into(),
                target: "prod".into(),
            }),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_limits_rejected() {
        let cfg = RestoreConfig {
            tps_limit: Some(0),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
