//! Status-and-throttle core of a bulk restore job.
//!
//! A restore run streams records, secondary-index definitions, and UDF
//! modules out of backup files and applies them to a live cluster:
//!   1. `RestoreStatus::init` validates the configuration and probes the
//!      backup files.
//!   2. `RestoreEngine::run` spawns the worker pool and the throttle
//!      refill task, scans all files, then drains the index/UDF registrar.
//!   3. The final `CounterSnapshot` carries the full outcome breakdown.
//!
//! Backup parsing and the cluster wire protocol live behind the
//! `backup::decoder` and `cluster::client` traits.

pub mod config;
pub mod counters;
pub mod engine;
pub mod error;
pub mod registrar;
pub mod status;
pub mod throttle;

pub use config::{NamespaceMapping, RestoreConfig};
pub use counters::{CounterBlock, CounterSnapshot, IndexOutcome, RecordOutcome};
pub use engine::RestoreEngine;
pub use error::RestoreError;
pub use status::RestoreStatus;
pub use throttle::Throttle;
