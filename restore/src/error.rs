//! Job-level error taxonomy.
//!
//! Per-record and per-index conditions never show up here; they are
//! classified into the counter block. Only configuration-time failures
//! and fatal mid-run conditions abort a job.

use std::path::PathBuf;

use thiserror::Error;

use cluster::types::ClusterError;

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("invalid restore configuration: {0}")]
    InvalidConfig(String),

    #[error("backup file {path} is not accessible")]
    FileInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("backup decode failed: {0}")]
    Decode(anyhow::Error),

    #[error("record write failed: {0}")]
    RecordWrite(String),

    #[error("cluster error: {0}")]
    Cluster(#[from] ClusterError),

    #[error("worker task failed: {0}")]
    Worker(String),
}
