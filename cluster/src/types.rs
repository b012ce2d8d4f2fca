//! Common types for the cluster-client seam.

use serde::Deserialize;
use thiserror::Error;

/// Per-record write policy echoed from the job configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct WritePolicy {
    /// Only create records; never overwrite an existing one.
    pub unique: bool,
    /// Write without comparing generations (overwrites fresher records).
    pub no_generation: bool,
}

/// What happened when a single record was written.
///
/// Everything here is a per-record condition the job recovers from by
/// counting; transport-level failures are `ClusterError`s instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// Record written successfully.
    Inserted,
    /// Record already exists and the policy forbids overwriting it.
    Existed,
    /// The cluster holds the record with a newer generation.
    Fresher,
    /// Record-level permanent error (e.g. record too big).
    RecordError(String),
}

/// What the cluster reports about an index name before creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistingIndex {
    /// No index with that name.
    Absent,
    /// Exists with an identical definition.
    Same,
    /// Exists with a conflicting definition.
    Different,
    /// Exists, but the definition could not be compared.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateIndexResult {
    Created,
    /// Non-fatal refusal, e.g. the server does not support the index type.
    Refused(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UdfRegisterOutcome {
    Created,
    AlreadyPresent,
}

/// Fatal cluster-side failures. Per-record conditions never surface here.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("connection to cluster lost: {0}")]
    ConnectionLost(String),

    #[error("cluster request timed out: {0}")]
    Timeout(String),

    #[error("cluster rejected request: {0}")]
    Rejected(String),
}
