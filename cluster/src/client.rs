//! Abstraction over the live cluster connection.
//!
//! The restore core borrows the connection for the duration of the job;
//! it never opens or closes it. Implementations wrap the real wire
//! client; tests substitute an in-memory mock.

use async_trait::async_trait;

use backup::model::{IndexDef, Record, UdfModule};

use crate::types::{
    ClusterError, CreateIndexResult, ExistingIndex, PutOutcome, UdfRegisterOutcome, WritePolicy,
};

#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Write one record into `namespace` under the given policy.
    ///
    /// Returns a per-record outcome for classification; `Err` is reserved
    /// for fatal transport failures.
    async fn put_record(
        &self,
        namespace: &str,
        record: &Record,
        policy: &WritePolicy,
    ) -> Result<PutOutcome, ClusterError>;

    /// Report whether an index with this definition's name already exists.
    async fn index_status(&self, def: &IndexDef) -> Result<ExistingIndex, ClusterError>;

    /// Create a secondary index.
    async fn create_index(&self, def: &IndexDef) -> Result<CreateIndexResult, ClusterError>;

    /// Register a UDF module.
    async fn register_udf(&self, module: &UdfModule) -> Result<UdfRegisterOutcome, ClusterError>;
}
