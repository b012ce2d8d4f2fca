//! Index/UDF registrar.
//!
//! Secondary-index and UDF definitions are discovered by whichever worker
//! happens to be scanning the file that contains them, but must be
//! registered against the cluster without duplicate or interleaved
//! creation attempts. Workers append under the exclusive-access lock
//! during the scan phase; a single drain pass after the scan issues the
//! management calls and classifies every definition.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use backup::model::{IndexDef, UdfModule};
use cluster::client::ClusterClient;
use cluster::types::{ClusterError, CreateIndexResult, ExistingIndex, UdfRegisterOutcome};

use crate::counters::{CounterBlock, IndexOutcome};

#[derive(Debug, Default)]
pub struct Registrar {
    index_queue: Mutex<Vec<IndexDef>>,
    udf_queue: Mutex<Vec<UdfModule>>,
}

impl Registrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one index definition. Safe from any worker at any time
    /// during the scan phase; the lock is held only for the push.
    pub async fn enqueue_index(&self, def: IndexDef) {
        self.index_queue.lock().await.push(def);
    }

    /// Append one UDF module. Same locking discipline as `enqueue_index`.
    pub async fn enqueue_udf(&self, module: UdfModule) {
        self.udf_queue.lock().await.push(module);
    }

    pub async fn pending_indexes(&self) -> usize {
        self.index_queue.lock().await.len()
    }

    pub async fn pending_udfs(&self) -> usize {
        self.udf_queue.lock().await.len()
    }

    /// Issue the cluster-management calls for everything queued.
    ///
    /// Must run after the scan phase so it never races an enqueue. Each
    /// index ends up in exactly one of created/skipped/matched/mismatched;
    /// each UDF is created or found already present. A mismatched index is
    /// reported and counted but never aborts the job here; strict-mode
    /// escalation is the caller's policy.
    pub async fn drain<C>(
        &self,
        client: &C,
        counters: &CounterBlock,
    ) -> Result<(), ClusterError>
    where
        C: ClusterClient + ?Sized,
    {
        let indexes = std::mem::take(&mut *self.index_queue.lock().await);
        for def in indexes {
            match client.index_status(&def).await? {
                ExistingIndex::Absent => match client.create_index(&def).await? {
                    CreateIndexResult::Created => {
                        info!(index = %def, "secondary index created");
                        counters.classify_index(IndexOutcome::Created);
                    }
                    CreateIndexResult::Refused(reason) => {
                        warn!(index = %def, %reason, "index creation refused");
                        counters.classify_index(IndexOutcome::Skipped);
                    }
                },
                ExistingIndex::Same => {
                    debug!(index = %def, "index already exists with identical definition");
                    counters.classify_index(IndexOutcome::Matched);
                }
                ExistingIndex::Different => {
                    warn!(index = %def, "existing index definition conflicts with backup");
                    counters.classify_index(IndexOutcome::Mismatched);
                }
                ExistingIndex::Unknown => {
                    debug!(index = %def, "index exists, definition not comparable; skipping");
                    counters.classify_index(IndexOutcome::Skipped);
                }
            }
        }

        let udfs = std::mem::take(&mut *self.udf_queue.lock().await);
        for module in udfs {
            match client.register_udf(&module).await? {
                UdfRegisterOutcome::Created => {
                    info!(udf = %module.name, "UDF module registered");
                    counters.udf_created();
                }
                UdfRegisterOutcome::AlreadyPresent => {
                    debug!(udf = %module.name, "UDF module already present");
                }
            }
        }

        Ok(())
    }
}
