//! The restore worker engine.
//!
//! For one run, it:
//!   1. Spawns the throttle refill task (when a limit is configured).
//!   2. Spawns `parallelism` workers that claim backup files from a
//!      shared queue and stream their entries.
//!   3. Waits for every worker, then drains the index/UDF registrar.
//!
//! Records are independent; no ordering is guaranteed across workers.
//! A fatal error in any worker flips the stop signal so the rest —
//! including workers blocked in the throttle — exit promptly with the
//! counters intact.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info};

use backup::decoder::DecoderFactory;
use backup::model::BackupEntry;
use cluster::client::ClusterClient;
use cluster::types::{PutOutcome, WritePolicy};
use common::logger::{JobId, job_span, worker_span};

use crate::config::RestoreConfig;
use crate::counters::{CounterSnapshot, RecordOutcome};
use crate::error::RestoreError;
use crate::status::RestoreStatus;

pub struct RestoreEngine<D, C> {
    cfg: RestoreConfig,
    status: Arc<RestoreStatus>,
    decoders: Arc<D>,
    client: Arc<C>,
    stop: watch::Sender<bool>,
}

impl<D, C> RestoreEngine<D, C>
where
    D: DecoderFactory + 'static,
    C: ClusterClient + 'static,
{
    pub fn new(
        cfg: RestoreConfig,
        status: Arc<RestoreStatus>,
        decoders: Arc<D>,
        client: Arc<C>,
    ) -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            cfg,
            status,
            decoders,
            client,
            stop,
        }
    }

    pub fn status(&self) -> &Arc<RestoreStatus> {
        &self.status
    }

    /// External cancellation entry point. Workers observe it between
    /// records and inside throttle waits.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Run the restore to completion (or cancellation) and return the
    /// final counter snapshot.
    pub async fn run(&self) -> Result<CounterSnapshot, RestoreError> {
        let job = JobId::new();
        let span = job_span(&job);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(&self) -> Result<CounterSnapshot, RestoreError> {
        info!(
            files = self.status.file_list().len(),
            estimated_bytes = self.status.estimated_total_bytes(),
            parallelism = self.cfg.parallelism,
            "restore job starting"
        );

        let refill = if self.status.throttle.unlimited() {
            None
        } else {
            let status = Arc::clone(&self.status);
            let stop = self.stop.subscribe();
            Some(tokio::spawn(refill_loop(status, stop)))
        };

        let files: Arc<Mutex<VecDeque<PathBuf>>> = Arc::new(Mutex::new(
            self.status.file_list().iter().cloned().collect(),
        ));

        let mut workers = JoinSet::new();
        for worker_id in 0..self.cfg.parallelism {
            let fut = worker_loop(
                Arc::clone(&self.status),
                Arc::clone(&self.decoders),
                Arc::clone(&self.client),
                Arc::clone(&files),
                self.cfg.write_policy,
                self.cfg.ignore_record_errors,
                self.stop.subscribe(),
            );
            workers.spawn(fut.instrument(worker_span(worker_id)));
        }

        let mut fatal: Option<RestoreError> = None;
        while let Some(joined) = workers.join_next().await {
            let failure = match joined {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e),
                Err(join_err) => Some(RestoreError::Worker(join_err.to_string())),
            };
            if let Some(e) = failure {
                // First fatal error wins; tell everyone else to wind down.
                let _ = self.stop.send(true);
                if fatal.is_none() {
                    fatal = Some(e);
                }
            }
        }

        // Scan phase is over either way; the refill task can go.
        let _ = self.stop.send(true);
        if let Some(handle) = refill {
            let _ = handle.await;
        }

        if let Some(e) = fatal {
            return Err(e);
        }

        self.status
            .registrar
            .drain(self.client.as_ref(), &self.status.counters)
            .await?;

        let snapshot = self.status.counters.snapshot();
        info!(
            records = snapshot.total_records,
            inserted = snapshot.inserted,
            backoffs = snapshot.backoff_count,
            "restore job finished"
        );
        Ok(snapshot)
    }
}

/// Periodic throttle top-up, decoupled from the workers.
async fn refill_loop(status: Arc<RestoreStatus>, mut stop: watch::Receiver<bool>) {
    let period = status.throttle.refill_interval();
    let start = tokio::time::Instant::now() + period;
    let mut ticker = tokio::time::interval_at(start, period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                status.throttle.refill(&status.counters);
            }
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }
}

/// One restore worker: claim files until the queue is empty, streaming
/// each file's entries through classification and the throttle.
async fn worker_loop<D, C>(
    status: Arc<RestoreStatus>,
    decoders: Arc<D>,
    client: Arc<C>,
    files: Arc<Mutex<VecDeque<PathBuf>>>,
    policy: WritePolicy,
    ignore_record_errors: bool,
    mut stop: watch::Receiver<bool>,
) -> Result<(), RestoreError>
where
    D: DecoderFactory,
    C: ClusterClient,
{
    loop {
        let path = { files.lock().await.pop_front() };
        let Some(path) = path else {
            return Ok(());
        };

        debug!(file = %path.display(), "scanning backup file");
        let mut decoder = decoders
            .open(&path)
            .await
            .map_err(RestoreError::Decode)?;

        while let Some(entry) = decoder.next_entry().await.map_err(RestoreError::Decode)? {
            if *stop.borrow() {
                debug!("stop signal observed, abandoning scan");
                return Ok(());
            }

            match entry {
                BackupEntry::Record(mut record) => {
                    status.counters.record_read(record.byte_size);

                    if let Some(outcome) = status.filter_record(&mut record, now_ms()) {
                        status.counters.classify(outcome);
                        continue;
                    }

                    if !status.throttle.acquire(&status.counters, &mut stop).await {
                        // Stopped while waiting on the budget.
                        return Ok(());
                    }

                    let namespace = status.target_namespace(&record.namespace).to_owned();
                    match client.put_record(&namespace, &record, &policy).await? {
                        PutOutcome::Inserted => {
                            status.counters.classify(RecordOutcome::Inserted)
                        }
                        PutOutcome::Existed => status.counters.classify(RecordOutcome::Existed),
                        PutOutcome::Fresher => status.counters.classify(RecordOutcome::Fresher),
                        PutOutcome::RecordError(reason) => {
                            if ignore_record_errors {
                                debug!(key = %record.key, %reason, "record write ignored");
                                status.counters.classify(RecordOutcome::Ignored);
                            } else {
                                return Err(RestoreError::RecordWrite(reason));
                            }
                        }
                    }
                }
                BackupEntry::Index(def) => {
                    status.registrar.enqueue_index(def).await;
                }
                BackupEntry::Udf(module) => {
                    status.registrar.enqueue_udf(module).await;
                }
            }
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
