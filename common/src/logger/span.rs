use tracing::Span;

use super::JobId;

/// Create the root span for one restore run.
pub fn job_span(job: &JobId) -> Span {
    tracing::info_span!("restore_job", job_id = %job)
}

/// Create a per-worker child span (inherits the job span automatically).
pub fn worker_span(worker: usize) -> Span {
    tracing::info_span!("restore_worker", worker)
}
