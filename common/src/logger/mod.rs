mod init;
mod job_id;
mod span;

pub use init::init_logger;
pub use job_id::JobId;
pub use span::{job_span, worker_span};
