//! ODS Admin Worker Library
//!
//! One [`JobRunner`] per job kind. A runner owns at most one running job at a
//! time; submission goes through [`JobQueue::try_enqueue`], which checks and
//! claims the runner under a single lock so concurrent requests cannot both
//! start a job.

pub mod context;
pub mod queue;

pub use context::{JobContext, JobExecutor};
pub use queue::{EnqueueOutcome, JobQueue, JobRunner, JobStatus};
