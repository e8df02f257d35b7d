//! The `Executor` trait and the dispatch function that builds one from a descriptor.

pub mod thread_pool;

use std::sync::Arc;

use crate::config::{ExecutorCreateInfo, ExecutorKind, SubmitInfo};
use crate::error::Result;
use crate::handle::TaskHandle;

/// What an executor implementation reports about itself via [`Executor::query`].
#[derive(Debug, Clone, Copy)]
pub struct ExecutorCapabilities {
    pub worker_count: usize,
    pub supports_priority: bool,
    pub supports_deadline: bool,
    pub supports_tracing: bool,
}

/// An execution strategy for opaque units of work.
///
/// Callers hold an `Arc<dyn Executor>` and never need to know which concrete strategy they got.
/// `ThreadPoolExecutor` is the only implementer today.
pub trait Executor: Send + Sync {
    /// Enqueues a task, subject to the executor's (or this submit's override) backpressure
    /// policy. Returns the handle the caller uses to observe completion.
    fn submit(&self, info: SubmitInfo) -> Result<TaskHandle>;

    /// Submits every item in `infos` in order, best-effort: a failure partway through does not
    /// roll back the tasks already submitted. Returns one result per input, in the same order.
    fn submit_many(&self, infos: Vec<SubmitInfo>) -> Vec<Result<TaskHandle>> {
        infos.into_iter().map(|info| self.submit(info)).collect()
    }

    /// Stops accepting new tasks. Idempotent. Workers keep draining what is already queued.
    fn close(&self);

    /// Blocks until every worker has drained the queue and exited. Implies `close`. Idempotent.
    fn join(&self);

    /// Checked lifecycle teardown, analogous to [`crate::queue::BoundedQueue::destroy`]: `Ok(())`
    /// once the executor is fully joined, `Err(Status::Busy)` otherwise. Actual resource release
    /// happens through ordinary `Drop` once the last `Arc` reference goes away.
    fn destroy(&self) -> Result<()>;

    fn query(&self) -> ExecutorCapabilities;
}

/// Builds an executor from a root descriptor. The only `ExecutorKind` implemented today is
/// `ThreadPool`; other kinds resolve to `Status::Unsupported`.
pub fn create_executor(info: ExecutorCreateInfo) -> Result<Arc<dyn Executor>> {
    match info.kind {
        ExecutorKind::ThreadPool => {
            let pool = thread_pool::ThreadPoolExecutor::new(info)?;
            Ok(pool as Arc<dyn Executor>)
        }
    }
}
