//! Root descriptors for every create/submit entry point, plus their typed extensions.
//!
//! Each root descriptor owns an [`Extensions`](crate::extensions::Extensions) bag for its
//! optional, forward-compatible fields. Builder methods push well-known marker types into the
//! bag; the executor reads them back with `extensions.find::<T>()`. A missing extension resolves
//! to the default documented next to its builder method.

use std::sync::Arc;

use crate::diagnostics::{Diagnostics, TraceContext};
use crate::extensions::Extensions;
use crate::task::Task;

/// What happens at `submit` time when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backpressure {
    /// Fail the submit immediately with `Status::Rejected`.
    Reject,
    /// Block the submitting thread until space frees up or the executor closes.
    Block,
    /// Run the task on the submitting thread instead of enqueuing it.
    CallerRuns,
}

impl Default for Backpressure {
    fn default() -> Self {
        Backpressure::Block
    }
}

/// Scheduling priority. Accepted by `submit` but ignored by the thread-pool executor, which
/// reports `supports_priority = false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

pub(crate) struct BackpressureExt(pub Backpressure);
pub(crate) struct TraceContextExt(pub TraceContext);
pub(crate) struct PriorityExt(#[allow(dead_code)] pub Priority);
pub(crate) struct DeadlineExt(#[allow(dead_code)] pub u64);
pub(crate) struct DiagnosticsExt(pub Arc<dyn Diagnostics>);
pub(crate) struct ThreadPoolExt(pub ThreadPoolConfig);

/// Overrides the default allocator for a queue. This marker type exists so the descriptor shape
/// is complete, but `texec` always uses the global allocator.
pub struct AllocatorOverride;

/// Which kind of executor to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorKind {
    /// A fixed-size pool of worker threads draining a bounded queue. The only kind this crate
    /// implements.
    ThreadPool,
}

/// Root descriptor for `create_executor`.
pub struct ExecutorCreateInfo {
    pub(crate) kind: ExecutorKind,
    pub(crate) extensions: Extensions,
}

impl ExecutorCreateInfo {
    pub fn new(kind: ExecutorKind) -> Self {
        ExecutorCreateInfo {
            kind,
            extensions: Extensions::new(),
        }
    }

    /// Convenience constructor for the only supported kind.
    pub fn thread_pool(config: ThreadPoolConfig) -> Self {
        let mut info = Self::new(ExecutorKind::ThreadPool);
        info.extensions.push(ThreadPoolExt(config));
        info
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.extensions.push(DiagnosticsExt(diagnostics));
        self
    }

    pub fn with_extension<T: std::any::Any + Send + Sync>(mut self, ext: T) -> Self {
        self.extensions.push(ext);
        self
    }
}

/// Thread-pool tuning, attached to an [`ExecutorCreateInfo`] via [`ExecutorCreateInfo::thread_pool`].
///
/// A zero `thread_count` resolves to 1; a zero `queue_capacity` resolves to 1024.
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    pub thread_count: usize,
    pub queue_capacity: usize,
    pub backpressure: Backpressure,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        ThreadPoolConfig {
            thread_count: 0,
            queue_capacity: 0,
            backpressure: Backpressure::default(),
        }
    }
}

impl ThreadPoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_backpressure(mut self, backpressure: Backpressure) -> Self {
        self.backpressure = backpressure;
        self
    }
}

/// Root descriptor for `Executor::submit`.
pub struct SubmitInfo {
    pub(crate) task: Task,
    pub(crate) extensions: Extensions,
}

impl SubmitInfo {
    pub fn new(task: Task) -> Self {
        SubmitInfo {
            task,
            extensions: Extensions::new(),
        }
    }

    /// Accepted but ignored by the thread-pool executor (`supports_priority = false`).
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.extensions.push(PriorityExt(priority));
        self
    }

    /// Accepted but ignored by the thread-pool executor (`supports_deadline = false`).
    pub fn with_deadline_ns(mut self, deadline_ns: u64) -> Self {
        self.extensions.push(DeadlineExt(deadline_ns));
        self
    }

    pub fn with_trace_context(mut self, trace_context: TraceContext) -> Self {
        self.extensions.push(TraceContextExt(trace_context));
        self
    }

    /// Overrides the executor's default backpressure policy for this submit only.
    pub fn with_backpressure(mut self, backpressure: Backpressure) -> Self {
        self.extensions.push(BackpressureExt(backpressure));
        self
    }

    pub fn with_extension<T: std::any::Any + Send + Sync>(mut self, ext: T) -> Self {
        self.extensions.push(ext);
        self
    }
}

/// Root descriptor for `BoundedQueue::create` (used internally by the thread-pool executor;
/// also exposed so a queue can be created directly, outside of any executor).
pub struct QueueCreateInfo {
    pub(crate) capacity: usize,
    pub(crate) extensions: Extensions,
}

impl QueueCreateInfo {
    pub fn new(capacity: usize) -> Self {
        QueueCreateInfo {
            capacity,
            extensions: Extensions::new(),
        }
    }

    /// Documented as a no-op: `texec` always uses the global allocator (see
    /// [`AllocatorOverride`]). Accepted so the descriptor shape matches the other root types.
    pub fn with_allocator_override(mut self, allocator: AllocatorOverride) -> Self {
        self.extensions.push(allocator);
        self
    }
}

/// Root descriptor for `TaskGroup::new`.
pub struct TaskGroupCreateInfo {
    pub(crate) max_tasks_hint: usize,
    #[allow(dead_code)]
    pub(crate) extensions: Extensions,
}

impl TaskGroupCreateInfo {
    /// `max_tasks_hint == 0` resolves to the default capacity of 8.
    pub fn new(max_tasks_hint: usize) -> Self {
        TaskGroupCreateInfo {
            max_tasks_hint,
            extensions: Extensions::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_info_extensions_round_trip() {
        let info = SubmitInfo::new(Task::new(|| 0))
            .with_priority(Priority::High)
            .with_backpressure(Backpressure::Reject);
        assert_eq!(info.extensions.find::<PriorityExt>().map(|p| p.0), Some(Priority::High));
        assert_eq!(
            info.extensions.find::<BackpressureExt>().map(|b| b.0),
            Some(Backpressure::Reject)
        );
        assert!(info.extensions.find::<TraceContextExt>().is_none());
    }

    #[test]
    fn thread_pool_config_defaults_are_zero_sentinel() {
        let cfg = ThreadPoolConfig::new();
        assert_eq!(cfg.thread_count, 0);
        assert_eq!(cfg.queue_capacity, 0);
    }
}
