//! The opaque unit of work submitted to an executor.

type RunFn = Box<dyn FnOnce() -> i32 + Send + 'static>;
type CleanupFn = Box<dyn FnOnce() + Send + 'static>;

/// An immutable value pairing a function to run with an optional cleanup.
///
/// There is no separate context argument: whatever `run` (and, if present, `cleanup`) needs is
/// simply captured by the closure. The executor never inspects either closure's captures,
/// keeping the task an opaque unit of work.
pub struct Task {
    pub(crate) run: RunFn,
    pub(crate) cleanup: Option<CleanupFn>,
}

impl Task {
    /// Creates a task with no cleanup step.
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce() -> i32 + Send + 'static,
    {
        Task {
            run: Box::new(run),
            cleanup: None,
        }
    }

    /// Creates a task whose `cleanup` runs after `run`, on the same worker, exactly once,
    /// provided the task is actually executed (a task rejected before execution never runs
    /// `cleanup`; the caller still owns whatever `cleanup` would have released).
    pub fn with_cleanup<F, C>(run: F, cleanup: C) -> Self
    where
        F: FnOnce() -> i32 + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        Task {
            run: Box::new(run),
            cleanup: Some(Box::new(cleanup)),
        }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("has_cleanup", &self.cleanup.is_some())
            .finish()
    }
}
