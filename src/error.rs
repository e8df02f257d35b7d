//! Status codes shared by every `texec` component.

use thiserror::Error;

/// The result type returned by fallible `texec` operations.
pub type Result<T> = std::result::Result<T, Status>;

/// Result published on a handle whose task panicked instead of returning normally.
///
/// Chosen to be unambiguous with any ordinary task result a caller is likely to use; callers
/// that care about the distinction should rely on [`crate::Diagnostics::on_task_end`] or
/// [`crate::executor::thread_pool::ThreadPoolExecutor::num_panics`] rather than pattern-matching
/// on this value.
pub const TASK_PANIC_SENTINEL: i32 = i32::MIN;

/// The status codes every `texec` operation resolves to.
///
/// `OK` has no variant here: success is represented by `Result::Ok`, not by a status value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The requested value has not been produced yet (a non-blocking poll found nothing).
    #[error("value not yet available")]
    NotReady,
    /// A non-blocking operation could not be completed immediately (e.g. the queue is full).
    #[error("operation rejected")]
    Rejected,
    /// The lifecycle forbids the operation now, but it may succeed later.
    #[error("operation not valid yet in the current lifecycle state")]
    Busy,
    /// The lifecycle forbids the operation permanently (the object is closed).
    #[error("object is closed")]
    Closed,
    /// The operation is not supported by this implementation.
    #[error("operation is not supported")]
    Unsupported,
    /// An argument, or a required descriptor, was missing or malformed.
    #[error("invalid argument")]
    InvalidArgument,
    /// The object is in a state that does not admit this operation, independent of a busy/closed
    /// distinction (reserved for implementations with richer state machines than the thread pool).
    #[error("invalid state for this operation")]
    InvalidState,
    /// A capacity computation overflowed or a bounded allocation could not be satisfied.
    ///
    /// Safe Rust's global allocator aborts the process on a raw allocation failure rather than
    /// returning an error, so this variant only ever surfaces from logical capacity checks.
    #[error("allocation or capacity limit exceeded")]
    OutOfMemory,
    /// An invariant the implementation relies on did not hold (thread spawn failure, and similar).
    #[error("internal error: {0}")]
    InternalError(&'static str),
    /// The task's `run` closure unwound instead of returning; see [`TASK_PANIC_SENTINEL`].
    #[error("task panicked")]
    TaskPanicked,
}
