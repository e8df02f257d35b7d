//! `texec`: an embeddable task-execution library.
//!
//! Submit opaque units of work (a function plus whatever it captures) to an [`Executor`] and get
//! back a [`TaskHandle`] to observe the result. The bundled executor is a fixed-size thread pool
//! draining a bounded, backpressure-aware queue; [`TaskGroup`] aggregates handles from a batch of
//! submits so they can be waited on together.
//!
//! ```
//! use texec::{create_executor, Executor, ExecutorCreateInfo, SubmitInfo, Task, ThreadPoolConfig};
//!
//! let executor = create_executor(ExecutorCreateInfo::thread_pool(
//!     ThreadPoolConfig::new().with_thread_count(4),
//! ))
//! .unwrap();
//! let handle = executor.submit(SubmitInfo::new(Task::new(|| 1 + 1))).unwrap();
//! assert_eq!(handle.join(), 2);
//! executor.join();
//! ```

mod config;
mod diagnostics;
mod error;
mod executor;
mod extensions;
mod group;
mod handle;
mod queue;
mod task;
mod work_item;

pub use config::{
    AllocatorOverride, Backpressure, ExecutorCreateInfo, ExecutorKind, Priority, QueueCreateInfo,
    SubmitInfo, TaskGroupCreateInfo, ThreadPoolConfig,
};
pub use diagnostics::{Diagnostics, SubmitSummary, TraceContext};
pub use error::{Result, Status, TASK_PANIC_SENTINEL};
pub use executor::thread_pool::ThreadPoolExecutor;
pub use executor::{create_executor, Executor, ExecutorCapabilities};
pub use extensions::Extensions;
pub use group::TaskGroup;
pub use handle::TaskHandle;
pub use queue::{BoundedQueue, PushError};
pub use task::Task;
