//! The enqueued unit the worker pool actually moves through the queue: a task plus the handle
//! it completes and whatever trace context travels with it.

use crate::diagnostics::TraceContext;
use crate::handle::TaskHandle;
use crate::task::Task;

pub(crate) struct WorkItem {
    pub(crate) task: Task,
    pub(crate) handle: TaskHandle,
    pub(crate) trace_context: Option<TraceContext>,
}
