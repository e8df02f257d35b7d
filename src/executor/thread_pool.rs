//! The only executor kind this crate implements: a fixed-size pool of worker threads draining a
//! shared bounded queue.

use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::config::{
    Backpressure, BackpressureExt, DiagnosticsExt, ExecutorCreateInfo, SubmitInfo, ThreadPoolExt,
    TraceContextExt,
};
use crate::diagnostics::{Diagnostics, NoopDiagnostics, SubmitSummary};
use crate::error::{Result, Status, TASK_PANIC_SENTINEL};
use crate::executor::{Executor, ExecutorCapabilities};
use crate::handle::TaskHandle;
use crate::queue::BoundedQueue;
use crate::task::Task;
use crate::work_item::WorkItem;

const DEFAULT_THREAD_COUNT: usize = 1;
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    Running,
    Closing,
    Closed,
}

/// A pool of worker threads, all draining one [`BoundedQueue<WorkItem>`].
///
/// `state` and the queue's own `closed` flag transition together: `close()` flips `state` to
/// `Closing` and closes the queue under the same lock, so no worker can observe one without the
/// other. `close` always happens-before any worker observing `Closed` and exiting.
pub struct ThreadPoolExecutor {
    queue: Arc<BoundedQueue<WorkItem>>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    thread_count: usize,
    backpressure: Backpressure,
    diagnostics: Arc<dyn Diagnostics>,
    state: Mutex<LifecycleState>,
    num_panics: Arc<AtomicUsize>,
}

impl ThreadPoolExecutor {
    pub fn new(info: ExecutorCreateInfo) -> Result<Arc<Self>> {
        let config = info
            .extensions
            .find::<ThreadPoolExt>()
            .map(|ext| ext.0.clone())
            .unwrap_or_default();
        let thread_count = if config.thread_count == 0 {
            DEFAULT_THREAD_COUNT
        } else {
            config.thread_count
        };
        let queue_capacity = if config.queue_capacity == 0 {
            DEFAULT_QUEUE_CAPACITY
        } else {
            config.queue_capacity
        };
        let diagnostics: Arc<dyn Diagnostics> = info
            .extensions
            .find::<DiagnosticsExt>()
            .map(|ext| ext.0.clone())
            .unwrap_or_else(|| Arc::new(NoopDiagnostics));

        let queue = Arc::new(BoundedQueue::new(queue_capacity)?);
        let num_panics = Arc::new(AtomicUsize::new(0));
        let mut threads = Vec::with_capacity(thread_count);
        for index in 0..thread_count {
            let queue = queue.clone();
            let diagnostics = diagnostics.clone();
            let num_panics = num_panics.clone();
            let spawned = thread::Builder::new()
                .name(format!("texec-worker-{index}"))
                .spawn(move || worker_loop(queue, diagnostics, num_panics));
            match spawned {
                Ok(handle) => threads.push(handle),
                Err(_) => {
                    tracing::error!(index, "failed to spawn worker thread, unwinding pool create");
                    queue.close();
                    for handle in threads {
                        let _ = handle.join();
                    }
                    return Err(Status::InternalError("failed to spawn worker thread"));
                }
            }
        }
        tracing::debug!(thread_count, queue_capacity, "thread pool executor created");

        Ok(Arc::new(ThreadPoolExecutor {
            queue,
            threads: Mutex::new(threads),
            thread_count,
            backpressure: config.backpressure,
            diagnostics,
            state: Mutex::new(LifecycleState::Running),
            num_panics,
        }))
    }

    /// Total number of tasks whose `run` closure unwound instead of returning, across the
    /// pool's lifetime.
    pub fn num_panics(&self) -> usize {
        self.num_panics.load(Ordering::Relaxed)
    }
}

impl Executor for ThreadPoolExecutor {
    fn submit(&self, info: SubmitInfo) -> Result<TaskHandle> {
        let backpressure = info
            .extensions
            .find::<BackpressureExt>()
            .map(|ext| ext.0)
            .unwrap_or(self.backpressure);
        let trace_context = info
            .extensions
            .find::<TraceContextExt>()
            .map(|ext| ext.0.clone());
        self.diagnostics.on_submit(&SubmitSummary { backpressure });

        let handle = TaskHandle::new();
        let item = WorkItem {
            task: info.task,
            handle: handle.clone(),
            trace_context,
        };

        match backpressure {
            Backpressure::Reject => {
                self.queue.try_push(item).map_err(|err| {
                    if err.status == Status::Rejected {
                        tracing::warn!("submit rejected, queue is full");
                    }
                    err.status
                })?;
            }
            Backpressure::Block => {
                self.queue.push(item).map_err(|err| err.status)?;
            }
            Backpressure::CallerRuns => {
                if let Err(err) = self.queue.try_push(item) {
                    if err.status == Status::Closed {
                        return Err(Status::Closed);
                    }
                    consume(err.item, &self.diagnostics, &self.num_panics);
                }
            }
        }
        Ok(handle)
    }

    fn close(&self) {
        let mut state = self.state.lock();
        if *state == LifecycleState::Running {
            *state = LifecycleState::Closing;
            self.queue.close();
            tracing::debug!("thread pool executor closing");
        }
    }

    fn join(&self) {
        self.close();
        let threads = mem::take(&mut *self.threads.lock());
        for thread in threads {
            let _ = thread.join();
        }
        *self.state.lock() = LifecycleState::Closed;
        tracing::debug!("thread pool executor joined");
    }

    fn destroy(&self) -> Result<()> {
        if *self.state.lock() == LifecycleState::Closed {
            tracing::debug!("thread pool executor destroyed");
            Ok(())
        } else {
            Err(Status::Busy)
        }
    }

    fn query(&self) -> ExecutorCapabilities {
        ExecutorCapabilities {
            worker_count: self.thread_count,
            supports_priority: false,
            supports_deadline: false,
            supports_tracing: true,
        }
    }
}

fn worker_loop(
    queue: Arc<BoundedQueue<WorkItem>>,
    diagnostics: Arc<dyn Diagnostics>,
    num_panics: Arc<AtomicUsize>,
) {
    tracing::debug!("worker started");
    loop {
        match queue.pop() {
            Ok(item) => consume(item, &diagnostics, &num_panics),
            Err(Status::Closed) => break,
            Err(other) => unreachable!("BoundedQueue::pop only returns Ok or Closed, got {other:?}"),
        }
    }
    tracing::debug!("worker stopped");
}

/// Runs one work item to completion: begin hook, `run`, end hook, `cleanup`, complete the handle.
///
/// A panicking `run` is caught so it never takes the worker thread down with it: the task's
/// result becomes [`TASK_PANIC_SENTINEL`], `cleanup` still runs (itself panic-guarded, since a
/// cleanup closure that unwinds must not either), and the loop keeps draining.
fn consume(item: WorkItem, diagnostics: &Arc<dyn Diagnostics>, num_panics: &AtomicUsize) {
    let WorkItem {
        task: Task { run, cleanup },
        handle,
        trace_context,
    } = item;

    diagnostics.on_task_begin(trace_context.as_ref());
    let result = match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(result) => result,
        Err(_) => {
            num_panics.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("task panicked during run");
            TASK_PANIC_SENTINEL
        }
    };
    diagnostics.on_task_end(trace_context.as_ref(), result);

    if let Some(cleanup) = cleanup {
        if panic::catch_unwind(AssertUnwindSafe(cleanup)).is_err() {
            tracing::error!("task cleanup panicked");
        }
    }

    handle.complete(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExecutorCreateInfo, ThreadPoolConfig};
    use crate::task::Task;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    fn pool(config: ThreadPoolConfig) -> Arc<ThreadPoolExecutor> {
        ThreadPoolExecutor::new(ExecutorCreateInfo::thread_pool(config)).unwrap()
    }

    #[test]
    fn submit_runs_task_and_publishes_result() {
        let pool = pool(ThreadPoolConfig::new().with_thread_count(2));
        let handle = pool.submit(SubmitInfo::new(Task::new(|| 42))).unwrap();
        assert_eq!(handle.join(), 42);
        pool.join();
    }

    #[test]
    fn reject_backpressure_fails_fast_when_queue_is_full() {
        let pool = pool(
            ThreadPoolConfig::new()
                .with_thread_count(0)
                .with_queue_capacity(1)
                .with_backpressure(Backpressure::Reject),
        );
        // no workers drain the queue in this test (thread_count resolves to 1 regardless, but
        // we never let the single worker grab the blocking item below)
        let blocker_handle = TaskHandle::new();
        let blocker = blocker_handle.clone();
        let started = Arc::new(AtomicBool::new(false));
        let started_flag = started.clone();
        pool.submit(SubmitInfo::new(Task::new(move || {
            started_flag.store(true, Ordering::SeqCst);
            blocker.wait();
            0
        })))
        .unwrap();
        while !started.load(Ordering::SeqCst) {
            thread::yield_now();
        }
        // the single worker is now parked inside the running task; the queue itself is empty,
        // so fill its one slot to force the next submit to reject.
        pool.submit(SubmitInfo::new(Task::new(|| 0))).unwrap();
        thread::sleep(Duration::from_millis(20));
        let result = pool.submit(SubmitInfo::new(Task::new(|| 0)));
        assert_eq!(result.err(), Some(Status::Rejected));
        blocker_handle.complete(0);
        pool.join();
    }

    #[test]
    fn caller_runs_executes_inline_on_rejection() {
        let pool = pool(
            ThreadPoolConfig::new()
                .with_thread_count(0)
                .with_queue_capacity(1)
                .with_backpressure(Backpressure::CallerRuns),
        );
        let blocker_handle = TaskHandle::new();
        let blocker = blocker_handle.clone();
        let started = Arc::new(AtomicBool::new(false));
        let started_flag = started.clone();
        pool.submit(SubmitInfo::new(Task::new(move || {
            started_flag.store(true, Ordering::SeqCst);
            blocker.wait();
            0
        })))
        .unwrap();
        while !started.load(Ordering::SeqCst) {
            thread::yield_now();
        }
        // the single worker is now parked inside the running task; fill the queue's one slot so
        // the next submit is guaranteed to find it full.
        pool.submit(SubmitInfo::new(Task::new(|| 0))).unwrap();

        let caller_thread = thread::current().id();
        let observed = Arc::new(Mutex::new(None));
        let observed_write = observed.clone();
        let handle = pool
            .submit(SubmitInfo::new(Task::new(move || {
                *observed_write.lock() = Some(thread::current().id());
                7
            })))
            .unwrap();
        assert_eq!(handle.result(), Ok(7));
        assert_eq!(*observed.lock(), Some(caller_thread));

        blocker_handle.complete(0);
        pool.join();
    }

    #[test]
    fn panicking_task_does_not_stop_the_pool() {
        let pool = pool(ThreadPoolConfig::new().with_thread_count(1));
        let panicking = pool
            .submit(SubmitInfo::new(Task::new(|| panic!("boom"))))
            .unwrap();
        assert_eq!(panicking.join(), TASK_PANIC_SENTINEL);
        assert_eq!(pool.num_panics(), 1);

        let survivor = pool.submit(SubmitInfo::new(Task::new(|| 9))).unwrap();
        assert_eq!(survivor.join(), 9);
        pool.join();
    }

    #[test]
    fn destroy_requires_join_first() {
        let pool = pool(ThreadPoolConfig::new());
        assert_eq!(pool.destroy().err(), Some(Status::Busy));
        pool.join();
        assert_eq!(pool.destroy(), Ok(()));
    }

    #[test]
    fn close_then_join_drains_remaining_queued_tasks() {
        let pool = pool(ThreadPoolConfig::new().with_thread_count(2).with_queue_capacity(64));
        let handles: Vec<_> = (0..50)
            .map(|i| pool.submit(SubmitInfo::new(Task::new(move || i))).unwrap())
            .collect();
        pool.close();
        assert!(pool
            .submit(SubmitInfo::new(Task::new(|| 0)))
            .err()
            .is_some());
        pool.join();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.result(), Ok(i as i32));
        }
    }
}
