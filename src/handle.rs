//! The refcounted completion cell returned by `submit`.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::{Result, Status};

struct State {
    done: bool,
    result: i32,
}

struct Inner {
    state: Mutex<State>,
    cv: Condvar,
}

/// A shared handle to a task's eventual result.
///
/// Reference counting is provided by `Arc`: cloning the handle shares ownership, and dropping the
/// last clone releases the underlying cell. Completion (`done`/`result`) is still guarded by an
/// explicit mutex and condition variable, since `Arc` says nothing about synchronizing the
/// payload, only about the payload's lifetime.
#[derive(Clone)]
pub struct TaskHandle(Arc<Inner>);

impl TaskHandle {
    pub(crate) fn new() -> Self {
        TaskHandle(Arc::new(Inner {
            state: Mutex::new(State {
                done: false,
                result: 0,
            }),
            cv: Condvar::new(),
        }))
    }

    /// Publishes `result` and wakes all waiters. A no-op if the handle is already done: the
    /// first `complete` wins, matching the idempotency the queue's drain and the CALLER_RUNS
    /// path both rely on.
    pub(crate) fn complete(&self, result: i32) {
        let mut state = self.0.state.lock();
        if !state.done {
            state.result = result;
            state.done = true;
            self.0.cv.notify_all();
        }
    }

    /// Blocks the calling thread until the task completes.
    pub fn wait(&self) {
        let mut state = self.0.state.lock();
        while !state.done {
            self.0.cv.wait(&mut state);
        }
    }

    /// Returns `true` if the task has completed, without blocking.
    pub fn is_done(&self) -> bool {
        self.0.state.lock().done
    }

    /// Returns the task's result, or `Status::NotReady` if it hasn't completed yet. Never blocks.
    pub fn result(&self) -> Result<i32> {
        let state = self.0.state.lock();
        if state.done {
            Ok(state.result)
        } else {
            Err(Status::NotReady)
        }
    }

    /// Waits for completion and returns the result. Equivalent to `wait()` followed by
    /// `result()`, offered as a blocking convenience.
    pub fn join(&self) -> i32 {
        self.wait();
        self.result().expect("handle must be done immediately after wait() returns")
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.0.state.lock();
        f.debug_struct("TaskHandle")
            .field("done", &state.done)
            .field("result", &state.done.then_some(state.result))
            .finish()
    }
}
