//! A simple collector of `TaskHandle`s, joined together as a unit.

use std::mem;

use parking_lot::Mutex;

use crate::config::TaskGroupCreateInfo;
use crate::error::{Result, Status};
use crate::handle::TaskHandle;

const DEFAULT_CAPACITY: usize = 8;

struct GroupState {
    handles: Vec<TaskHandle>,
    closed: bool,
}

/// Aggregates the handles returned by a batch of submits so the caller can wait on all of them
/// together, without hand-rolling a `Vec<TaskHandle>` and a loop.
///
/// A group does not own an executor or a queue; it only tracks handles. Submitting happens
/// through the executor as usual, with the resulting handle passed to [`TaskGroup::add`].
pub struct TaskGroup {
    state: Mutex<GroupState>,
}

impl TaskGroup {
    /// `max_tasks_hint == 0` resolves to a default starting capacity of 8; the hint only sizes
    /// the backing `Vec`'s initial allocation, it never caps how many handles can be added.
    pub fn new(info: TaskGroupCreateInfo) -> Result<Self> {
        let capacity = if info.max_tasks_hint == 0 {
            DEFAULT_CAPACITY
        } else {
            info.max_tasks_hint
        };
        Ok(TaskGroup {
            state: Mutex::new(GroupState {
                handles: Vec::with_capacity(capacity),
                closed: false,
            }),
        })
    }

    /// Adds a handle to the group. Fails with `Status::Closed` once the group has been waited on.
    pub fn add(&self, handle: TaskHandle) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(Status::Closed);
        }
        state.handles.push(handle);
        Ok(())
    }

    /// Waits for every handle added so far to complete, then closes the group to further `add`s.
    ///
    /// The handles are taken out of the group under the lock and waited on outside of it, so a
    /// concurrent `add` never blocks behind an in-progress `wait` (it simply fails once `wait`
    /// has flipped `closed`, which happens before any blocking join starts).
    pub fn wait(&self) {
        let handles = {
            let mut state = self.state.lock();
            state.closed = true;
            mem::take(&mut state.handles)
        };
        for handle in handles {
            handle.wait();
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the group. A no-op beyond dropping its handles: there is no separate resource to
    /// release in safe Rust, but taking `self` by value still enforces a one-shot create/destroy
    /// contract at the type level.
    pub fn destroy(self) {}
}
