//! A bounded, closable, FIFO blocking queue: the classical monitor pattern, one mutex and two
//! condition variables (`not_empty`, `not_full`).

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::config::QueueCreateInfo;
use crate::error::{Result, Status};

struct State<T> {
    buf: VecDeque<T>,
    capacity: usize,
    closed: bool,
}

/// The rejected item, handed back alongside the [`Status`] that explains the rejection.
///
/// Giving the item back lets `CALLER_RUNS` backpressure run it inline instead of losing it.
pub struct PushError<T> {
    pub item: T,
    pub status: Status,
}

impl<T> std::fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushError").field("status", &self.status).finish()
    }
}

impl<T> std::fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.status, f)
    }
}

impl<T> std::error::Error for PushError<T> {}

/// A thread-safe FIFO of capacity `k`, generic over its element type.
///
/// `texec`'s own use of this is always `BoundedQueue<WorkItem>`, but the type is not hardwired to
/// that, so it can be exercised directly (see the queue-lifecycle tests below and `tests/e2e.rs`
/// S6).
pub struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue of the given capacity, which must be at least 1.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Status::InvalidArgument);
        }
        Ok(BoundedQueue {
            state: Mutex::new(State {
                buf: VecDeque::with_capacity(capacity),
                capacity,
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        })
    }

    /// Creates a queue from a root descriptor. Equivalent to `new(info.capacity)`; the
    /// descriptor form exists so a queue can be created directly, the same way the executor
    /// creates its own internal queue, without depending on the executor at all.
    pub fn create(info: QueueCreateInfo) -> Result<Self> {
        Self::new(info.capacity)
    }

    /// Idempotent. Wakes every waiter so it can observe `closed` and re-evaluate its predicate.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            self.not_empty.notify_all();
            self.not_full.notify_all();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    /// Checked lifecycle teardown: `Ok(())` only once the queue is closed. Memory is actually
    /// freed by the normal `Drop` glue once the last owner goes away (there is no separate
    /// dealloc call to make in safe Rust); this method exists so callers can assert the
    /// close-before-destroy ordering explicitly, returning `Busy` if the queue is still open.
    pub fn destroy(&self) -> Result<()> {
        if self.is_closed() {
            Ok(())
        } else {
            Err(Status::Busy)
        }
    }

    /// Non-blocking push. Fails with `Status::Rejected` if full, `Status::Closed` if closed.
    pub fn try_push(&self, item: T) -> std::result::Result<(), PushError<T>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PushError { item, status: Status::Closed });
        }
        if state.buf.len() == state.capacity {
            return Err(PushError { item, status: Status::Rejected });
        }
        state.buf.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Non-blocking pop. Fails with `Status::Rejected` if empty and open, `Status::Closed` if
    /// empty and closed (drain semantics: a closed-but-non-empty queue still pops successfully).
    pub fn try_pop(&self) -> Result<T> {
        let mut state = self.state.lock();
        if let Some(item) = state.buf.pop_front() {
            self.not_full.notify_one();
            return Ok(item);
        }
        if state.closed {
            Err(Status::Closed)
        } else {
            Err(Status::Rejected)
        }
    }

    /// Blocks while full and open. A concurrent `close` wakes blocked pushers, which then
    /// return `Status::Closed` instead of completing the push.
    pub fn push(&self, item: T) -> std::result::Result<(), PushError<T>> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(PushError { item, status: Status::Closed });
            }
            if state.buf.len() < state.capacity {
                break;
            }
            self.not_full.wait(&mut state);
        }
        state.buf.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Blocks while empty and open. Drain semantics: if closed while non-empty, still pops.
    pub fn pop(&self) -> Result<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.buf.pop_front() {
                self.not_full.notify_one();
                return Ok(item);
            }
            if state.closed {
                return Err(Status::Closed);
            }
            self.not_empty.wait(&mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn create_from_descriptor_matches_new() {
        let q = BoundedQueue::<i32>::create(QueueCreateInfo::new(2)).unwrap();
        assert_eq!(q.capacity(), 2);
    }

    #[test]
    fn capacity_zero_is_invalid() {
        assert_eq!(BoundedQueue::<i32>::new(0).err(), Some(Status::InvalidArgument));
    }

    #[test]
    fn fifo_order_is_preserved() {
        let q = BoundedQueue::new(4).unwrap();
        for i in 0..4 {
            q.try_push(i).unwrap();
        }
        let out: Vec<_> = (0..4).map(|_| q.try_pop().unwrap()).collect();
        assert_eq!(out, vec![0, 1, 2, 3]);
    }

    #[test]
    fn try_push_rejects_when_full() {
        let q = BoundedQueue::new(1).unwrap();
        q.try_push(1).unwrap();
        let err = q.try_push(2).unwrap_err();
        assert_eq!(err.status, Status::Rejected);
        assert_eq!(err.item, 2);
    }

    #[test]
    fn try_pop_rejects_when_empty_and_open() {
        let q = BoundedQueue::<i32>::new(1).unwrap();
        assert_eq!(q.try_pop().err(), Some(Status::Rejected));
    }

    #[test]
    fn drain_semantics_after_close() {
        let q = BoundedQueue::new(2).unwrap();
        q.try_push(1).unwrap();
        q.close();
        assert_eq!(q.try_pop(), Ok(1));
        assert_eq!(q.try_pop().err(), Some(Status::Closed));
    }

    #[test]
    fn destroy_requires_close_first() {
        let q = BoundedQueue::<i32>::new(1).unwrap();
        assert_eq!(q.destroy().err(), Some(Status::Busy));
        q.close();
        assert_eq!(q.destroy(), Ok(()));
    }

    #[test]
    fn push_never_exceeds_capacity_under_contention() {
        let q = Arc::new(BoundedQueue::new(8).unwrap());
        let producers: Vec<_> = (0..4)
            .map(|_| {
                let q = q.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        let _ = q.push(i);
                    }
                })
            })
            .collect();
        // Drain concurrently so producers don't permanently block on a full queue.
        let consumer_q = q.clone();
        let consumer = thread::spawn(move || {
            let mut total = 0;
            for _ in 0..200 {
                if consumer_q.pop().is_ok() {
                    total += 1;
                }
            }
            total
        });
        for p in producers {
            p.join().unwrap();
        }
        assert!(q.len() <= q.capacity());
        consumer_q_join(consumer);

        fn consumer_q_join(c: thread::JoinHandle<i32>) {
            assert_eq!(c.join().unwrap(), 200);
        }
    }

    #[test]
    fn blocking_push_unblocks_on_close() {
        let q = Arc::new(BoundedQueue::new(1).unwrap());
        q.try_push(0).unwrap();
        let blocked = q.clone();
        let t = thread::spawn(move || blocked.push(1));
        thread::sleep(Duration::from_millis(20));
        q.close();
        let result = t.join().unwrap();
        assert_eq!(result.err().map(|e| e.status), Some(Status::Closed));
    }
}
