//! Wake-on-push queue: a [`FixedQueue`] coupled to one waiting task.
//!
//! The queue remembers the last consumer as its *waiter*. A successful
//! `send` notifies that waiter through the scheduler, so a consumer task
//! that found the queue empty and parked itself gets re-armed on the same
//! tick the data arrives (or the next one, if its tick already passed).
//!
//! Single producer, single consumer: there is exactly one waiter slot, and
//! a second consumer would simply steal it.

use crate::sched::contract::{Notifier, TaskId};
use crate::stdx::FixedQueue;

/// SPSC FIFO whose producer wakes the registered consumer task.
pub struct NotifyingQueue<T, const N: usize> {
    queue: FixedQueue<T, N>,
    /// Task to notify on the next successful push.
    waiter: Option<TaskId>,
}

impl<T, const N: usize> NotifyingQueue<T, N> {
    pub fn new() -> Self {
        Self {
            queue: FixedQueue::new(),
            waiter: None,
        }
    }

    /// Producer side: pushes `value` and wakes the waiter, if any.
    ///
    /// Returns `false` (leaving the waiter unnotified) when the queue is
    /// full; the value is dropped, matching "producer outpaced consumer"
    /// being the producer's problem to meter.
    pub fn send<S>(&mut self, sched: &mut S, value: T) -> bool
    where
        S: Notifier + ?Sized,
    {
        if self.queue.try_push(value).is_err() {
            return false;
        }
        if let Some(waiter) = self.waiter {
            sched.notify_give(waiter);
        }
        true
    }

    /// Consumer side: pops the oldest element.
    ///
    /// On success the *current* task (when called from a task body) becomes
    /// the waiter for future sends. On an empty queue with `block` set, the
    /// current task is registered as waiter so a future `send` re-arms it;
    /// without `block` the waiter is left untouched. Never blocks the
    /// caller; "blocking" is expressed by returning, auto-suspending, and
    /// being notified back awake.
    pub fn receive<S>(&mut self, sched: &S, block: bool) -> Option<T>
    where
        S: Notifier + ?Sized,
    {
        if let Some(value) = self.queue.try_pop() {
            self.waiter = sched.current_task();
            return Some(value);
        }
        if block {
            self.waiter = sched.current_task();
        }
        None
    }

    #[inline]
    pub fn len(&self) -> u8 {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    #[inline]
    pub fn capacity(&self) -> u8 {
        self.queue.capacity()
    }

    /// Drops all queued elements; the waiter registration survives.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<T, const N: usize> Default for NotifyingQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
