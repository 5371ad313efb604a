//! Cooperative, priority-based task scheduling on a millisecond tick.
//!
//! `ticksched` offers RTOS-flavored primitives for single-core targets
//! that have nothing more than a monotonic `u32` millisecond counter: task
//! create/delete, suspend/resume, priorities, periodic delays,
//! direct-to-task notifications, and a wake-on-push SPSC queue. There are
//! no threads, no preemption, and no heap allocation; every structure is
//! sized at compile time.
//!
//! The host drives the scheduler from its main loop:
//!
//! ```
//! use ticksched::{Scheduler, SchedulerApi};
//!
//! fn blink(sched: &mut dyn SchedulerApi) {
//!     // toggle a pin, then come back in 500 ms
//!     sched.delay(500);
//! }
//!
//! let mut sched: Scheduler<8> = Scheduler::new(0, 1);
//! let blinker = sched.create(blink, 0, 3).unwrap();
//! assert_eq!(sched.priority_of(blinker), 3);
//! for now_ms in 0..32u32 {
//!     sched.run(now_ms); // in production: sched.run(now_ms())
//! }
//! ```
//!
//! Time wraps at 32 bits; all comparisons are wrap-safe, so a device that
//! runs past the 49.7-day counter rollover keeps scheduling correctly.

pub mod sched;
pub mod stdx;

pub use sched::{
    Notifier, NotifyingQueue, Priority, Scheduler, SchedulerApi, TaskFn, TaskId,
};
