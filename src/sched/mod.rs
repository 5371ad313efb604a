//! The scheduler layer: task records, the tick dispatcher, and the
//! notification-coupled queue.
//!
//! # Module map
//! - `contract`: handle types and the capability traits task bodies and
//!   queues are written against.
//! - `task`: packed per-task storage (`TaskKey`, `TaskMeta`, `Task`).
//! - `core`: [`Scheduler`], the dispatch loop.
//! - `notify_queue`: [`NotifyingQueue`], wake-on-push SPSC FIFO.

pub mod contract;
pub mod core;
pub mod notify_queue;
pub mod task;

pub use self::contract::{Notifier, Priority, SchedulerApi, TaskFn, TaskId};
pub use self::core::Scheduler;
pub use self::notify_queue::NotifyingQueue;
pub use self::task::{Task, TaskKey, TaskMeta};
