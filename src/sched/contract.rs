//! Capability traits and shared handle types for the scheduler layer.
//!
//! Components that only need to *wake* tasks (queues, drivers) depend on
//! [`Notifier`], the minimal seam: deliver a notification, identify the
//! running task. Task callbacks receive the full surface as
//! `&mut dyn SchedulerApi`, so task bodies stay independent of the
//! scheduler's compile-time slot count.

/// Task handle: the slot index of a task, `0..N`.
///
/// Handles are small and freely copyable. A handle outliving its task is
/// not an error; every operation taking a `TaskId` treats a stale or
/// out-of-range handle as a no-op.
pub type TaskId = u8;

/// Task priority, `0..=7`; 7 runs first. Values are masked to three bits.
pub type Priority = u8;

/// A task body. Runs to completion on every dispatch; "suspension" is
/// expressed by arming a next wake (`delay`, `yield_next_tick`,
/// `delay_until`) and returning. Returning without arming one auto-suspends
/// the task.
pub type TaskFn = fn(&mut dyn SchedulerApi);

/// Wake-delivery seam for notification-aware components.
///
/// This is the whole capability set a component like
/// [`NotifyingQueue`](crate::sched::notify_queue::NotifyingQueue) needs, so
/// it is all such components get.
pub trait Notifier {
    /// Increments the task's notification counter (saturating at 255) and
    /// arms it to run on the current tick. No-op on stale handles.
    fn notify_give(&mut self, handle: TaskId);

    /// Handle of the task whose callback is executing, or `None` between
    /// dispatches.
    fn current_task(&self) -> Option<TaskId>;
}

/// Full scheduler surface available to task callbacks.
///
/// Only `delay`, `yield_next_tick`, `delay_until`, `notify_take`,
/// `current_task` and `current_priority` are specific to the running task;
/// the rest mirror the external API so a callback can manage other tasks.
pub trait SchedulerApi: Notifier {
    /// Creates a task in the lowest free slot, enabled, first due
    /// `delay_ms` after the current tick. Returns `None` when every slot is
    /// taken.
    fn create(&mut self, callback: TaskFn, delay_ms: u32, prio: Priority) -> Option<TaskId>;

    /// Frees the task's slot and forgets its pending notifications.
    fn delete(&mut self, handle: TaskId);

    /// Disables the task without touching its wake time or notifications.
    fn suspend(&mut self, handle: TaskId);

    /// Re-enables the task and arms it for the current tick.
    fn resume(&mut self, handle: TaskId);

    /// Re-enables the task, due `delay_ms` after the current tick.
    /// `delay_ms == 0` behaves like [`SchedulerApi::resume`].
    fn resume_after(&mut self, handle: TaskId, delay_ms: u32);

    /// Consumes pending notifications of the *running* task: all of them
    /// when `clear_on_exit` (counting semantics), else one (binary
    /// semantics). Returns the count taken; 0 outside a callback.
    fn notify_take(&mut self, clear_on_exit: bool) -> u8;

    /// The scheduler's current tick time in milliseconds.
    fn tick_count(&self) -> u32;

    /// Arms the running task to wake `delay_ms` after the current tick.
    /// No-op outside a callback.
    fn delay(&mut self, delay_ms: u32);

    /// Arms the running task for the next tick. No-op outside a callback.
    fn yield_next_tick(&mut self);

    /// Period-locked delay: arms the running task for the first multiple of
    /// `period_ms` after its scheduled release time, skipping whole periods
    /// when chronically late. `period_ms == 0` behaves like
    /// [`SchedulerApi::yield_next_tick`]. No-op outside a callback.
    fn delay_until(&mut self, period_ms: u32);

    /// Changes a task's priority; wake times are untouched.
    fn priority_set(&mut self, handle: TaskId, prio: Priority);

    /// A task's priority, or 0 for stale handles.
    fn priority_of(&self, handle: TaskId) -> Priority;

    /// The running task's priority, or 0 outside a callback.
    fn current_priority(&self) -> Priority;
}
