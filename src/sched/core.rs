//! The tick dispatcher: fixed task table, priority-ordered drain, bounded
//! same-tick cascades.
//!
//! # Model
//!
//! The scheduler owns `N` task slots (`N <= 32`) and a key vector sorted
//! priority-descending. External code calls [`Scheduler::run`] on every
//! main-loop iteration with a monotonic millisecond timestamp; `run` gates
//! on the tick quantum, then drains every due, enabled task in priority
//! order, invoking each body at most once per tick.
//!
//! A body requests its next release through the [`SchedulerApi`] it
//! receives (`delay`, `yield_next_tick`, `delay_until`); the dispatcher
//! commits that request after the body returns. A body that returns
//! without a request is auto-suspended.
//!
//! # Invariants
//!
//! - The order vector holds exactly one key per in-use slot.
//! - A task is dispatched at most once per tick (`ran_mask`).
//! - `current_id` is `Some` only while a body is executing.
//! - `next_due_ms` is `u32::MAX` or a wrap-relative lower bound on every
//!   ready task's wake; `u32::MAX` disables the fast path, so a stale
//!   cache can only cost a walk, never a missed dispatch.
//!
//! # Time
//!
//! All comparisons between `u32` millisecond values go through [`earlier`],
//! which compares the sign of the wrapping difference. The timeline has no
//! absolute order, only "within half the 32-bit range" relative order, and
//! that is sufficient because the quantum and every delay are far below
//! `2^31` ms.
//!
//! # Catch-up
//!
//! `run` consumes exactly one quantum per gate-passing call. A caller that
//! stalled for many quanta catches up across subsequent calls without
//! losing tick phase; there is no jump-to-now policy.

use crate::sched::contract::{Notifier, Priority, SchedulerApi, TaskFn, TaskId};
use crate::sched::task::{Task, TaskKey};
use crate::stdx::{BitSet32, FixedVec};

/// Wrap-safe "a is before b" on the 32-bit millisecond circle.
#[inline]
pub(crate) fn earlier(a: u32, b: u32) -> bool {
    (a.wrapping_sub(b) as i32) < 0
}

/// Cooperative priority scheduler over `N` fixed task slots.
///
/// `N` must be in `1..=32`; the per-tick ran mask is 32 bits wide and the
/// packed sort key carries a 5-bit slot index.
pub struct Scheduler<const N: usize> {
    tasks: [Task; N],
    /// Priority-descending dispatch order, one key per in-use slot.
    order: FixedVec<TaskKey, N>,
    /// Pending direct-to-task notifications, saturating at 255.
    notify_count: [u8; N],

    /// Earliest wake among ready tasks, or `u32::MAX` for "walk and see".
    next_due_ms: u32,
    /// Timestamp of the last processed tick.
    last_tick_ms: u32,
    /// The scheduler's notion of now; equals `last_tick_ms` after advance.
    tick_now_ms: u32,
    /// Cadence quantum, >= 1 ms.
    tick_ms: u8,

    /// Running task, `Some` only inside a dispatch.
    current_id: Option<TaskId>,
    /// Scheduled release of the running task, the `delay_until` phase
    /// reference.
    current_anchor_ms: u32,
    /// Next-wake request from the running body.
    override_set: bool,
    override_next_ms: u32,

    /// Some action armed a task for this tick; worth another drain pass.
    cascade_pending: bool,
    /// Slots already dispatched this tick.
    ran_mask: BitSet32,
}

impl<const N: usize> Scheduler<N> {
    const VALID: () = assert!(
        N >= 1 && N <= 32,
        "Scheduler supports 1..=32 task slots (ran-mask and key width)"
    );

    /// Creates a scheduler whose tick phase is bound to `now_ms`.
    ///
    /// `last_tick` is backdated by one quantum so the first `run(now_ms)`
    /// already processes a tick; tasks created with zero delay before that
    /// call fire at `now_ms` itself. A zero `quantum_ms` is clamped to
    /// 1 ms.
    pub fn new(now_ms: u32, quantum_ms: u8) -> Self {
        let () = Self::VALID;
        let tick_ms = quantum_ms.max(1);
        Self {
            tasks: [Task::free(); N],
            order: FixedVec::new(),
            notify_count: [0; N],
            next_due_ms: u32::MAX,
            last_tick_ms: now_ms.wrapping_sub(u32::from(tick_ms)),
            tick_now_ms: now_ms,
            tick_ms,
            current_id: None,
            current_anchor_ms: 0,
            override_set: false,
            override_next_ms: 0,
            cascade_pending: false,
            ran_mask: BitSet32::empty(),
        }
    }

    #[inline]
    fn slot_in_use(&self, handle: TaskId) -> bool {
        usize::from(handle) < N && self.tasks[usize::from(handle)].meta.in_use()
    }

    /// Position of `handle`'s key in the order vector, matched by slot
    /// index so a priority change between insert and lookup cannot miss.
    fn order_pos_of(&self, handle: TaskId) -> Option<usize> {
        (0..self.order.len()).find(|&k| self.order[k].idx() == handle)
    }

    #[inline]
    fn fold_next_due(&mut self, wake_ms: u32) {
        if earlier(wake_ms, self.next_due_ms) {
            self.next_due_ms = wake_ms;
        }
    }

    /// Creates a task in the lowest free slot.
    ///
    /// The task starts enabled, first due `delay_ms` after the current
    /// tick. Returns `None` when all `N` slots are taken.
    pub fn create(
        &mut self,
        callback: TaskFn,
        delay_ms: u32,
        prio: Priority,
    ) -> Option<TaskId> {
        let slot = (0..N).find(|&i| !self.tasks[i].meta.in_use())?;

        let task = &mut self.tasks[slot];
        task.callback = Some(callback);
        task.next_wake_ms = self.tick_now_ms.wrapping_add(delay_ms);
        task.meta.clear();
        task.meta.set_in_use(true);
        task.meta.set_enabled(true);
        task.meta.set_prio(prio);
        self.notify_count[slot] = 0;

        let handle = slot as TaskId;
        self.order.push_back(TaskKey::new(prio, handle));
        self.order.sort_descending();

        let wake = self.tasks[slot].next_wake_ms;
        self.fold_next_due(wake);
        Some(handle)
    }

    /// Frees a task's slot; stale handles are a no-op.
    pub fn delete(&mut self, handle: TaskId) {
        if !self.slot_in_use(handle) {
            return;
        }
        self.tasks[usize::from(handle)].mark_free();
        self.notify_count[usize::from(handle)] = 0;
        if let Some(pos) = self.order_pos_of(handle) {
            self.order.erase(pos);
        }
    }

    /// Disables a task. Its wake time and pending notifications survive, so
    /// a later [`Scheduler::resume`] continues where it left off.
    pub fn suspend(&mut self, handle: TaskId) {
        if !self.slot_in_use(handle) {
            return;
        }
        self.tasks[usize::from(handle)].meta.set_enabled(false);
    }

    /// Re-enables a task and arms it for the current tick; it runs this
    /// tick unless it already did.
    pub fn resume(&mut self, handle: TaskId) {
        if !self.slot_in_use(handle) {
            return;
        }
        let task = &mut self.tasks[usize::from(handle)];
        task.next_wake_ms = self.tick_now_ms;
        task.meta.set_enabled(true);
        self.cascade_pending = true;
        let wake = self.tasks[usize::from(handle)].next_wake_ms;
        self.fold_next_due(wake);
    }

    /// Re-enables a task, due `delay_ms` after the current tick. Zero delay
    /// behaves like [`Scheduler::resume`].
    pub fn resume_after(&mut self, handle: TaskId, delay_ms: u32) {
        if !self.slot_in_use(handle) {
            return;
        }
        let task = &mut self.tasks[usize::from(handle)];
        task.next_wake_ms = self.tick_now_ms.wrapping_add(delay_ms);
        task.meta.set_enabled(true);
        if delay_ms == 0 {
            self.cascade_pending = true;
        }
        let wake = self.tasks[usize::from(handle)].next_wake_ms;
        self.fold_next_due(wake);
    }

    /// Delivers a notification: saturating-increments the task's counter
    /// and arms it for the current tick. Safe to call from outside a
    /// callback.
    pub fn notify_give(&mut self, handle: TaskId) {
        if !self.slot_in_use(handle) {
            return;
        }
        let slot = usize::from(handle);
        self.notify_count[slot] = self.notify_count[slot].saturating_add(1);
        let task = &mut self.tasks[slot];
        task.meta.set_enabled(true);
        task.next_wake_ms = self.tick_now_ms;
        self.cascade_pending = true;
        let wake = self.tasks[slot].next_wake_ms;
        self.fold_next_due(wake);
    }

    /// Consumes pending notifications of the running task.
    ///
    /// With `clear_on_exit` the whole count is taken (counting-semaphore
    /// semantics); otherwise one is taken and 1 returned (binary
    /// semantics). Returns 0 outside a callback or with nothing pending.
    pub fn notify_take(&mut self, clear_on_exit: bool) -> u8 {
        let Some(id) = self.current_id else {
            return 0;
        };
        let count = &mut self.notify_count[usize::from(id)];
        if *count == 0 {
            return 0;
        }
        if clear_on_exit {
            let taken = *count;
            *count = 0;
            taken
        } else {
            *count -= 1;
            1
        }
    }

    /// Handle of the running task, `None` between dispatches.
    #[inline]
    pub fn current_task(&self) -> Option<TaskId> {
        self.current_id
    }

    /// The scheduler's current tick time (ms).
    #[inline]
    pub fn tick_count(&self) -> u32 {
        self.tick_now_ms
    }

    /// Arms the running task to wake `delay_ms` after the current tick.
    pub fn delay(&mut self, delay_ms: u32) {
        if self.current_id.is_none() {
            return;
        }
        self.override_set = true;
        self.override_next_ms = self.tick_now_ms.wrapping_add(delay_ms);
    }

    /// Arms the running task for the next tick. The wake is the current
    /// tick, but the ran mask keeps it from re-running before the tick
    /// advances.
    pub fn yield_next_tick(&mut self) {
        if self.current_id.is_none() {
            return;
        }
        self.override_set = true;
        self.override_next_ms = self.tick_now_ms;
    }

    /// Period-locked delay, phase-anchored on the running task's scheduled
    /// release rather than on "now".
    ///
    /// On time (lateness below one period) the next wake is
    /// `anchor + period`, so the release train stays at
    /// `anchor + n * period` with no drift from dispatch jitter. When late
    /// by one period or more, the wake skips ahead by whole periods
    /// (one integer division) so a slot is never fired twice.
    pub fn delay_until(&mut self, period_ms: u32) {
        if self.current_id.is_none() {
            return;
        }
        if period_ms == 0 {
            self.override_set = true;
            self.override_next_ms = self.tick_now_ms;
            return;
        }

        let anchor = self.current_anchor_ms;
        let late = self.tick_now_ms.wrapping_sub(anchor);

        if late < period_ms {
            self.override_set = true;
            self.override_next_ms = anchor.wrapping_add(period_ms);
            return;
        }

        let periods = late / period_ms + 1;
        self.override_set = true;
        self.override_next_ms = anchor.wrapping_add(periods.wrapping_mul(period_ms));
    }

    /// Changes a task's priority and rebuilds the dispatch order. Wake
    /// times are untouched.
    pub fn priority_set(&mut self, handle: TaskId, prio: Priority) {
        if !self.slot_in_use(handle) {
            return;
        }
        self.tasks[usize::from(handle)].meta.set_prio(prio);
        self.order.clear();
        for i in 0..N {
            if self.tasks[i].meta.in_use() {
                self.order
                    .push_back(TaskKey::new(self.tasks[i].meta.prio(), i as TaskId));
            }
        }
        self.order.sort_descending();
    }

    /// A task's priority, or 0 for stale handles.
    pub fn priority_of(&self, handle: TaskId) -> Priority {
        if self.slot_in_use(handle) {
            self.tasks[usize::from(handle)].meta.prio()
        } else {
            0
        }
    }

    /// The running task's priority, or 0 outside a callback.
    pub fn current_priority(&self) -> Priority {
        match self.current_id {
            Some(id) => self.tasks[usize::from(id)].meta.prio(),
            None => 0,
        }
    }

    /// Number of in-use task slots.
    pub fn task_count(&self) -> usize {
        (0..N).filter(|&i| self.tasks[i].meta.in_use()).count()
    }

    /// A task's pending wake time, or `None` for stale handles.
    pub fn next_wake(&self, handle: TaskId) -> Option<u32> {
        self.slot_in_use(handle)
            .then(|| self.tasks[usize::from(handle)].next_wake_ms)
    }

    /// Whether a task is enabled; `false` for stale handles.
    pub fn is_enabled(&self, handle: TaskId) -> bool {
        self.slot_in_use(handle) && self.tasks[usize::from(handle)].meta.enabled()
    }

    /// A task's pending notification count; 0 for stale handles.
    pub fn pending_notifications(&self, handle: TaskId) -> u8 {
        if self.slot_in_use(handle) {
            self.notify_count[usize::from(handle)]
        } else {
            0
        }
    }

    /// Processes at most one tick.
    ///
    /// Gates on the quantum, advances scheduler time by exactly one
    /// quantum, then drains due tasks priority-descending. After the drain
    /// it repeats the walk while some action armed a same-tick wake and the
    /// previous pass dispatched something, bounded by `N` passes; the ran
    /// mask keeps every task at one dispatch per tick. Never blocks.
    ///
    /// `now_ms` must be monotonic modulo 32-bit wrap.
    pub fn run(&mut self, now_ms: u32) {
        // Cadence gate, wrap-safe via unsigned subtract.
        if now_ms.wrapping_sub(self.last_tick_ms) < u32::from(self.tick_ms) {
            return;
        }
        self.last_tick_ms = self.last_tick_ms.wrapping_add(u32::from(self.tick_ms));
        self.tick_now_ms = self.last_tick_ms;

        // Fast path: nothing due yet.
        if earlier(self.tick_now_ms, self.next_due_ms) {
            return;
        }

        let mut new_next_due = u32::MAX;
        self.ran_mask.clear();
        self.cascade_pending = false;

        let mut passes = 0;
        loop {
            let mut any_ran_this_pass = false;

            // Walk by position, re-reading bounds every step: a body may
            // create or delete tasks mid-walk.
            let mut pos = 0;
            while pos < self.order.len() {
                let idx = self.order[pos].idx();
                pos += 1;
                let slot = usize::from(idx);

                // Snapshot before dispatch; the body may rewrite the slot.
                let snapshot = self.tasks[slot];
                if !snapshot.ready() {
                    continue;
                }
                if self.ran_mask.get(idx) {
                    continue;
                }
                if earlier(self.tick_now_ms, snapshot.next_wake_ms) {
                    if earlier(snapshot.next_wake_ms, new_next_due) {
                        new_next_due = snapshot.next_wake_ms;
                    }
                    continue;
                }

                let Some(callback) = snapshot.callback else {
                    continue;
                };
                self.current_id = Some(idx);
                self.current_anchor_ms = snapshot.next_wake_ms;
                self.override_set = false;

                callback(self);

                self.current_id = None;
                self.ran_mask.set(idx);
                any_ran_this_pass = true;

                if self.override_set {
                    let task = &mut self.tasks[slot];
                    task.next_wake_ms = self.override_next_ms;
                    task.meta.set_enabled(true);
                    if earlier(task.next_wake_ms, new_next_due) {
                        new_next_due = task.next_wake_ms;
                    }
                } else {
                    // No wake requested: assume finished, auto-suspend.
                    self.tasks[slot].meta.set_enabled(false);
                }
            }

            self.cascade_pending = self.cascade_pending && any_ran_this_pass;
            passes += 1;
            if !self.cascade_pending || passes >= N {
                break;
            }
        }

        self.next_due_ms = new_next_due;
    }
}

impl<const N: usize> Notifier for Scheduler<N> {
    fn notify_give(&mut self, handle: TaskId) {
        self.notify_give(handle);
    }

    fn current_task(&self) -> Option<TaskId> {
        self.current_task()
    }
}

impl<const N: usize> SchedulerApi for Scheduler<N> {
    fn create(&mut self, callback: TaskFn, delay_ms: u32, prio: Priority) -> Option<TaskId> {
        self.create(callback, delay_ms, prio)
    }

    fn delete(&mut self, handle: TaskId) {
        self.delete(handle);
    }

    fn suspend(&mut self, handle: TaskId) {
        self.suspend(handle);
    }

    fn resume(&mut self, handle: TaskId) {
        self.resume(handle);
    }

    fn resume_after(&mut self, handle: TaskId, delay_ms: u32) {
        self.resume_after(handle, delay_ms);
    }

    fn notify_take(&mut self, clear_on_exit: bool) -> u8 {
        self.notify_take(clear_on_exit)
    }

    fn tick_count(&self) -> u32 {
        self.tick_count()
    }

    fn delay(&mut self, delay_ms: u32) {
        self.delay(delay_ms);
    }

    fn yield_next_tick(&mut self) {
        self.yield_next_tick();
    }

    fn delay_until(&mut self, period_ms: u32) {
        self.delay_until(period_ms);
    }

    fn priority_set(&mut self, handle: TaskId, prio: Priority) {
        self.priority_set(handle, prio);
    }

    fn priority_of(&self, handle: TaskId) -> Priority {
        self.priority_of(handle)
    }

    fn current_priority(&self) -> Priority {
        self.current_priority()
    }
}
