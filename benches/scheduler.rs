//! Benchmarks for the tick dispatcher hot paths.
//!
//! The interesting costs are the per-call overhead when nothing is due
//! (the gate and the fast path, paid on every main-loop iteration) and the
//! full drain when every slot fires.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use ticksched::sched::TaskKey;
use ticksched::stdx::{FixedQueue, FixedVec};
use ticksched::{Scheduler, SchedulerApi};

fn body_yielder(sched: &mut dyn SchedulerApi) {
    sched.yield_next_tick();
}

fn body_periodic(sched: &mut dyn SchedulerApi) {
    sched.delay(1000);
}

fn bench_run_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler/run");

    // Gate closed: the same timestamp over and over.
    group.bench_function("gate_closed", |b| {
        let mut sched: Scheduler<32> = Scheduler::new(0, 1);
        for _ in 0..8 {
            let _ = sched.create(body_periodic, 1000, 3);
        }
        sched.run(1);
        b.iter(|| sched.run(black_box(1)));
    });

    // Gate passes, fast path returns: all wakes far in the future.
    group.bench_function("fast_path", |b| {
        let mut sched: Scheduler<32> = Scheduler::new(0, 1);
        for _ in 0..8 {
            let _ = sched.create(body_periodic, 1_000_000, 3);
        }
        sched.run(0);
        let mut now = 0u32;
        b.iter(|| {
            now = now.wrapping_add(1);
            sched.run(black_box(now));
        });
    });

    // Full drain: every slot due on every tick.
    for tasks in [8usize, 32] {
        group.throughput(Throughput::Elements(tasks as u64));
        group.bench_function(format!("drain_{tasks}_yielders"), |b| {
            let mut sched: Scheduler<32> = Scheduler::new(0, 1);
            for i in 0..tasks {
                let _ = sched.create(body_yielder, 0, (i % 8) as u8);
            }
            let mut now = 0u32;
            b.iter(|| {
                now = now.wrapping_add(1);
                sched.run(black_box(now));
            });
        });
    }

    group.finish();
}

fn bench_task_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler/churn");

    group.bench_function("create_delete", |b| {
        let mut sched: Scheduler<32> = Scheduler::new(0, 1);
        for _ in 0..16 {
            let _ = sched.create(body_periodic, 1000, 3);
        }
        b.iter(|| {
            let h = sched.create(body_periodic, 10, 5).unwrap();
            sched.delete(black_box(h));
        });
    });

    group.bench_function("priority_set_rebuild", |b| {
        let mut sched: Scheduler<32> = Scheduler::new(0, 1);
        let mut handles = Vec::new();
        for i in 0..32 {
            handles.push(sched.create(body_periodic, 1000, (i % 8) as u8).unwrap());
        }
        let mut flip = 0u8;
        b.iter(|| {
            flip = (flip + 1) & 7;
            sched.priority_set(black_box(handles[5]), flip);
        });
    });

    group.finish();
}

fn bench_containers(c: &mut Criterion) {
    let mut group = c.benchmark_group("stdx");

    group.bench_function("sort_descending_32_keys", |b| {
        b.iter(|| {
            let mut order: FixedVec<TaskKey, 32> = FixedVec::new();
            for i in 0..32u8 {
                order.push_back(TaskKey::new(i % 8, 31 - i));
            }
            order.sort_descending();
            black_box(order.len())
        });
    });

    group.bench_function("queue_push_pop", |b| {
        let mut queue: FixedQueue<u32, 8> = FixedQueue::new();
        b.iter(|| {
            let _ = queue.try_push(black_box(7));
            black_box(queue.try_pop())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_run_paths, bench_task_churn, bench_containers);
criterion_main!(benches);
