//! Pool throughput benchmarks.
//!
//! Run with: cargo bench -p ept_core --bench pool_bench

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ept_core::{Hierarchy, Key, Pool};

const TASKS: u64 = 10_000;

/// Submit trivial tasks and wait for the pool to drain; measures queue
/// handoff cost under different queue capacities.
fn bench_submit_drain(c: &mut Criterion) {
  let mut group = c.benchmark_group("pool_submit_drain");
  group.throughput(Throughput::Elements(TASKS));

  for queue_size in [1usize, 16, 256] {
    let pool = Pool::new(4, queue_size).unwrap();
    let counter = Arc::new(AtomicU64::new(0));

    group.bench_with_input(BenchmarkId::from_parameter(queue_size), &queue_size, |b, _| {
      b.iter(|| {
        for _ in 0..TASKS {
          let counter = Arc::clone(&counter);
          pool
            .submit(move || {
              counter.fetch_add(1, Ordering::Relaxed);
              Ok(())
            })
            .unwrap();
        }
        pool.await_idle();
      });
    });
  }

  group.finish();
}

/// Concurrent merges into one shared hierarchy.
fn bench_hierarchy_merge(c: &mut Criterion) {
  let pool = Pool::new(4, 64).unwrap();

  c.bench_function("hierarchy_merge_4_workers", |b| {
    b.iter(|| {
      let hierarchy = Arc::new(Hierarchy::new());
      for x in 0..256u64 {
        let hierarchy = Arc::clone(&hierarchy);
        pool
          .submit(move || {
            for y in 0..16u64 {
              hierarchy.merge(Key::new(8, x, y, 0), x + y);
            }
            Ok(())
          })
          .unwrap();
      }
      pool.await_idle();
      black_box(hierarchy.len())
    });
  });
}

criterion_group!(benches, bench_submit_drain, bench_hierarchy_merge);
criterion_main!(benches);
