//! Allocation-shape benchmarks.
//!
//! Builds ten million records either contiguously or one box per record,
//! then releases them. Each iteration reports the allocator events seen while
//! releasing (reclamation events) and the release wall time (pause).

use std::cell::RefCell;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use memshape_core::alloc_stats::{ReclaimTotals, run_allocation_shape};
use memshape_core::scenario::{CATALOG, Workload};
use memshape_core::{CountingAllocator, scale_profile};

#[global_allocator]
static ALLOC: CountingAllocator = CountingAllocator::system();

fn bench_allocation_shape(c: &mut Criterion) {
    let profile = scale_profile();
    let mut group = c.benchmark_group("allocation_shape");
    group.sample_size(10);

    for sc in CATALOG {
        let Workload::AllocationShape { layout } = sc.workload else {
            continue;
        };
        let n = sc.size(profile);
        let totals = RefCell::new(ReclaimTotals::default());

        group.bench_function(sc.name, |b| {
            b.iter_custom(|iters| {
                let mut elapsed = Duration::ZERO;
                for _ in 0..iters {
                    let sample = run_allocation_shape(&ALLOC, layout, n);
                    elapsed += sample.build + sample.reclaim.pause;
                    totals.borrow_mut().record(&sample);
                }
                elapsed.max(Duration::from_nanos(1))
            });
        });

        let t = totals.borrow();
        println!(
            "MEMSHAPE_BENCH scenario={} profile={} n={} iterations={} allocation_events={:.1} zeroed_allocation_events={:.1} reclaim_events={:.1} pause_ms={:.3}",
            sc.name,
            profile.label(),
            n,
            t.iterations,
            t.mean_allocation_events(),
            t.mean_zeroed_allocation_events(),
            t.mean_reclaim_events(),
            t.mean_pause_ms()
        );
    }
    group.finish();
}

criterion_group!(benches, bench_allocation_shape);
criterion_main!(benches);
