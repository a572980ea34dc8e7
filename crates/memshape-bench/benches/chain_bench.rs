//! Call-chain propagation benchmarks.
//!
//! Times produce -> pass -> serialize end to end, generation included, for
//! each storage shape and both payload sizes.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use memshape_core::record::{BigRecord, Payload, Record};
use memshape_core::scenario::{CATALOG, PayloadKind, StorageShape, Workload};
use memshape_core::{chain, payload_seed, scale_profile};

fn run<T: Payload>(shape: StorageShape, n: usize, seed: u64) -> String {
    match chain::run_chain::<T>(shape, n, seed) {
        Ok(text) => text,
        Err(err) => panic!("chain serialization failed for {}: {err}", shape.label()),
    }
}

fn bench_chain(c: &mut Criterion) {
    let profile = scale_profile();
    let seed = payload_seed();
    let mut group = c.benchmark_group("call_chain");
    group.sample_size(10);

    for sc in CATALOG {
        let Workload::CallChain { payload, shape } = sc.workload else {
            continue;
        };
        let n = sc.size(profile);
        match payload {
            PayloadKind::Record => {
                group.bench_function(sc.name, |b| {
                    b.iter(|| black_box(run::<Record>(shape, n, seed)));
                });
            }
            PayloadKind::BigRecord => {
                group.bench_function(sc.name, |b| {
                    b.iter(|| black_box(run::<BigRecord>(shape, n, seed)));
                });
            }
        }
    }
    group.finish();
}

criterion_group!(benches, bench_chain);
criterion_main!(benches);
