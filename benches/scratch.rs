use std::hint::black_box;
use std::num::NonZeroUsize;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use cachescratch::{GlobalAllocWrap, Workload, run_workload};

fn workload(nthreads: u32, obj_size: usize) -> Workload {
    Workload {
        nthreads,
        iterations: 1_000,
        obj_size: NonZeroUsize::new(obj_size).unwrap(),
        repetitions: 64 * u64::from(nthreads),
    }
}

fn bench_scratch(c: &mut Criterion) {
    let mut group = c.benchmark_group("scratch");
    group.sample_size(20);

    let maxthreads = std::thread::available_parallelism().map_or(1, |n| n.get() as u32);
    let mut threadcounts = vec![1, 2, maxthreads];
    threadcounts.sort_unstable();
    threadcounts.dedup();
    for nthreads in threadcounts {
        for obj_size in [1, 8, 64] {
            let w = workload(nthreads, obj_size);
            group.throughput(Throughput::Bytes(w.iterations * 64 * obj_size as u64 * u64::from(nthreads)));
            group.bench_with_input(BenchmarkId::new(format!("threads-{nthreads}"), obj_size), &w, |b, w| {
                b.iter(|| black_box(run_workload(&GlobalAllocWrap, w).unwrap()))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_scratch);
criterion_main!(benches);
