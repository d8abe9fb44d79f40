use std::hint::black_box;

use bloomcheck::filters::bloomfilter::MembershipFilter;
use bloomcheck::filters::shared::SharedFilter;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

const EXPECTED_ITEMS: usize = 1_000_000;
const FALSE_POSITIVE_RATE: f64 = 0.02; // = 2%

fn setup_filter() -> MembershipFilter {
    MembershipFilter::new(EXPECTED_ITEMS, FALSE_POSITIVE_RATE).unwrap()
}

fn setup_shared() -> SharedFilter {
    SharedFilter::new(EXPECTED_ITEMS, FALSE_POSITIVE_RATE).unwrap()
}

fn benchmarks_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("setup");
    group.bench_function("filter", |b| b.iter(setup_filter));
    group.bench_function("shared", |b| b.iter(setup_shared));
    group.finish();
}

fn benchmarks_insert_many(c: &mut Criterion) {
    let n = 10_000u64;
    let mut group = c.benchmark_group("insert_many");
    group.bench_function("filter", |b| {
        b.iter_batched(
            setup_filter,
            |mut filter| {
                for i in 0..n {
                    filter.insert(&i.to_le_bytes());
                }
                filter
            },
            BatchSize::LargeInput,
        )
    });
    group.bench_function("shared", |b| {
        b.iter_batched(
            setup_shared,
            |filter| {
                for i in 0..n {
                    filter.insert(&i.to_le_bytes());
                }
                filter
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

fn benchmarks_query(c: &mut Criterion) {
    let mut filter = setup_filter();
    for i in 0..10_000u64 {
        filter.insert(&i.to_le_bytes());
    }

    let mut group = c.benchmark_group("query");
    group.bench_function("hit", |b| {
        let obj = 1337u64.to_le_bytes();
        b.iter(|| filter.query(black_box(&obj)))
    });
    group.bench_function("miss", |b| {
        let obj = 1_000_000_007u64.to_le_bytes();
        b.iter(|| filter.query(black_box(&obj)))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmarks_setup,
    benchmarks_insert_many,
    benchmarks_query,
);
criterion_main!(benches);
