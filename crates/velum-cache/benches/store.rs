//! Expiration store benchmarks.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::time::Duration;
use tokio::runtime::Runtime;
use velum_cache::{ExpirationCache, ExpirationCacheConfig};

fn store_benchmarks(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let cache: ExpirationCache<u64> =
        rt.block_on(async { ExpirationCache::new(ExpirationCacheConfig::default()) });

    let mut group = c.benchmark_group("expiration_store");
    group.throughput(Throughput::Elements(1));

    group.bench_function("put", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i = i.wrapping_add(1);
            cache.put(&format!("1:bench{}.example", i % 10_000), i, Duration::from_secs(600));
        })
    });

    group.bench_function("get_hit", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i = i.wrapping_add(1);
            black_box(cache.get(&format!("1:bench{}.example", i % 10_000)));
        })
    });

    group.bench_function("get_miss", |b| {
        b.iter(|| black_box(cache.get("1:absent.example")));
    });

    group.finish();
}

criterion_group!(benches, store_benchmarks);
criterion_main!(benches);
