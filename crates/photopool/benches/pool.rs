use std::collections::BTreeSet;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use photopool::{PhotoRecord, PoolReader, PoolWriter};
use photostore::{MemoryStore, Store};

fn seeded_reader(rt: &tokio::runtime::Runtime, photos: usize) -> PoolReader {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let categories: BTreeSet<String> = ["cats", "dogs"].iter().map(|c| c.to_string()).collect();
    let records: Vec<PhotoRecord> = (0..photos)
        .map(|n| {
            PhotoRecord::new(
                format!("/static/image{}.png", n),
                1_000_000, // large budgets so the pool never drains mid-bench
                categories.clone(),
            )
        })
        .collect();

    rt.block_on(PoolWriter::new(Arc::clone(&store)).write_records(&records))
        .unwrap();
    PoolReader::new(store)
}

fn bench_serve_from_pool(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("serve_from_pool");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("serve_1k_photos", |b| {
        let reader = seeded_reader(&rt, 1000);
        b.iter(|| black_box(rt.block_on(reader.serve_from_pool()).unwrap()));
    });

    group.finish();
}

fn bench_serve_from_categories(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("serve_from_categories");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("serve_1k_photos_union", |b| {
        let reader = seeded_reader(&rt, 1000);
        let requested: BTreeSet<String> = ["cats"].iter().map(|c| c.to_string()).collect();
        b.iter(|| black_box(rt.block_on(reader.serve_from_categories(&requested)).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_serve_from_pool, bench_serve_from_categories);
criterion_main!(benches);
