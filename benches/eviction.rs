use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use pagepool::pool::{BottomEvictor, BufferPool, Evictor, RandomEvictor};
use pagepool::store::MemStore;

const STORE_PAGES: usize = 256;
const POOL_SLOTS: usize = 32;

fn sequential_pass(evictor: Box<dyn Evictor>) {
    let store = Arc::new(MemStore::new(STORE_PAGES));
    let pool = BufferPool::new(POOL_SLOTS, store, evictor);
    for id in 0..STORE_PAGES {
        let page = pool.acquire(id).unwrap();
        black_box(page.clone_data());
    }
}

fn sliding_working_set_pass(evictor: Box<dyn Evictor>) {
    let store = Arc::new(MemStore::new(STORE_PAGES));
    let pool = BufferPool::new(POOL_SLOTS, store, evictor);
    for i in 0..STORE_PAGES * 4 {
        // a hot set that slides slowly across the store
        let id = (i / 8 + i % 8) % STORE_PAGES;
        pool.write_page(id, vec![0u8; 64]).unwrap();
    }
}

fn eviction_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential scan - pool smaller than store");
    group.sample_size(10);
    group.bench_function("bottom evictor", |b| {
        b.iter(|| sequential_pass(Box::new(BottomEvictor)));
    });
    group.bench_function("random evictor", |b| {
        b.iter(|| sequential_pass(Box::new(RandomEvictor)));
    });
    group.finish();

    let mut group = c.benchmark_group("sliding working set - write heavy");
    group.sample_size(10);
    group.bench_function("bottom evictor", |b| {
        b.iter(|| sliding_working_set_pass(Box::new(BottomEvictor)));
    });
    group.bench_function("random evictor", |b| {
        b.iter(|| sliding_working_set_pass(Box::new(RandomEvictor)));
    });
    group.finish();
}

criterion_group!(benches, eviction_benchmark);
criterion_main!(benches);
