//! Validation Benchmarks
//!
//! Fan-out cost of one check against in-memory stores of various sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mustexist::{
    missing, must_exist_all, Expectations, MustExistConfig, PropertyMatcher, SimConfig,
    SimDocumentStore, SimKeyValueStore, StoreAdapter,
};
use serde_json::json;

use std::time::Duration;

// =============================================================================
// Setup Helpers
// =============================================================================

fn seeded_documents(size: usize) -> SimDocumentStore {
    let store = SimDocumentStore::new("persons", SimConfig::with_seed(42));
    for i in 0..size {
        store.insert(json!({"id": i, "lname": format!("name-{i}")}));
    }
    store
}

fn seeded_cache(size: usize) -> SimKeyValueStore {
    let store = SimKeyValueStore::new("cache", SimConfig::with_seed(43)).with_prefix("pers:");
    for i in 0..size {
        store.set_record(format!("p{i}"), &json!({"lname": format!("name-{i}")}));
    }
    store
}

/// Half present, half absent, ids and matchers interleaved across the range.
fn expectations_for(size: usize) -> Expectations {
    let mut expectations = Expectations::new();
    for i in (0..size * 2).step_by(size.max(20) / 10) {
        expectations = expectations
            .with_id(i64::try_from(i).unwrap())
            .with_props(PropertyMatcher::new().with("lname", format!("name-{i}")));
    }
    expectations
}

// =============================================================================
// Single Store
// =============================================================================

fn bench_missing_document_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate/document_store");
    group.measurement_time(Duration::from_secs(10));

    for size in [100, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let store = seeded_documents(size);
            let expectations = expectations_for(size);
            let config = MustExistConfig::default();

            b.to_async(&rt).iter(|| async {
                black_box(missing(&expectations, &store, &config).await.unwrap());
            });
        });
    }
    group.finish();
}

fn bench_concurrency_cap(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate/concurrency_cap");

    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = seeded_documents(1_000);
    let expectations = expectations_for(1_000);

    for limit in [1, 4, 16].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(limit), limit, |b, &limit| {
            let config = MustExistConfig::default().with_concurrency_limit(limit);

            b.to_async(&rt).iter(|| async {
                black_box(missing(&expectations, &store, &config).await.unwrap());
            });
        });
    }
    group.finish();
}

// =============================================================================
// Multiple Stores
// =============================================================================

fn bench_must_exist_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate/all_stores");

    for size in [100, 1_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let stores: Vec<Box<dyn StoreAdapter>> =
                vec![Box::new(seeded_documents(size)), Box::new(seeded_cache(size))];
            let expectations = expectations_for(size);

            b.to_async(&rt).iter(|| async {
                // Always fails: half the expectations are absent.
                black_box(must_exist_all(&expectations, &stores).await.is_err());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_missing_document_store,
    bench_concurrency_cap,
    bench_must_exist_all
);
criterion_main!(benches);
