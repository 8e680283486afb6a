//! Benchmarks for the diary index
//!
//! Run with: cargo bench

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use photodiary::{DiaryEntry, IndexManager, MemoryStore, WritableStore};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

/// Entries spread over time in a scrambled order
fn create_test_entries(count: usize) -> Vec<DiaryEntry> {
    (0..count)
        .map(|i| {
            let minutes = (i as i64 * 7919) % (count as i64 * 60);
            DiaryEntry::with_id(format!("e{}", i), base() + Duration::minutes(minutes), "Entry")
                .content("walked along the beach, took photos of the pier")
                .tag("bench")
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for size in [1_000, 10_000] {
        let store = MemoryStore::from_entries(create_test_entries(size));
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("build_index_{}", size), |b| {
            b.iter(|| {
                let mut manager = IndexManager::new();
                manager.build_index(black_box(&store));
                manager
            })
        });
    }

    group.finish();
}

fn bench_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental");

    for size in [1_000, 10_000] {
        let entries = create_test_entries(size);
        let mut store = MemoryStore::new();
        for entry in &entries {
            store.put(entry.clone()).unwrap();
        }
        let mut manager = IndexManager::new();
        manager.build_index(&store);

        let extra = DiaryEntry::with_id("extra", base() + Duration::days(3), "Extra");
        store.put(extra.clone()).unwrap();

        group.bench_function(format!("insert_remove_{}", size), |b| {
            b.iter(|| {
                manager.insert_entry(&store, black_box(&extra));
                manager.remove_entry(black_box("extra"));
            })
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");

    let store = MemoryStore::from_entries(create_test_entries(10_000));
    let mut manager = IndexManager::new();
    manager.build_index(&store);

    let start = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let end = NaiveDate::from_ymd_opt(2020, 1, 4).unwrap();

    group.bench_function("range_10000", |b| {
        b.iter(|| manager.find_range_by_date_range(black_box(start), black_box(end)))
    });

    group.bench_function("search_10000", |b| {
        b.iter(|| manager.search(black_box("pier")).len())
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_incremental, bench_queries);
criterion_main!(benches);
