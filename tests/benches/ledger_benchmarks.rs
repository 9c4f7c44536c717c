//! # Offline Ledger Benchmarks
//!
//! | Component | Operation | Expected cost |
//! |-----------|-----------|---------------|
//! | ol-01 Spent Filter | add / contains | O(k) |
//! | ol-01 Spent Filter | merge | O(m / 8) |
//! | ol-01 Spent Filter | serialize round trip | O(m / 8) |
//! | ol-02 UTXO Ledger | submit | O(inputs + outputs) |
//! | ol-02 UTXO Ledger | rebuild filter | O(spent * k) |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ol_01_spent_filter::BloomFilter;
use ol_02_utxo_ledger::{
    InMemoryLedgerStore, LedgerApi, LedgerConfigBuilder, LedgerService, StaticIdentity,
};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// OL-01: Spent Filter Benchmarks
// ============================================================================

fn random_identifiers(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let origin: [u8; 32] = rng.gen();
            let hex: String = origin.iter().map(|b| format!("{:02x}", b)).collect();
            format!("{}:{}", hex, rng.gen_range(0..4u32))
        })
        .collect()
}

fn bench_filter_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("ol-01-spent-filter");
    group.measurement_time(Duration::from_secs(5));

    for capacity in [1_000usize, 10_000, 100_000] {
        let ids = random_identifiers(capacity);
        let mut filter = BloomFilter::create(capacity, 0.001).unwrap();
        filter.extend(&ids);

        group.bench_with_input(BenchmarkId::new("add", capacity), &ids, |b, ids| {
            let mut target = BloomFilter::create(capacity, 0.001).unwrap();
            let mut i = 0;
            b.iter(|| {
                target.add(ids[i % ids.len()].as_bytes());
                i += 1;
            })
        });

        group.bench_with_input(BenchmarkId::new("contains_hit", capacity), &ids, |b, ids| {
            let mut i = 0;
            b.iter(|| {
                i += 1;
                black_box(filter.contains(ids[i % ids.len()].as_bytes()))
            })
        });

        let misses = random_identifiers(1_000);
        group.bench_with_input(
            BenchmarkId::new("contains_miss", capacity),
            &misses,
            |b, misses| {
                let mut i = 0;
                b.iter(|| {
                    i += 1;
                    black_box(filter.contains(misses[i % misses.len()].as_bytes()))
                })
            },
        );

        group.throughput(Throughput::Bytes((filter.size_bits() / 8) as u64));
        group.bench_with_input(BenchmarkId::new("merge", capacity), &filter, |b, peer| {
            let mut local = BloomFilter::create(capacity, 0.001).unwrap();
            b.iter(|| local.merge(black_box(peer)).unwrap())
        });

        group.bench_with_input(
            BenchmarkId::new("serialize_round_trip", capacity),
            &filter,
            |b, filter| b.iter(|| BloomFilter::from_bytes(&filter.to_bytes()).unwrap()),
        );
    }

    group.finish();
}

// ============================================================================
// OL-02: UTXO Ledger Benchmarks
// ============================================================================

fn ledger(owner: &[u8]) -> LedgerService<InMemoryLedgerStore> {
    let config = LedgerConfigBuilder::new()
        .filter_capacity(100_000)
        .genesis_amount(u64::MAX / 2)
        .build()
        .unwrap();
    let mut ledger = LedgerService::new(
        Arc::new(InMemoryLedgerStore::new()),
        &StaticIdentity::new(owner.to_vec()),
        config,
    )
    .unwrap();
    assert!(ledger.mint_genesis(owner));
    ledger
}

fn bench_ledger_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("ol-02-utxo-ledger");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("select_build_submit", |b| {
        let mut alice = ledger(b"alice-pk");
        b.iter(|| {
            let selection = alice.select_inputs(1).unwrap();
            let tx = alice.build_transaction(b"bob-pk", 1, selection).unwrap();
            black_box(alice.submit(&tx))
        })
    });

    for spent in [100usize, 1_000] {
        let mut alice = ledger(b"alice-pk");
        for _ in 0..spent {
            let selection = alice.select_inputs(1).unwrap();
            let tx = alice.build_transaction(b"bob-pk", 1, selection).unwrap();
            assert!(alice.apply_transaction(&tx));
        }

        group.throughput(Throughput::Elements(spent as u64));
        group.bench_with_input(BenchmarkId::new("rebuild_filter", spent), &alice, |b, alice| {
            b.iter(|| black_box(alice.rebuild_filter().unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filter_operations, bench_ledger_operations);

criterion_main!(benches);
