//! Extended benchmark suite - more comprehensive latency measurements.
//!
//! Includes:
//! - Matching across multiple price levels
//! - Market order sweeps
//! - Book depth impact on placement
//! - Batch throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use matchbook::{MatchingEngine, Side};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Benchmark: Limit order matching across multiple price levels
fn bench_multi_level_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_level_match");

    for levels in [1, 5, 10, 20].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(levels), levels, |b, &levels| {
            let mut engine = MatchingEngine::new(1_000_000);
            engine.warm_up();

            // One order per ask level so every sweep crosses all of them
            for i in 0..levels {
                engine
                    .submit_limit(i as u64, Side::Sell, 10000 + i as i64 * 10, 10)
                    .unwrap();
            }

            let mut order_id = 1000u64;

            b.iter(|| {
                order_id += 1;
                // Consume every level in one limit sweep
                let trades = engine.submit_limit(
                    order_id,
                    Side::Buy,
                    10000 + (levels as i64 - 1) * 10,
                    levels as u32 * 10,
                );

                // Replenish
                for i in 0..levels {
                    engine
                        .submit_limit(
                            order_id + 1000 + i as u64 * 1_000_000,
                            Side::Sell,
                            10000 + i as i64 * 10,
                            10,
                        )
                        .unwrap();
                }

                black_box(trades)
            })
        });
    }

    group.finish();
}

/// Benchmark: Market order sweep depth
fn bench_market_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("market_sweep");

    for levels in [1, 5, 20].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(levels), levels, |b, &levels| {
            let mut engine = MatchingEngine::new(1_000_000);
            engine.warm_up();

            for i in 0..levels {
                engine
                    .submit_limit(i as u64, Side::Sell, 10000 + i as i64 * 10, 10)
                    .unwrap();
            }

            let mut order_id = 1000u64;

            b.iter(|| {
                order_id += 1;
                // Consume the whole ask side
                let trades = engine.submit_market(order_id, Side::Buy, levels as u32 * 10);

                // Replenish
                for i in 0..levels {
                    engine
                        .submit_limit(
                            order_id + 1000 + i as u64 * 1_000_000,
                            Side::Sell,
                            10000 + i as i64 * 10,
                            10,
                        )
                        .unwrap();
                }

                black_box(trades)
            })
        });
    }

    group.finish();
}

/// Benchmark: Impact of book depth on non-crossing placement
fn bench_book_depth_impact(c: &mut Criterion) {
    let mut group = c.benchmark_group("book_depth_place");

    for depth in [100, 1_000, 10_000, 50_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            let mut engine = MatchingEngine::new(10_000_000);
            engine.warm_up();

            // Non-overlapping sides so the pre-population rests in full
            for i in 0..depth {
                let (side, price) = if i % 2 == 0 {
                    (Side::Buy, 9000 + (i % 100) as i64 * 10)
                } else {
                    (Side::Sell, 11000 + (i % 100) as i64 * 10)
                };
                engine.submit_limit(i as u64, side, price, 100).unwrap();
            }

            let mut order_id = depth as u64;

            b.iter(|| {
                order_id += 1;
                // Deep bid, never matches
                black_box(engine.submit_limit(order_id, Side::Buy, 8000, 100))
            })
        });
    }

    group.finish();
}

/// Benchmark: High-frequency realistic workload with a tight spread
fn bench_realistic_hft(c: &mut Criterion) {
    let mut group = c.benchmark_group("realistic_hft");

    group.bench_function("tight_spread_workload", |b| {
        let mut engine = MatchingEngine::new(10_000_000);
        engine.warm_up();

        let mut rng = ChaCha8Rng::seed_from_u64(0xCAFEBABE);

        // Pre-populate with a tight spread: bids 9990-9999, asks 10001-10010
        for i in 0..500u64 {
            engine
                .submit_limit(i, Side::Buy, 9990 + (i % 10) as i64, 100)
                .unwrap();
            engine
                .submit_limit(500 + i, Side::Sell, 10001 + (i % 10) as i64, 100)
                .unwrap();
        }

        let mut order_id = 1000u64;

        b.iter(|| {
            let op = rng.gen_range(0..100);

            if op < 40 {
                // 40% place bid
                order_id += 1;
                let _ = engine.submit_limit(
                    order_id,
                    Side::Buy,
                    9990 + rng.gen_range(0..10),
                    rng.gen_range(10..200),
                );
                black_box(order_id)
            } else if op < 80 {
                // 40% place ask
                order_id += 1;
                let _ = engine.submit_limit(
                    order_id,
                    Side::Sell,
                    10001 + rng.gen_range(0..10),
                    rng.gen_range(10..200),
                );
                black_box(order_id)
            } else {
                // 20% cancel
                let cancel_id = rng.gen_range(0..order_id);
                black_box(engine.cancel(cancel_id) as u64)
            }
        })
    });

    group.finish();
}

/// Benchmark: Throughput over self-clearing batches
fn bench_batch_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_throughput");

    for batch_size in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*batch_size as u64 * 2));

        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            batch_size,
            |b, &batch_size| {
                let mut engine = MatchingEngine::new(1_000_000);
                engine.warm_up();

                let mut rng = ChaCha8Rng::seed_from_u64(0x12345678);
                let mut order_id = 0u64;

                b.iter(|| {
                    // Crossing pairs: each sell fully consumes its bid, so
                    // the book returns to empty and the pool stays balanced
                    for _ in 0..batch_size {
                        let price = rng.gen_range(9900..10100) * 100;
                        let qty = rng.gen_range(1..500);
                        order_id += 2;
                        let _ = engine.submit_limit(order_id - 1, Side::Buy, price, qty);
                        let _ = engine.submit_limit(order_id, Side::Sell, price, qty);
                    }
                    black_box(engine.total_trades())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    extended_benches,
    bench_multi_level_match,
    bench_market_sweep,
    bench_book_depth_impact,
    bench_realistic_hft,
    bench_batch_throughput,
);

criterion_main!(extended_benches);
