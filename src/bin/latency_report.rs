//! End-to-end latency percentile report.
//!
//! Drives the engine with a deterministic submit/cancel/market mix and
//! prints an hdrhistogram percentile breakdown of per-operation latency.

use hdrhistogram::Histogram;
use matchbook::{MatchingEngine, Side};
use std::time::Instant;

const WARMUP_OPS: u64 = 100_000;
const ITERATIONS: u64 = 1_000_000;

fn main() {
    println!("Preparing latency benchmark...");

    let mut engine = MatchingEngine::new(2_000_000);
    engine.pin_to_core();
    engine.warm_up();

    let mut histogram = Histogram::<u64>::new_with_bounds(1, 100_000_000, 3).unwrap();

    // Branch predictor / cache warmup with the same operation mix
    println!("Warming up ({} ops)...", WARMUP_OPS);
    let mut next_id = 1u64;
    for i in 0..WARMUP_OPS {
        run_op(&mut engine, i, &mut next_id);
    }

    println!("Running {} iterations...", ITERATIONS);

    let mut total_duration = std::time::Duration::ZERO;
    for i in 0..ITERATIONS {
        let start = Instant::now();
        run_op(&mut engine, i, &mut next_id);
        let elapsed = start.elapsed();

        histogram.record(elapsed.as_nanos() as u64).unwrap_or(());
        total_duration += elapsed;
    }

    println!("\n=== Latency Report (ns) ===");
    println!("Total ops:  {}", ITERATIONS);
    println!(
        "Throughput: {:.2} ops/sec",
        ITERATIONS as f64 / total_duration.as_secs_f64()
    );
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("P99.99: {:6} ns", histogram.value_at_quantile(0.9999));
    println!("Max:    {:6} ns", histogram.max());
    println!("---------------------------");
    println!(
        "Resting orders: {}  Trades: {}",
        engine.order_count(),
        engine.total_trades()
    );
}

/// One operation of the deterministic mix: mostly limit submissions around
/// a 200-tick band, with periodic cancels and market orders for churn.
#[inline]
fn run_op(engine: &mut MatchingEngine, i: u64, next_id: &mut u64) {
    if i % 7 == 6 && *next_id > 20 {
        // Cancel an older order (may already be gone; both paths count)
        let victim = *next_id - 20;
        std::hint::black_box(engine.cancel(victim));
    } else if i % 31 == 30 {
        let id = *next_id;
        *next_id += 1;
        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
        std::hint::black_box(engine.submit_market(id, side, 50).ok());
    } else {
        let id = *next_id;
        *next_id += 1;
        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
        let price = 10000 + (i % 100) as i64 - 50;
        std::hint::black_box(engine.submit_limit(id, side, price, 10).ok());
    }
}
