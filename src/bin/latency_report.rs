//! Percentile latency report for the matching engine.
//!
//! Measures add/cancel round trips against a warmed book and prints an
//! HdrHistogram percentile summary. Run in release mode.

use hdrhistogram::Histogram;
use pricetime::{OrderBook, Side, Trade};
use std::time::Instant;

const WARM_OPS: u64 = 10_000;
const ITERATIONS: u64 = 1_000_000;
const CAPACITY: u32 = 100_000;

fn main() {
    println!("Preparing latency benchmark...");

    let mut book = OrderBook::new(CAPACITY, |_t: Trade| {});
    book.warm_up();

    let mut histogram = Histogram::<u64>::new_with_bounds(1, 100_000_000, 3)
        .expect("histogram bounds");

    // Seed a two-sided book: bids below 10000, asks above
    let mut next_id = 1u64;
    for i in 0..1_000u32 {
        book.add_limit_order(Side::Buy, 9_900 - (i % 100), 10, next_id, 1);
        next_id += 1;
        book.add_limit_order(Side::Sell, 10_100 + (i % 100), 10, next_id, 2);
        next_id += 1;
    }

    // Train the branch predictor before measuring
    println!("Warming up ({WARM_OPS} ops)...");
    for i in 0..WARM_OPS {
        let price = 10_100 + (i % 100) as u32;
        book.add_limit_order(Side::Buy, price, 10, next_id, 3);
        next_id += 1;
        book.add_limit_order(Side::Sell, price, 10, next_id, 4);
        next_id += 1;
    }

    println!("Running {ITERATIONS} iterations...");

    let mut total = std::time::Duration::ZERO;
    for i in 0..ITERATIONS {
        // Alternate: rest a bid, cross it out, keeping the book in
        // steady state so the arena and index never grow.
        let rest_id = next_id;
        let take_id = next_id + 1;
        next_id += 2;
        let price = 9_950 + (i % 50) as u32;

        let start = Instant::now();
        book.add_limit_order(Side::Buy, price, 10, rest_id, 5);
        book.add_limit_order(Side::Sell, price, 10, take_id, 6);
        let elapsed = start.elapsed();

        // Two operations per round trip
        let per_op = (elapsed.as_nanos() / 2) as u64;
        histogram.record(per_op).unwrap_or(());
        total += elapsed;
    }

    println!("\n=== Latency Report (ns per op) ===");
    println!("Total ops:  {}", ITERATIONS * 2);
    println!(
        "Throughput: {:.2} ops/sec",
        (ITERATIONS * 2) as f64 / total.as_secs_f64()
    );
    println!("----------------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("P99.99: {:6} ns", histogram.value_at_quantile(0.9999));
    println!("Max:    {:6} ns", histogram.max());
    println!("----------------------------------");
    println!(
        "Book at exit: {} resting orders, spread {:?}",
        book.order_count(),
        book.spread()
    );
}
