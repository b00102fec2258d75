// ============================================================================
// Order Book Benchmarks
// ============================================================================
//
// Benchmark Categories:
// 1. Quiet-path submission - add and cancel without crossing
// 2. Matching - crossing orders through one and several levels
// 3. Admission gates - fill-or-kill depth walks that reject
// 4. Snapshots - full-book level aggregation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use orderbook_engine::prelude::*;

fn gtc(id: u64, side: Side, price: i32, quantity: u32) -> Order {
    Order::new(
        OrderType::GoodTillCancel,
        OrderId::new(id),
        side,
        Price::new(price),
        Quantity::new(quantity),
    )
}

// ============================================================================
// Quiet-Path Submission
// ============================================================================

fn benchmark_add_cancel_round_trip(c: &mut Criterion) {
    c.bench_function("add_cancel_round_trip", |b| {
        let book = OrderBook::new();
        // A standing ladder so the add lands in a populated book.
        for i in 0..100u64 {
            book.add_order(gtc(i + 1, Side::Sell, 50_100 + i as i32, 1))
                .unwrap();
        }

        let mut next_id = 1_000u64;
        b.iter(|| {
            next_id += 1;
            book.add_order(gtc(next_id, Side::Buy, 50_000, 1)).unwrap();
            book.cancel_order(OrderId::new(next_id));
        });
    });
}

// ============================================================================
// Matching
// ============================================================================

fn benchmark_matched_pair(c: &mut Criterion) {
    c.bench_function("matched_pair", |b| {
        let book = OrderBook::new();
        let mut next_id = 0u64;

        b.iter(|| {
            next_id += 2;
            book.add_order(gtc(next_id - 1, Side::Sell, 50_000, 1))
                .unwrap();
            let trades = book.add_order(gtc(next_id, Side::Buy, 50_000, 1)).unwrap();
            black_box(trades);
        });
    });
}

fn benchmark_sweep_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep_levels");

    for levels in [1u32, 5, 20] {
        group.bench_with_input(BenchmarkId::from_parameter(levels), &levels, |b, &levels| {
            let book = OrderBook::new();
            let mut next_id = 0u64;

            b.iter(|| {
                for i in 0..levels {
                    next_id += 1;
                    book.add_order(gtc(next_id, Side::Sell, 50_000 + i as i32, 1))
                        .unwrap();
                }
                next_id += 1;
                let trades = book
                    .add_order(gtc(
                        next_id,
                        Side::Buy,
                        50_000 + levels as i32,
                        levels,
                    ))
                    .unwrap();
                black_box(trades);
            });
        });
    }

    group.finish();
}

// ============================================================================
// Admission Gates
// ============================================================================

fn benchmark_fill_or_kill_rejection(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_or_kill_rejection");

    for levels in [10u64, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(levels), &levels, |b, &levels| {
            let book = OrderBook::new();
            for i in 0..levels {
                book.add_order(gtc(i + 1, Side::Sell, 50_000 + i as i32, 1))
                    .unwrap();
            }

            // One unit more than the whole ladder: the depth walk visits
            // every level and rejects without mutating the book.
            let quantity = levels as u32 + 1;
            let mut next_id = levels;
            b.iter(|| {
                next_id += 1;
                let trades = book
                    .add_order(Order::new(
                        OrderType::FillOrKill,
                        OrderId::new(next_id),
                        Side::Buy,
                        Price::new(50_000 + levels as i32),
                        Quantity::new(quantity),
                    ))
                    .unwrap();
                black_box(trades);
            });
        });
    }

    group.finish();
}

// ============================================================================
// Snapshots
// ============================================================================

fn benchmark_snapshot(c: &mut Criterion) {
    c.bench_function("snapshot_100_levels_per_side", |b| {
        let book = OrderBook::new();
        for i in 0..100u64 {
            book.add_order(gtc(i + 1, Side::Buy, 49_900 - i as i32 * 10, 1))
                .unwrap();
            book.add_order(gtc(i + 101, Side::Sell, 50_100 + i as i32 * 10, 1))
                .unwrap();
        }

        b.iter(|| {
            black_box(book.snapshot());
        });
    });
}

criterion_group!(
    benches,
    benchmark_add_cancel_round_trip,
    benchmark_matched_pair,
    benchmark_sweep_levels,
    benchmark_fill_or_kill_rejection,
    benchmark_snapshot,
);
criterion_main!(benches);
