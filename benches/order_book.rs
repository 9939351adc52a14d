//! Order book benchmarks: resting inserts, crossing matches, snapshots.

use criterion::{black_box, BatchSize, Criterion};
use hft_orderbook::prelude::*;

fn resting_book(levels: i64, orders_per_level: u64) -> OrderBook {
    let symbol = Symbol::new("BTCUSD");
    let mut book = OrderBook::new(symbol);
    let mut id = 1u64;
    for level in 0..levels {
        for _ in 0..orders_per_level {
            book.add_order(Order::limit(id, 9_900 - level, 10, Side::Buy, symbol))
                .unwrap();
            id += 1;
            book.add_order(Order::limit(id, 10_100 + level, 10, Side::Sell, symbol))
                .unwrap();
            id += 1;
        }
    }
    book
}

fn bench_add_resting(c: &mut Criterion) {
    c.bench_function("book/add_100_resting_orders", |b| {
        b.iter_batched(
            || OrderBook::new(Symbol::new("BTCUSD")),
            |mut book| {
                for id in 1..=100u64 {
                    let (side, price) = if id % 2 == 0 {
                        (Side::Buy, 9_900 - (id % 50) as i64)
                    } else {
                        (Side::Sell, 10_100 + (id % 50) as i64)
                    };
                    book.add_order(Order::limit(id, price, 10, side, book.symbol()))
                        .unwrap();
                }
                book
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_match_crossing(c: &mut Criterion) {
    c.bench_function("book/match_through_10_levels", |b| {
        b.iter_batched(
            || resting_book(10, 2),
            |mut book| {
                // Crosses every ask level and fills 200 units.
                book.add_order(Order::limit(
                    1_000_000,
                    10_200,
                    200,
                    Side::Buy,
                    book.symbol(),
                ))
                .unwrap();
                book
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_cancel(c: &mut Criterion) {
    c.bench_function("book/cancel_100_orders", |b| {
        b.iter_batched(
            || resting_book(10, 5),
            |mut book| {
                for id in 1..=100u64 {
                    book.cancel_order(id);
                }
                book
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let book = resting_book(40, 3);
    c.bench_function("book/snapshot_top_20_levels", |b| {
        b.iter(|| black_box(book.snapshot_at(0)));
    });
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_add_resting(c);
    bench_match_crossing(c);
    bench_cancel(c);
    bench_snapshot(c);
}
