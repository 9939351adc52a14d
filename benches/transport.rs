//! Shared-memory transport benchmarks: slot publication and ring
//! throughput.

use criterion::{black_box, Criterion};
use hft_orderbook::prelude::*;
use tempfile::TempDir;

fn sample_trade() -> Trade {
    Trade {
        buy_order_id: 1,
        sell_order_id: 2,
        price: 5_500_000,
        timestamp: 1_000,
        quantity: 10,
        symbol: Symbol::new("BTCUSD"),
    }
}

fn bench_slot_publish(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let region = SharedRegion::<BookSlot>::create_in(dir.path(), SNAPSHOT_REGION).unwrap();
    let snapshot = OrderBookSnapshot::empty(Symbol::new("BTCUSD"), 1);

    c.bench_function("slot/publish_snapshot", |b| {
        b.iter(|| region.get().publish(black_box(&snapshot)));
    });
}

fn bench_slot_read(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let region = SharedRegion::<BookSlot>::create_in(dir.path(), SNAPSHOT_REGION).unwrap();
    region
        .get()
        .publish(&OrderBookSnapshot::empty(Symbol::new("BTCUSD"), 1));

    c.bench_function("slot/read_snapshot", |b| {
        b.iter(|| black_box(region.get().read()));
    });
}

fn bench_ring_push_pop(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let region = SharedRegion::<TradeRing>::create_in(dir.path(), TRADES_REGION).unwrap();
    let trade = sample_trade();

    c.bench_function("ring/push_pop_trade", |b| {
        b.iter(|| {
            let ring = region.get();
            ring.push(black_box(&trade));
            black_box(ring.pop())
        });
    });
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_slot_publish(c);
    bench_slot_read(c);
    bench_ring_push_pop(c);
}
