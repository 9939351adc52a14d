//! Shared-memory transport tests: regions, seqlock slots, and the
//! trade ring.

use hft_orderbook::prelude::*;
use tempfile::TempDir;

fn trade(seed: u64) -> Trade {
    Trade {
        buy_order_id: seed,
        sell_order_id: seed + 1,
        price: 10_000 + seed as i64,
        timestamp: seed as i64 * 1_000,
        quantity: (seed % 90) as u32 + 1,
        symbol: Symbol::new("BTCUSD"),
    }
}

#[test]
fn created_region_starts_in_sentinel_state() {
    let dir = TempDir::new().unwrap();
    let region = SharedRegion::<BookSlot>::create_in(dir.path(), SNAPSHOT_REGION).unwrap();

    let slot = region.get();
    assert_eq!(slot.sequence(), 0);
    assert!(!slot.is_ready());
    assert!(slot.read_newer(0).is_none());
}

#[test]
fn slot_publish_round_trips_payload() {
    let dir = TempDir::new().unwrap();
    let region = SharedRegion::<BookSlot>::create_in(dir.path(), SNAPSHOT_REGION).unwrap();
    let slot = region.get();

    let mut snapshot = OrderBookSnapshot::empty(Symbol::new("BTCUSD"), 99);
    snapshot.bids[0] = BookLevel {
        price: 10_000,
        quantity: 5,
        order_count: 1,
    };
    snapshot.bid_count = 1;

    slot.publish(&snapshot);
    assert_eq!(slot.sequence(), 1);
    assert!(slot.is_ready());

    let (sequence, read_back) = slot.read();
    assert_eq!(sequence, 1);
    assert_eq!(read_back, snapshot);
}

#[test]
fn slot_sequence_is_gap_free_per_publish() {
    let dir = TempDir::new().unwrap();
    let region = SharedRegion::<MetricsSlot>::create_in(dir.path(), METRICS_REGION).unwrap();
    let slot = region.get();

    for i in 1..=10u64 {
        let metrics = SystemMetrics {
            orders_processed: i,
            ..SystemMetrics::default()
        };
        slot.publish(&metrics);
        assert_eq!(slot.sequence(), i);
    }
}

#[test]
fn read_newer_reports_only_advances() {
    let dir = TempDir::new().unwrap();
    let region = SharedRegion::<MetricsSlot>::create_in(dir.path(), METRICS_REGION).unwrap();
    let slot = region.get();

    slot.publish(&SystemMetrics::default());
    let (sequence, _) = slot.read_newer(0).unwrap();
    assert_eq!(sequence, 1);

    // Nothing new at the same sequence.
    assert!(slot.read_newer(sequence).is_none());

    slot.publish(&SystemMetrics::default());
    assert!(slot.read_newer(sequence).is_some());
}

#[test]
fn reader_attaches_to_the_writers_region() {
    let dir = TempDir::new().unwrap();
    let writer = SharedRegion::<BookSlot>::create_in(dir.path(), SNAPSHOT_REGION).unwrap();
    let reader = SharedRegion::<BookSlot>::open_in(dir.path(), SNAPSHOT_REGION).unwrap();

    let snapshot = OrderBookSnapshot::empty(Symbol::new("ETHUSD"), 7);
    writer.get().publish(&snapshot);

    // The reader holds its own mapping of the same backing memory.
    let (sequence, read_back) = reader.get().read();
    assert_eq!(sequence, 1);
    assert_eq!(read_back.symbol, Symbol::new("ETHUSD"));
    assert_eq!(read_back.timestamp, 7);
}

#[test]
fn opening_a_missing_region_fails() {
    let dir = TempDir::new().unwrap();
    let result = SharedRegion::<BookSlot>::open_in(dir.path(), SNAPSHOT_REGION);
    assert!(matches!(result, Err(TransportError::Io { .. })));
}

#[test]
fn opening_a_wrong_sized_region_fails() {
    let dir = TempDir::new().unwrap();
    // A trade-ring region is much larger than a metrics slot.
    let _writer = SharedRegion::<TradeRing>::create_in(dir.path(), "/mismatch").unwrap();
    let result = SharedRegion::<MetricsSlot>::open_in(dir.path(), "/mismatch");
    assert!(matches!(result, Err(TransportError::SizeMismatch { .. })));
}

#[test]
fn owner_unlinks_on_drop_and_reader_notices() {
    let dir = TempDir::new().unwrap();
    let writer = SharedRegion::<MetricsSlot>::create_in(dir.path(), METRICS_REGION).unwrap();
    let reader = SharedRegion::<MetricsSlot>::open_in(dir.path(), METRICS_REGION).unwrap();

    assert!(reader.still_linked());
    drop(writer);
    assert!(!reader.still_linked());

    // The mapping itself stays readable after the unlink.
    assert_eq!(reader.get().sequence(), 0);
}

#[test]
fn reader_drop_does_not_unlink() {
    let dir = TempDir::new().unwrap();
    let writer = SharedRegion::<MetricsSlot>::create_in(dir.path(), METRICS_REGION).unwrap();
    {
        let reader = SharedRegion::<MetricsSlot>::open_in(dir.path(), METRICS_REGION).unwrap();
        drop(reader);
    }
    assert!(writer.still_linked());
}

#[test]
fn ring_push_pop_is_fifo_and_bit_exact() {
    let dir = TempDir::new().unwrap();
    let region = SharedRegion::<TradeRing>::create_in(dir.path(), TRADES_REGION).unwrap();
    let ring = region.get();

    assert!(ring.is_empty());
    for i in 0..10 {
        assert!(ring.push(&trade(i)));
    }
    assert_eq!(ring.len(), 10);

    for i in 0..10 {
        assert_eq!(ring.pop(), Some(trade(i)));
    }
    assert_eq!(ring.pop(), None);
    assert!(ring.is_empty());
}

// Scenario: the ring accepts exactly its capacity, rejects the next
// push, and accepts one more after a single pop.
#[test]
fn ring_full_drops_and_recovers() {
    let dir = TempDir::new().unwrap();
    let region = SharedRegion::<TradeRing>::create_in(dir.path(), TRADES_REGION).unwrap();
    let ring = region.get();

    for i in 0..TRADE_RING_CAPACITY as u64 {
        assert!(ring.push(&trade(i)), "push {i} should succeed");
    }
    assert_eq!(ring.len(), TRADE_RING_CAPACITY);

    // The ring is full: the next push is dropped and state is unchanged.
    assert!(!ring.push(&trade(9_999)));
    assert_eq!(ring.len(), TRADE_RING_CAPACITY);

    assert_eq!(ring.pop(), Some(trade(0)));
    assert!(ring.push(&trade(9_999)));
    assert_eq!(ring.len(), TRADE_RING_CAPACITY);
}

#[test]
fn ring_wraps_around_many_times() {
    let dir = TempDir::new().unwrap();
    let region = SharedRegion::<TradeRing>::create_in(dir.path(), TRADES_REGION).unwrap();
    let ring = region.get();

    // Push/pop pairs walk the cursors through three full laps.
    for i in 0..(TRADE_RING_CAPACITY as u64 * 3) {
        assert!(ring.push(&trade(i)));
        assert_eq!(ring.pop(), Some(trade(i)));
    }
    assert!(ring.is_empty());
}

#[test]
fn spsc_ring_transfers_across_threads() {
    use std::sync::Arc;

    let dir = TempDir::new().unwrap();
    let region =
        Arc::new(SharedRegion::<TradeRing>::create_in(dir.path(), TRADES_REGION).unwrap());
    let total = 50_000u64;

    let producer = {
        let region = Arc::clone(&region);
        std::thread::spawn(move || {
            let ring = region.get();
            for i in 0..total {
                // Spin when full; the consumer drains concurrently.
                while !ring.push(&trade(i)) {
                    std::hint::spin_loop();
                }
            }
        })
    };

    let consumer = {
        let region = Arc::clone(&region);
        std::thread::spawn(move || {
            let ring = region.get();
            let mut expected = 0u64;
            while expected < total {
                if let Some(t) = ring.pop() {
                    assert_eq!(t, trade(expected));
                    expected += 1;
                } else {
                    std::hint::spin_loop();
                }
            }
        })
    };

    producer.join().unwrap();
    consumer.join().unwrap();
    assert!(region.get().is_empty());
}

#[test]
fn seqlock_readers_never_observe_torn_snapshots() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let dir = TempDir::new().unwrap();
    let region =
        Arc::new(SharedRegion::<MetricsSlot>::create_in(dir.path(), METRICS_REGION).unwrap());
    let stop = Arc::new(AtomicBool::new(false));

    // Writer publishes records whose fields are all equal, so any torn
    // copy is detectable.
    let writer = {
        let region = Arc::clone(&region);
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut value = 0u64;
            while !stop.load(Ordering::Relaxed) {
                value += 1;
                let metrics = SystemMetrics {
                    orders_processed: value,
                    trades_executed: value,
                    trades_dropped: value,
                    avg_latency_ns: value,
                    min_latency_ns: value,
                    max_latency_ns: value,
                    ..SystemMetrics::default()
                };
                region.get().publish(&metrics);
            }
        })
    };

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let region = Arc::clone(&region);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let (_, m) = region.get().read();
                    assert_eq!(m.orders_processed, m.trades_executed);
                    assert_eq!(m.orders_processed, m.avg_latency_ns);
                    assert_eq!(m.min_latency_ns, m.max_latency_ns);
                }
            })
        })
        .collect();

    std::thread::sleep(std::time::Duration::from_millis(200));
    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}
