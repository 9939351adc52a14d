//! Broadcaster feed tests: region polling into broadcast channels.

use hft_orderbook::prelude::*;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

struct EngineSideRegions {
    snapshot: SharedRegion<BookSlot>,
    metrics: SharedRegion<MetricsSlot>,
    trades: SharedRegion<TradeRing>,
}

/// Create the regions the way the engine does, so a feed can attach.
fn engine_side(dir: &TempDir) -> EngineSideRegions {
    EngineSideRegions {
        snapshot: SharedRegion::create_in(dir.path(), SNAPSHOT_REGION).unwrap(),
        metrics: SharedRegion::create_in(dir.path(), METRICS_REGION).unwrap(),
        trades: SharedRegion::create_in(dir.path(), TRADES_REGION).unwrap(),
    }
}

fn fast_feed_config(dir: &TempDir) -> BroadcasterConfig {
    BroadcasterConfig {
        shm_dir: dir.path().to_path_buf(),
        snapshot_poll: Duration::from_millis(1),
        metrics_poll: Duration::from_millis(1),
        trade_poll: Duration::from_millis(1),
        ..BroadcasterConfig::default()
    }
}

#[test]
fn feed_fails_without_engine_regions() {
    let dir = TempDir::new().unwrap();
    assert!(MarketFeed::open(fast_feed_config(&dir)).is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn feed_forwards_snapshot_frames() {
    let dir = TempDir::new().unwrap();
    let regions = engine_side(&dir);

    let feed = MarketFeed::open(fast_feed_config(&dir)).unwrap();
    let mut rx = feed.channels().orderbook.subscribe();
    let handles = feed.start();

    let mut snapshot = OrderBookSnapshot::empty(Symbol::new("BTCUSD"), 42);
    snapshot.bids[0] = BookLevel {
        price: 5_500_000,
        quantity: 3,
        order_count: 1,
    };
    snapshot.bid_count = 1;
    regions.snapshot.get().publish(&snapshot);

    let frame = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("frame within deadline")
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(value["type"], "orderbook");
    assert_eq!(value["symbol"], "BTCUSD");
    assert_eq!(value["bids"][0][0], 55_000.0);

    feed.stop();
    handles.join();
}

#[tokio::test(flavor = "multi_thread")]
async fn feed_forwards_each_publish_once() {
    let dir = TempDir::new().unwrap();
    let regions = engine_side(&dir);

    let feed = MarketFeed::open(fast_feed_config(&dir)).unwrap();
    let mut rx = feed.channels().metrics.subscribe();
    let handles = feed.start();

    for i in 1..=3u64 {
        regions.metrics.get().publish(&SystemMetrics {
            orders_processed: i,
            ..SystemMetrics::default()
        });
        // Let the poll observe this sequence before the next publish.
        let frame = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("frame within deadline")
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["orders_processed"], i);
    }

    feed.stop();
    handles.join();
}

#[tokio::test(flavor = "multi_thread")]
async fn feed_drains_trades_in_order() {
    let dir = TempDir::new().unwrap();
    let regions = engine_side(&dir);

    let feed = MarketFeed::open(fast_feed_config(&dir)).unwrap();
    let mut rx = feed.channels().trades.subscribe();
    let handles = feed.start();

    for i in 0..5u64 {
        let trade = Trade {
            buy_order_id: 100 + i,
            sell_order_id: 200 + i,
            price: 10_000,
            timestamp: i as i64,
            quantity: 1,
            symbol: Symbol::new("BTCUSD"),
        };
        assert!(regions.trades.get().push(&trade));
    }

    for i in 0..5u64 {
        let frame = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("frame within deadline")
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "trade");
        assert_eq!(value["buy_order_id"], 100 + i);
    }
    assert!(regions.trades.get().is_empty());

    feed.stop();
    handles.join();
}
