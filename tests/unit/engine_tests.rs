//! Engine process tests: region lifecycle, publication, and the trade
//! sink path from the match loop into the shared ring.

use hft_orderbook::prelude::*;
use std::time::Duration;
use tempfile::TempDir;

fn fast_config(dir: &TempDir) -> EngineConfig {
    EngineConfig {
        symbol: "TESTUSD".to_string(),
        // A two-tick band so the synthetic flow crosses almost at once.
        min_price: 10_000,
        max_price: 10_001,
        min_quantity: 1,
        max_quantity: 10,
        snapshot_interval: Duration::from_millis(1),
        metrics_interval: Duration::from_millis(5),
        min_order_delay: Duration::from_micros(200),
        max_order_delay: Duration::from_micros(500),
        shm_dir: dir.path().to_path_buf(),
    }
}

#[test]
fn engine_creates_all_three_regions() {
    let dir = TempDir::new().unwrap();
    let _engine = TradingEngine::new(fast_config(&dir)).unwrap();

    assert!(dir.path().join("hft_orderbook").exists());
    assert!(dir.path().join("hft_metrics").exists());
    assert!(dir.path().join("hft_trades").exists());
}

#[test]
fn engine_unlinks_regions_on_drop() {
    let dir = TempDir::new().unwrap();
    let engine = TradingEngine::new(fast_config(&dir)).unwrap();
    drop(engine);

    assert!(!dir.path().join("hft_orderbook").exists());
    assert!(!dir.path().join("hft_metrics").exists());
    assert!(!dir.path().join("hft_trades").exists());
}

#[test]
fn engine_publishes_snapshots_and_metrics() {
    let dir = TempDir::new().unwrap();
    let engine = TradingEngine::new(fast_config(&dir)).unwrap();

    // Attach as an external reader would, before starting the engine.
    let snapshot_reader =
        SharedRegion::<BookSlot>::open_in(dir.path(), SNAPSHOT_REGION).unwrap();
    let metrics_reader =
        SharedRegion::<MetricsSlot>::open_in(dir.path(), METRICS_REGION).unwrap();

    let handles = engine.start();
    std::thread::sleep(Duration::from_millis(400));
    engine.stop();
    handles.join();

    // Publishers ran: both slots advanced past the sentinel.
    assert!(snapshot_reader.get().sequence() > 0);
    assert!(metrics_reader.get().is_ready());

    let (_, snapshot) = snapshot_reader.get().read();
    assert_eq!(snapshot.symbol, Symbol::new("TESTUSD"));

    let (_, published) = metrics_reader.get().read();
    let current = engine.metrics().current_metrics();
    assert!(current.orders_processed >= 1);
    assert!(published.orders_processed <= current.orders_processed);

    // The submitter recorded a latency sample per accepted order.
    assert!(current.avg_latency_ns > 0);
    assert!(current.min_latency_ns <= current.max_latency_ns);
}

#[test]
fn trade_sink_feeds_the_shared_ring() {
    let dir = TempDir::new().unwrap();
    let region =
        std::sync::Arc::new(SharedRegion::<TradeRing>::create_in(dir.path(), TRADES_REGION).unwrap());
    let metrics = std::sync::Arc::new(MetricsCollector::default());

    // The engine's sink shape: push to the ring, count drops.
    let sink = {
        let region = std::sync::Arc::clone(&region);
        let metrics = std::sync::Arc::clone(&metrics);
        listener(move |trade: &Trade| {
            if !region.get().push(trade) {
                metrics.increment_trades_dropped();
            }
            metrics.increment_trades_executed();
        })
    };

    let symbol = Symbol::new("TESTUSD");
    let mut book = OrderBook::with_trade_listener(symbol, sink);
    book.add_order(Order::limit(1, 10_000, 5, Side::Sell, symbol))
        .unwrap();
    book.add_order(Order::limit(2, 10_001, 8, Side::Buy, symbol))
        .unwrap();

    // One cross: 5 @ the resting ask.
    let trade = region.get().pop().expect("trade reached the ring");
    assert_eq!(
        (trade.buy_order_id, trade.sell_order_id, trade.price, trade.quantity),
        (2, 1, 10_000, 5)
    );
    assert!(region.get().is_empty());
    assert_eq!(metrics.current_metrics().trades_executed, 1);
    assert_eq!(metrics.current_metrics().trades_dropped, 0);
}

#[test]
fn stopped_engine_reports_not_running() {
    let dir = TempDir::new().unwrap();
    let engine = TradingEngine::new(fast_config(&dir)).unwrap();
    assert!(!engine.is_running());

    let handles = engine.start();
    assert!(engine.is_running());

    engine.stop();
    handles.join();
    assert!(!engine.is_running());
}
