//! JSON frame construction for the WebSocket feed.
//!
//! Frames carry a `type` discriminator so clients can multiplex the
//! three topics over one socket. Prices are rendered in major units
//! (cents divided by 100); everything else stays in its native unit.

use crate::orderbook::types::{BookLevel, OrderBookSnapshot, SystemMetrics, Trade};
use serde_json::{json, Value};

fn level_entry(level: &BookLevel) -> Value {
    json!([
        level.price as f64 / 100.0,
        level.quantity,
        level.order_count
    ])
}

/// Order book frame: `{type, symbol, timestamp, bids, asks}` with each
/// level as `[price, quantity, order_count]`.
#[must_use]
pub fn orderbook_frame(snapshot: &OrderBookSnapshot) -> String {
    let bids: Vec<Value> = snapshot.bid_levels().iter().map(level_entry).collect();
    let asks: Vec<Value> = snapshot.ask_levels().iter().map(level_entry).collect();
    json!({
        "type": "orderbook",
        "symbol": snapshot.symbol.as_str(),
        "timestamp": snapshot.timestamp,
        "bids": bids,
        "asks": asks,
    })
    .to_string()
}

/// Metrics frame. CPU is converted from tenths of a percent to percent.
#[must_use]
pub fn metrics_frame(metrics: &SystemMetrics) -> String {
    json!({
        "type": "metrics",
        "timestamp": metrics.timestamp,
        "cpu_usage": metrics.cpu_usage as f64 / 10.0,
        "memory_usage": metrics.memory_usage_bytes,
        "network_sent": metrics.network_bytes_sent,
        "network_recv": metrics.network_bytes_recv,
        "orders_processed": metrics.orders_processed,
        "trades_executed": metrics.trades_executed,
        "trades_dropped": metrics.trades_dropped,
        "avg_latency_ns": metrics.avg_latency_ns,
        "min_latency_ns": metrics.min_latency_ns,
        "max_latency_ns": metrics.max_latency_ns,
    })
    .to_string()
}

/// Trade print frame.
#[must_use]
pub fn trade_frame(trade: &Trade) -> String {
    json!({
        "type": "trade",
        "symbol": trade.symbol.as_str(),
        "price": trade.price as f64 / 100.0,
        "quantity": trade.quantity,
        "timestamp": trade.timestamp,
        "buy_order_id": trade.buy_order_id,
        "sell_order_id": trade.sell_order_id,
    })
    .to_string()
}
