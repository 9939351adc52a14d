//! # Simulated HFT Stack: Matching Engine + Shared-Memory Market Data
//!
//! This crate implements a small high-frequency trading simulation as
//! two cooperating processes:
//!
//! - the **engine** (`hft-engine` binary) owns an in-memory price-time
//!   priority limit order book, feeds it synthetic order flow, measures
//!   per-order latency, and publishes order-book snapshots, trade
//!   prints, and system metrics into three named shared-memory regions;
//! - the **broadcaster** (`hft-broadcaster` binary) attaches to the same
//!   regions, observes sequence numbers, drains the trade ring, and fans
//!   everything out to subscribed WebSocket clients as JSON.
//!
//! The processes never share a lock. All cross-process coordination is
//! carried by sequence numbers and an SPSC ring inside the shared
//! regions, so a crash on either side cannot corrupt the other's view.
//!
//! ## Components
//!
//! | module | responsibility |
//! |---|---|
//! | [`orderbook`] | the limit order book: price levels, matching, snapshots |
//! | [`metrics`] | lock-free counters, latency min/avg/max, 50-bucket histogram |
//! | [`shm`] | named shared regions: seqlock slots and the trade ring |
//! | [`engine`] | the engine process: threads, order flow, publication |
//! | [`feed`] | the broadcaster: region polls and WebSocket fan-out |
//!
//! ## The book
//!
//! The book is **single-writer**: every mutation runs under one logical
//! writer, and readers only ever receive owned snapshot copies. Matching
//! is price-time priority — best price first, ties broken by arrival
//! order — and executes synchronously inside `add_order`, so the book is
//! never observably crossed. Trades execute at the resting order's
//! quoted price (the aggressor pays what the resting side advertised)
//! and are delivered through a non-blocking sink callback in match
//! order.
//!
//! ```
//! use hft_orderbook::prelude::*;
//!
//! let mut book = OrderBook::new(Symbol::new("BTCUSD"));
//! book.add_order(Order::limit(1, 10_000, 5, Side::Sell, book.symbol()))?;
//! book.add_order(Order::limit(2, 10_000, 3, Side::Buy, book.symbol()))?;
//!
//! assert_eq!(book.best_ask(), Some(10_000)); // 2 remaining of order 1
//! assert_eq!(book.best_bid(), None);         // order 2 fully filled
//! # Ok::<(), hft_orderbook::orderbook::OrderBookError>(())
//! ```
//!
//! ## The transport
//!
//! Three fixed-layout regions live under `/dev/shm`:
//!
//! - `/hft_orderbook` — the latest [`OrderBookSnapshot`](orderbook::types::OrderBookSnapshot)
//!   behind a seqlock: the writer stores the payload, then bumps the
//!   sequence (release), then sets `ready`; readers copy the payload
//!   between two sequence loads and retry when they differ.
//! - `/hft_metrics` — the latest [`SystemMetrics`](orderbook::types::SystemMetrics),
//!   same protocol.
//! - `/hft_trades` — a bounded single-producer/single-consumer ring of
//!   [`Trade`](orderbook::types::Trade) records. A full ring drops the
//!   trade and the engine counts the drop.
//!
//! The engine creates, zero-initializes, and unlinks all three regions;
//! the broadcaster only opens existing ones.
//!
//! ## Running the pair
//!
//! ```text
//! $ hft-engine --symbol BTCUSD &
//! $ hft-broadcaster --port 8080 &
//! $ websocat ws://localhost:8080/ws
//! {"type":"orderbook","symbol":"BTCUSD",...}
//! {"type":"trade","symbol":"BTCUSD","price":55123.5,...}
//! ```
//!
//! Both binaries shut down cooperatively on Ctrl-C: loops observe a
//! shared flag at their natural pauses, threads are joined in reverse
//! startup order, and the engine unlinks its regions last.
//!
//! ## Out of scope
//!
//! Persistence, crash recovery, risk checks, self-match prevention,
//! market/stop/iceberg order types, multi-symbol books in one instance,
//! and exchange-authoritative behaviors (fees, auctions) are
//! intentionally not implemented.

pub mod engine;
pub mod feed;
pub mod metrics;
pub mod orderbook;
pub mod prelude;
pub mod shm;
pub mod utils;

pub use engine::{EngineConfig, TradingEngine};
pub use feed::{BroadcasterConfig, MarketFeed};
pub use metrics::MetricsCollector;
pub use orderbook::{OrderBook, OrderBookError};
pub use shm::TransportError;
