//! Shared-memory transport between the engine and the broadcaster.
//!
//! Three fixed-layout regions carry the market data feed:
//!
//! | name | layout | protocol |
//! |---|---|---|
//! | `/hft_orderbook` | [`BookSlot`] | seqlock latest-value |
//! | `/hft_metrics` | [`MetricsSlot`] | seqlock latest-value |
//! | `/hft_trades` | [`TradeRing`] | SPSC bounded FIFO |
//!
//! The engine creates, zero-initializes, and unlinks all three; the
//! broadcaster only attaches. No locks exist on the fast path — all
//! coordination is sequence numbers and head/tail cursors.

pub mod error;
pub mod region;
pub mod ring;
pub mod slot;

pub use error::TransportError;
pub use region::{SharedLayout, SharedRegion, DEFAULT_SHM_DIR};
pub use ring::{TradeRing, TRADE_RING_CAPACITY};
pub use slot::SharedSlot;

use crate::orderbook::types::{OrderBookSnapshot, SystemMetrics, Trade};

/// Well-known name of the snapshot region.
pub const SNAPSHOT_REGION: &str = "/hft_orderbook";
/// Well-known name of the metrics region.
pub const METRICS_REGION: &str = "/hft_metrics";
/// Well-known name of the trade ring region.
pub const TRADES_REGION: &str = "/hft_trades";

/// The snapshot slot layout.
pub type BookSlot = SharedSlot<OrderBookSnapshot>;
/// The metrics slot layout.
pub type MetricsSlot = SharedSlot<SystemMetrics>;

// SAFETY: all three layouts are `#[repr(C)]`, hold only integers,
// atomics and fixed arrays thereof, and their all-zeroes state is the
// correct sentinel (sequence 0, not ready, empty ring).
unsafe impl SharedLayout for BookSlot {}
// SAFETY: as above.
unsafe impl SharedLayout for MetricsSlot {}
// SAFETY: as above.
unsafe impl SharedLayout for TradeRing {}

// Compile-time guards: payloads that cross the process boundary must
// stay plain data.
const _: () = {
    assert!(std::mem::size_of::<Trade>() <= 64);
    assert!(std::mem::align_of::<OrderBookSnapshot>() <= 8);
    assert!(std::mem::align_of::<SystemMetrics>() <= 8);
};
