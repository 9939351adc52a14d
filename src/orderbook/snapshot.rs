//! Snapshot capture: owned top-of-book copies for market data.

use super::book::OrderBook;
use super::level::PriceLevel;
use super::types::{BookLevel, OrderBookSnapshot, TimestampNs, MAX_BOOK_LEVELS};
use crate::utils::current_time_nanos;

fn book_level(level: &PriceLevel) -> BookLevel {
    BookLevel {
        price: level.price(),
        quantity: level.total_quantity().min(u64::from(u32::MAX)) as u32,
        order_count: level.order_count() as u32,
    }
}

impl OrderBook {
    /// Capture an owned snapshot of the top of the book, stamped with
    /// the current clock.
    ///
    /// Bids are reported best-first (descending price), asks best-first
    /// (ascending), at most [`MAX_BOOK_LEVELS`] per side. The result is
    /// a pure value copy: later mutations of the book do not affect it.
    #[must_use]
    pub fn snapshot(&self) -> OrderBookSnapshot {
        self.snapshot_at(current_time_nanos())
    }

    /// Capture a snapshot with an explicit capture timestamp.
    ///
    /// Snapshotting is a pure function of book state and the given
    /// timestamp: two calls with no intervening mutation and the same
    /// timestamp produce identical values.
    #[must_use]
    pub fn snapshot_at(&self, timestamp: TimestampNs) -> OrderBookSnapshot {
        let mut snap = OrderBookSnapshot::empty(self.symbol, timestamp);

        for (i, level) in self.bids.values().rev().take(MAX_BOOK_LEVELS).enumerate() {
            snap.bids[i] = book_level(level);
            snap.bid_count = (i + 1) as u32;
        }
        for (i, level) in self.asks.values().take(MAX_BOOK_LEVELS).enumerate() {
            snap.asks[i] = book_level(level);
            snap.ask_count = (i + 1) as u32;
        }

        snap
    }
}
