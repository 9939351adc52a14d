//! Core value types shared by the matching engine and the market-data feed.
//!
//! Everything that crosses the shared-memory boundary is a fixed-layout
//! `#[repr(C)]` record: no pointers, little-endian integers, naturally
//! aligned fields, and fixed-width symbol buffers. Prices are fixed-point
//! integers in the symbol's minimum increment (cents in the reference
//! configuration), quantities are whole units, and timestamps are
//! nanoseconds used for relative ordering only.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Price in minimum increments (cents). Signed so spreads and deltas
/// are representable without casts.
pub type Price = i64;

/// Order quantity in whole units.
pub type Quantity = u32;

/// Order identifier, monotonically increasing within an engine instance.
pub type OrderId = u64;

/// Nanosecond timestamp. Only relative ordering is meaningful.
pub type TimestampNs = i64;

/// Width of the fixed symbol buffer in bytes.
pub const SYMBOL_LEN: usize = 16;

/// Maximum number of price levels per side included in a snapshot.
pub const MAX_BOOK_LEVELS: usize = 20;

/// Which side of the book an order rests on.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bid side (buyers).
    Buy = 0,
    /// Ask side (sellers).
    Sell = 1,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type. The matching engine executes `Limit` orders only; the
/// other kinds exist so that submissions carrying them can be rejected
/// with a validation error instead of being silently reinterpreted.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    /// Market order (not supported by the engine).
    Market = 0,
    /// Limit order.
    Limit = 1,
    /// Stop order (not supported by the engine).
    Stop = 2,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Market => write!(f, "MARKET"),
            OrderKind::Limit => write!(f, "LIMIT"),
            OrderKind::Stop => write!(f, "STOP"),
        }
    }
}

/// Fixed 16-byte ASCII symbol tag, NUL-padded.
///
/// The buffer form keeps symbol fields inline in shared-memory records.
/// Construction truncates to [`SYMBOL_LEN`] bytes; the final byte is
/// always NUL so [`Symbol::as_str`] has a terminator even for maximal
/// input.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol([u8; SYMBOL_LEN]);

impl Symbol {
    /// Build a symbol tag from a string, truncating to 15 bytes.
    #[must_use]
    pub fn new(s: &str) -> Self {
        let mut buf = [0u8; SYMBOL_LEN];
        let bytes = s.as_bytes();
        let len = bytes.len().min(SYMBOL_LEN - 1);
        buf[..len].copy_from_slice(&bytes[..len]);
        Self(buf)
    }

    /// The symbol as a string slice, without NUL padding.
    #[must_use]
    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(SYMBOL_LEN);
        std::str::from_utf8(&self.0[..end]).unwrap_or("")
    }

    /// The raw padded buffer.
    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8; SYMBOL_LEN] {
        &self.0
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self([0u8; SYMBOL_LEN])
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(s)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol::new(&s))
    }
}

/// A resting or incoming order.
///
/// `quantity` is the remaining quantity; the matching engine decrements
/// it in place as fills occur. Identity (`id`) never changes, and a
/// modify is expressed as cancel-then-add with a fresh timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Limit price in minimum increments.
    pub price: Price,
    /// Remaining quantity.
    pub quantity: Quantity,
    /// Buy or sell.
    pub side: Side,
    /// Order type; only [`OrderKind::Limit`] is accepted by the book.
    pub kind: OrderKind,
    /// Arrival timestamp, nanoseconds.
    pub timestamp: TimestampNs,
    /// Instrument tag.
    pub symbol: Symbol,
}

impl Order {
    /// Create a limit order stamped with the current clock.
    #[must_use]
    pub fn limit(
        id: OrderId,
        price: Price,
        quantity: Quantity,
        side: Side,
        symbol: Symbol,
    ) -> Self {
        Self {
            id,
            price,
            quantity,
            side,
            kind: OrderKind::Limit,
            timestamp: crate::utils::current_time_nanos(),
            symbol,
        }
    }

    /// Create a limit order with an explicit arrival timestamp.
    #[must_use]
    pub fn limit_at(
        id: OrderId,
        price: Price,
        quantity: Quantity,
        side: Side,
        timestamp: TimestampNs,
        symbol: Symbol,
    ) -> Self {
        Self {
            id,
            price,
            quantity,
            side,
            kind: OrderKind::Limit,
            timestamp,
            symbol,
        }
    }
}

/// An executed trade. Emitted by the matching engine in match order and
/// never mutated afterwards.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Id of the buy-side order.
    pub buy_order_id: OrderId,
    /// Id of the sell-side order.
    pub sell_order_id: OrderId,
    /// Execution price: the resting order's quoted price.
    pub price: Price,
    /// Execution timestamp, nanoseconds.
    pub timestamp: TimestampNs,
    /// Executed quantity.
    pub quantity: Quantity,
    /// Instrument tag.
    pub symbol: Symbol,
}

/// One aggregated price level in a snapshot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    /// Level price in minimum increments.
    pub price: Price,
    /// Total resting quantity at this price.
    pub quantity: Quantity,
    /// Number of orders queued at this price.
    pub order_count: u32,
}

/// An owned, point-in-time copy of the top of the book.
///
/// Both sides carry exactly [`MAX_BOOK_LEVELS`] entries;
/// `bid_count` / `ask_count` give the meaningful prefix length. Bids are
/// ordered best-first (descending price), asks best-first (ascending).
/// The record is a pure value: mutating the book after capture does not
/// affect it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Instrument tag.
    pub symbol: Symbol,
    /// Capture timestamp, nanoseconds.
    pub timestamp: TimestampNs,
    /// Top bid levels, descending price. Entries past `bid_count` are zeroed.
    pub bids: [BookLevel; MAX_BOOK_LEVELS],
    /// Top ask levels, ascending price. Entries past `ask_count` are zeroed.
    pub asks: [BookLevel; MAX_BOOK_LEVELS],
    /// Number of meaningful entries in `bids`.
    pub bid_count: u32,
    /// Number of meaningful entries in `asks`.
    pub ask_count: u32,
}

impl OrderBookSnapshot {
    /// An empty snapshot for the given symbol and capture time.
    #[must_use]
    pub fn empty(symbol: Symbol, timestamp: TimestampNs) -> Self {
        Self {
            symbol,
            timestamp,
            bids: [BookLevel::default(); MAX_BOOK_LEVELS],
            asks: [BookLevel::default(); MAX_BOOK_LEVELS],
            bid_count: 0,
            ask_count: 0,
        }
    }

    /// The meaningful bid levels, best first.
    #[must_use]
    #[inline]
    pub fn bid_levels(&self) -> &[BookLevel] {
        &self.bids[..self.bid_count as usize]
    }

    /// The meaningful ask levels, best first.
    #[must_use]
    #[inline]
    pub fn ask_levels(&self) -> &[BookLevel] {
        &self.asks[..self.ask_count as usize]
    }

    /// Best bid level, if any.
    #[must_use]
    pub fn best_bid(&self) -> Option<BookLevel> {
        self.bid_levels().first().copied()
    }

    /// Best ask level, if any.
    #[must_use]
    pub fn best_ask(&self) -> Option<BookLevel> {
        self.ask_levels().first().copied()
    }

    /// Mid price as a real number, `None` when either side is empty.
    #[must_use]
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid.price as f64 + ask.price as f64) / 2.0),
            _ => None,
        }
    }

    /// Spread in minimum increments, `None` when either side is empty.
    #[must_use]
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.price - bid.price),
            _ => None,
        }
    }

    /// Total resting quantity across the included bid levels.
    #[must_use]
    pub fn total_bid_quantity(&self) -> u64 {
        self.bid_levels().iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Total resting quantity across the included ask levels.
    #[must_use]
    pub fn total_ask_quantity(&self) -> u64 {
        self.ask_levels().iter().map(|l| u64::from(l.quantity)).sum()
    }
}

/// Counter reads and latency summaries published by the metrics slot.
///
/// Fields are individually consistent but the record is not a cross-field
/// atomic snapshot; consumers must tolerate mild skew between counters
/// and latency figures.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMetrics {
    /// Capture timestamp, nanoseconds.
    pub timestamp: TimestampNs,
    /// Host CPU usage in tenths of a percent.
    pub cpu_usage: u64,
    /// Resident set size of the engine process, bytes.
    pub memory_usage_bytes: u64,
    /// Network bytes sent since the previous metrics capture.
    pub network_bytes_sent: u64,
    /// Network bytes received since the previous metrics capture.
    pub network_bytes_recv: u64,
    /// Orders accepted by the book since engine start.
    pub orders_processed: u64,
    /// Trades executed since engine start.
    pub trades_executed: u64,
    /// Trades dropped because the shared ring was full.
    pub trades_dropped: u64,
    /// Mean `add_order` latency over all samples, nanoseconds.
    pub avg_latency_ns: u64,
    /// Minimum observed `add_order` latency, nanoseconds.
    pub min_latency_ns: u64,
    /// Maximum observed `add_order` latency, nanoseconds.
    pub max_latency_ns: u64,
}
