//! Prelude module that re-exports commonly used types.
//!
//! ```rust
//! use hft_orderbook::prelude::*;
//! ```

// Core order book types
pub use crate::orderbook::{OrderBook, OrderBookError};

// Value types
pub use crate::orderbook::types::{
    BookLevel, Order, OrderBookSnapshot, OrderId, OrderKind, Price, Quantity, Side, Symbol,
    SystemMetrics, TimestampNs, Trade, MAX_BOOK_LEVELS,
};

// Trade sink
pub use crate::orderbook::trade::{listener, TradeListener};

// Metrics
pub use crate::metrics::{HostProbe, MetricsCollector, NullHostProbe, ProcHostProbe};

// Shared-memory transport
pub use crate::shm::{
    BookSlot, MetricsSlot, SharedRegion, SharedSlot, TradeRing, TransportError, METRICS_REGION,
    SNAPSHOT_REGION, TRADES_REGION, TRADE_RING_CAPACITY,
};

// Processes
pub use crate::engine::{EngineConfig, OrderFlow, TradingEngine};
pub use crate::feed::{BroadcasterConfig, MarketFeed};
