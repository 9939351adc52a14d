//! Core OrderBook implementation: price levels, order locations, and
//! top-of-book access.
//!
//! The book is single-writer by contract. All mutating operations
//! (`add_order`, `cancel_order`, `modify_order`) must execute under one
//! logical writer; concurrent readers obtain state exclusively through
//! owned [`OrderBookSnapshot`](crate::orderbook::types::OrderBookSnapshot)
//! copies and never traverse the internal maps. Callers that mutate and
//! snapshot from different threads wrap the book in a lock, as the
//! engine does.

use super::level::PriceLevel;
use super::trade::TradeListener;
use super::types::{Order, OrderId, Price, Side, Symbol};
use std::collections::{BTreeMap, HashMap};

/// A price-time priority limit order book for a single symbol.
///
/// Bids and asks are sorted maps keyed by price; orders within a level
/// queue in arrival order. An auxiliary map locates every resting order
/// by id so cancels touch only the one level they target.
pub struct OrderBook {
    /// The instrument this book trades.
    pub(super) symbol: Symbol,

    /// Bid side levels. Best bid is the highest key, so matching and
    /// snapshots iterate in reverse.
    pub(super) bids: BTreeMap<Price, PriceLevel>,

    /// Ask side levels. Best ask is the lowest key.
    pub(super) asks: BTreeMap<Price, PriceLevel>,

    /// Resting order id to (side, price). Finding an order costs one map
    /// lookup plus a scan limited to its own level.
    pub(super) order_locations: HashMap<OrderId, (Side, Price)>,

    /// Sink invoked synchronously for each trade the match loop emits.
    pub(super) trade_listener: Option<TradeListener>,
}

impl OrderBook {
    /// Create an empty book for the given symbol.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_locations: HashMap::new(),
            trade_listener: None,
        }
    }

    /// Create an empty book with a trade listener installed.
    ///
    /// The listener runs on the mutating thread, once per trade in match
    /// order. It must not re-enter the book.
    #[must_use]
    pub fn with_trade_listener(symbol: Symbol, trade_listener: TradeListener) -> Self {
        let mut book = Self::new(symbol);
        book.trade_listener = Some(trade_listener);
        book
    }

    /// Install or replace the trade listener.
    pub fn set_trade_listener(&mut self, trade_listener: TradeListener) {
        self.trade_listener = Some(trade_listener);
    }

    /// Remove the trade listener.
    pub fn remove_trade_listener(&mut self) {
        self.trade_listener = None;
    }

    /// The symbol of this order book.
    #[must_use]
    #[inline]
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Best (highest) bid price, if any.
    #[must_use]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    /// Best (lowest) ask price, if any.
    #[must_use]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    /// Mid price `(best_bid + best_ask) / 2` as a real number.
    ///
    /// Returns `0.0` when either side is empty.
    #[must_use]
    pub fn mid_price(&self) -> f64 {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => (bid as f64 + ask as f64) / 2.0,
            _ => 0.0,
        }
    }

    /// Spread `best_ask - best_bid` in minimum increments.
    ///
    /// Returns `0` when either side is empty.
    #[must_use]
    pub fn spread(&self) -> Price {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask - bid,
            _ => 0,
        }
    }

    /// Number of resting orders across both sides.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.order_locations.len()
    }

    /// True when the id is resting in the book.
    #[must_use]
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.order_locations.contains_key(&order_id)
    }

    /// Look up a resting order by id.
    #[must_use]
    pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
        let (side, price) = self.order_locations.get(&order_id)?;
        self.side_levels(*side)
            .get(price)?
            .iter()
            .find(|o| o.id == order_id)
    }

    /// The price level at (side, price), if present.
    #[must_use]
    pub fn level(&self, side: Side, price: Price) -> Option<&PriceLevel> {
        self.side_levels(side).get(&price)
    }

    /// Number of distinct price levels on the given side.
    #[must_use]
    pub fn level_count(&self, side: Side) -> usize {
        self.side_levels(side).len()
    }

    #[inline]
    pub(super) fn side_levels(&self, side: Side) -> &BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline]
    pub(super) fn side_levels_mut(&mut self, side: Side) -> &mut BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("symbol", &self.symbol)
            .field("bid_levels", &self.bids.len())
            .field("ask_levels", &self.asks.len())
            .field("orders", &self.order_locations.len())
            .finish()
    }
}
