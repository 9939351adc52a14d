//! The price-time priority matching loop.
//!
//! Matching runs synchronously inside `add_order`, after the incoming
//! order has been queued. While the book is crossed (best bid price at
//! or above best ask price) the two head orders trade, the resting
//! side's quoted price is honored, and filled orders and emptied levels
//! are removed. The loop never blocks and always runs to completion
//! before `add_order` returns, so the book is never observably crossed.

use super::book::OrderBook;
use super::types::Trade;
use crate::utils::current_time_nanos;
use tracing::trace;

impl OrderBook {
    /// Match crossing orders until the book is uncrossed or one side
    /// empties.
    ///
    /// Each iteration trades `min` of the two head quantities at the
    /// resting order's price — the order whose timestamp is strictly
    /// earlier. When both arrived at the same instant, the ask's price
    /// is used. Head orders are decremented in place so a partially
    /// filled order keeps its queue position.
    pub(super) fn match_crossing_orders(&mut self) {
        loop {
            let Some(bid_price) = self.best_bid() else { break };
            let Some(ask_price) = self.best_ask() else { break };
            if bid_price < ask_price {
                break;
            }

            // Heads of the two best levels; levels are never empty while
            // stored, so these exist.
            let Some(buy) = self.bids.get(&bid_price).and_then(|l| l.front()).copied() else {
                break;
            };
            let Some(sell) = self.asks.get(&ask_price).and_then(|l| l.front()).copied() else {
                break;
            };

            let trade_quantity = buy.quantity.min(sell.quantity);
            let trade_price = if buy.timestamp < sell.timestamp {
                buy.price
            } else {
                // Seller rested first, or timestamps tie: ask price.
                sell.price
            };

            if let Some(level) = self.bids.get_mut(&bid_price) {
                if let Some(filled) = level.fill_front(trade_quantity) {
                    self.order_locations.remove(&filled);
                }
                if level.is_empty() {
                    self.bids.remove(&bid_price);
                }
            }

            if let Some(level) = self.asks.get_mut(&ask_price) {
                if let Some(filled) = level.fill_front(trade_quantity) {
                    self.order_locations.remove(&filled);
                }
                if level.is_empty() {
                    self.asks.remove(&ask_price);
                }
            }

            let trade = Trade {
                buy_order_id: buy.id,
                sell_order_id: sell.id,
                price: trade_price,
                timestamp: current_time_nanos(),
                quantity: trade_quantity,
                symbol: self.symbol,
            };

            trace!(
                "trade on {}: buy {} x sell {} {}@{}",
                self.symbol, trade.buy_order_id, trade.sell_order_id, trade.quantity, trade.price
            );

            if let Some(listener) = &self.trade_listener {
                listener(&trade);
            }
        }
    }
}
