//! Order book operations: adding, cancelling and modifying orders.

use super::book::OrderBook;
use super::error::{self, OrderBookError};
use super::level::PriceLevel;
use super::types::{Order, OrderId, OrderKind, Price, Quantity};
use tracing::trace;

impl OrderBook {
    /// Add an order to the book and run the match loop.
    ///
    /// The order is queued at the tail of its price level (creating the
    /// level if absent) and then matched against the opposite side until
    /// the book is no longer crossed. Trades are delivered through the
    /// installed listener, in match order, before this method returns.
    ///
    /// # Errors
    ///
    /// - [`OrderBookError::DuplicateOrderId`] when `order.id` is already
    ///   resting in the book.
    /// - [`OrderBookError::InvalidOrder`] when the quantity is zero, the
    ///   price is not positive, or the order type is not
    ///   [`OrderKind::Limit`].
    ///
    /// On error the book is left unchanged.
    pub fn add_order(&mut self, order: Order) -> Result<(), OrderBookError> {
        error::validate(order.id, order.price, order.quantity, order.kind)?;
        if self.order_locations.contains_key(&order.id) {
            return Err(OrderBookError::DuplicateOrderId { id: order.id });
        }

        trace!(
            "adding order {} {} {}@{} to {}",
            order.id, order.side, order.quantity, order.price, self.symbol
        );

        self.side_levels_mut(order.side)
            .entry(order.price)
            .or_insert_with(|| PriceLevel::new(order.price))
            .push_back(order);
        self.order_locations
            .insert(order.id, (order.side, order.price));

        self.match_crossing_orders();
        Ok(())
    }

    /// Remove a resting order from the book.
    ///
    /// Unknown ids are a silent no-op (`None`), so cancel is idempotent.
    /// Returns the removed order when one was present.
    pub fn cancel_order(&mut self, order_id: OrderId) -> Option<Order> {
        let (side, price) = self.order_locations.remove(&order_id)?;
        trace!("cancelling order {} on {}", order_id, self.symbol);

        let levels = self.side_levels_mut(side);
        let level = levels.get_mut(&price)?;
        let removed = level.remove(order_id);
        if level.is_empty() {
            levels.remove(&price);
        }
        removed
    }

    /// Re-price and/or re-size a resting order.
    ///
    /// Semantically cancel-then-add: the existing order is removed and a
    /// new order with the same id, the new price and quantity, and a
    /// fresh arrival timestamp is submitted. The order therefore always
    /// loses time priority, including for quantity-only reductions; that
    /// is the documented contract of this operation.
    ///
    /// Unknown ids are a silent no-op (`Ok(None)`). On success the
    /// replaced order is returned; the replacement may have traded
    /// partially or fully if its new price crossed the book.
    ///
    /// # Errors
    ///
    /// [`OrderBookError::InvalidOrder`] when the new price or quantity
    /// fails validation. Validation runs before the existing order is
    /// touched, so a rejected modify leaves the book unchanged.
    pub fn modify_order(
        &mut self,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    ) -> Result<Option<Order>, OrderBookError> {
        error::validate(order_id, new_price, new_quantity, OrderKind::Limit)?;

        let Some(existing) = self.cancel_order(order_id) else {
            return Ok(None);
        };

        trace!(
            "modifying order {} on {}: {}@{} -> {}@{}",
            order_id, self.symbol, existing.quantity, existing.price, new_quantity, new_price
        );

        let replacement = Order::limit(
            order_id,
            new_price,
            new_quantity,
            existing.side,
            existing.symbol,
        );
        self.add_order(replacement)?;
        Ok(Some(existing))
    }
}
