//! Order book error types

use super::types::{OrderId, OrderKind, Price, Quantity};
use std::fmt;

/// Errors that can occur within the OrderBook
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OrderBookError {
    /// An order with this id is already resting in the book. The book is
    /// left unchanged.
    DuplicateOrderId {
        /// The rejected order id.
        id: OrderId,
    },

    /// The order failed validation (zero quantity, non-positive price,
    /// or an unsupported order type). The book is left unchanged.
    InvalidOrder {
        /// The rejected order id.
        id: OrderId,
        /// Why the order was rejected.
        reason: InvalidOrderReason,
    },
}

/// The specific validation failure behind [`OrderBookError::InvalidOrder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidOrderReason {
    /// Quantity was zero.
    ZeroQuantity,
    /// Price was zero or negative.
    NonPositivePrice(Price),
    /// The order type is not supported by this engine.
    UnsupportedKind(OrderKind),
}

impl OrderBookError {
    /// Convenience constructor for a quantity validation failure.
    #[must_use]
    pub fn zero_quantity(id: OrderId) -> Self {
        OrderBookError::InvalidOrder {
            id,
            reason: InvalidOrderReason::ZeroQuantity,
        }
    }

    /// Convenience constructor for a price validation failure.
    #[must_use]
    pub fn non_positive_price(id: OrderId, price: Price) -> Self {
        OrderBookError::InvalidOrder {
            id,
            reason: InvalidOrderReason::NonPositivePrice(price),
        }
    }

    /// Convenience constructor for an unsupported order type.
    #[must_use]
    pub fn unsupported_kind(id: OrderId, kind: OrderKind) -> Self {
        OrderBookError::InvalidOrder {
            id,
            reason: InvalidOrderReason::UnsupportedKind(kind),
        }
    }
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::DuplicateOrderId { id } => {
                write!(f, "duplicate order id: {id} is already in the book")
            }
            OrderBookError::InvalidOrder { id, reason } => match reason {
                InvalidOrderReason::ZeroQuantity => {
                    write!(f, "invalid order {id}: quantity must be positive")
                }
                InvalidOrderReason::NonPositivePrice(price) => {
                    write!(f, "invalid order {id}: price {price} must be positive")
                }
                InvalidOrderReason::UnsupportedKind(kind) => {
                    write!(f, "invalid order {id}: unsupported order type {kind}")
                }
            },
        }
    }
}

impl std::error::Error for OrderBookError {}

/// Validate the fields an incoming order must satisfy before it can
/// touch the book.
pub(super) fn validate(
    id: OrderId,
    price: Price,
    quantity: Quantity,
    kind: OrderKind,
) -> Result<(), OrderBookError> {
    if kind != OrderKind::Limit {
        return Err(OrderBookError::unsupported_kind(id, kind));
    }
    if quantity == 0 {
        return Err(OrderBookError::zero_quantity(id));
    }
    if price <= 0 {
        return Err(OrderBookError::non_positive_price(id, price));
    }
    Ok(())
}
