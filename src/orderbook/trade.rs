//! Trade emission: the sink capability through which the matching engine
//! hands executed trades to the rest of the system.

use super::types::Trade;
use std::sync::Arc;

/// Trade listener specification using Arc for shared ownership.
///
/// The listener is invoked synchronously on the thread that mutates the
/// book, once per trade, in match order. It must be non-blocking and
/// must not call back into the `OrderBook` (the book is mid-mutation
/// while the listener runs).
pub type TradeListener = Arc<dyn Fn(&Trade) + Send + Sync>;

/// Wrap a closure as a [`TradeListener`].
pub fn listener<F>(f: F) -> TradeListener
where
    F: Fn(&Trade) + Send + Sync + 'static,
{
    Arc::new(f)
}
