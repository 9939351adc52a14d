//! Synthetic order flow for the simulated market.
//!
//! Prices, quantities and sides are drawn uniformly from the configured
//! bands, which produces a book that continually crosses itself and
//! keeps the matching engine busy. Ids are monotonic from 1 so every
//! submission is unique for the engine's lifetime.

use super::EngineConfig;
use crate::orderbook::types::{Order, Side, Symbol};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Uniformly distributed limit order generator.
pub struct OrderFlow {
    rng: StdRng,
    symbol: Symbol,
    next_order_id: u64,
    min_price: i64,
    max_price: i64,
    min_quantity: u32,
    max_quantity: u32,
    min_delay: Duration,
    max_delay: Duration,
}

impl OrderFlow {
    /// Create a generator seeded from the OS entropy pool.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a deterministic generator for tests.
    #[must_use]
    pub fn with_seed(config: &EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &EngineConfig, rng: StdRng) -> Self {
        Self {
            rng,
            symbol: Symbol::new(&config.symbol),
            next_order_id: 1,
            min_price: config.min_price,
            max_price: config.max_price,
            min_quantity: config.min_quantity,
            max_quantity: config.max_quantity,
            min_delay: config.min_order_delay,
            max_delay: config.max_order_delay,
        }
    }

    /// Draw the next order. Ids never repeat.
    pub fn next_order(&mut self) -> Order {
        let id = self.next_order_id;
        self.next_order_id += 1;

        let price = self.rng.gen_range(self.min_price..=self.max_price);
        let quantity = self.rng.gen_range(self.min_quantity..=self.max_quantity);
        let side = if self.rng.gen_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        };

        Order::limit(id, price, quantity, side, self.symbol)
    }

    /// Draw the pacing delay before the next submission.
    pub fn next_delay(&mut self) -> Duration {
        let (lo, hi) = (self.min_delay.as_micros() as u64, self.max_delay.as_micros() as u64);
        Duration::from_micros(self.rng.gen_range(lo..=hi.max(lo)))
    }

    /// How many orders have been drawn so far.
    #[must_use]
    pub fn orders_generated(&self) -> u64 {
        self.next_order_id - 1
    }
}
