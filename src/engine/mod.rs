//! The trading engine process: book ownership, publisher threads, and
//! cooperative shutdown.
//!
//! [`TradingEngine`] creates the three shared regions, wires the book's
//! trade sink into the trade ring, and runs three loops:
//!
//! - a **submitter** thread feeding synthetic order flow into the book
//!   and recording per-order latency,
//! - a **snapshot publisher** copying the top of the book into the
//!   snapshot slot on a microsecond cadence,
//! - a **metrics publisher** pushing counter and latency summaries at
//!   10 Hz.
//!
//! The book is guarded by a `Mutex` taken briefly around each mutation
//! and each snapshot; that lock is the explicit serialization between
//! the submitter and the snapshot publisher. Shutdown is cooperative: a
//! shared flag is cleared, each loop notices at its next pause, and the
//! threads are joined in reverse startup order before the regions are
//! unlinked. An in-flight match always runs to completion.

pub mod flow;

pub use flow::OrderFlow;

use crate::metrics::{MetricsCollector, ProcHostProbe};
use crate::orderbook::trade::listener;
use crate::orderbook::types::{Price, Quantity, Symbol, Trade};
use crate::orderbook::OrderBook;
use crate::shm::{
    BookSlot, MetricsSlot, SharedRegion, TradeRing, TransportError, METRICS_REGION,
    SNAPSHOT_REGION, TRADES_REGION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Tunables for the engine process.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Instrument symbol (at most 15 bytes survive the fixed tag).
    pub symbol: String,
    /// Lower bound of the synthetic price band, in minimum increments.
    pub min_price: Price,
    /// Upper bound of the synthetic price band, in minimum increments.
    pub max_price: Price,
    /// Smallest synthetic order quantity.
    pub min_quantity: Quantity,
    /// Largest synthetic order quantity.
    pub max_quantity: Quantity,
    /// Cadence of the snapshot publisher.
    pub snapshot_interval: Duration,
    /// Cadence of the metrics publisher.
    pub metrics_interval: Duration,
    /// Minimum pacing delay between order submissions.
    pub min_order_delay: Duration,
    /// Maximum pacing delay between order submissions.
    pub max_order_delay: Duration,
    /// Directory backing the shared regions.
    pub shm_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSD".to_string(),
            // $50,000.00 – $60,000.00 in cents.
            min_price: 5_000_000,
            max_price: 6_000_000,
            min_quantity: 1,
            max_quantity: 100,
            snapshot_interval: Duration::from_micros(100),
            metrics_interval: Duration::from_millis(100),
            min_order_delay: Duration::from_millis(1),
            max_order_delay: Duration::from_millis(10),
            shm_dir: PathBuf::from(crate::shm::DEFAULT_SHM_DIR),
        }
    }
}

/// Join handles for the engine's threads.
///
/// [`join`](Self::join) waits for the loops in reverse startup order:
/// submitter first (no more mutations), then the metrics and snapshot
/// publishers.
pub struct EngineHandles {
    snapshot: JoinHandle<()>,
    metrics: JoinHandle<()>,
    submitter: JoinHandle<()>,
}

impl EngineHandles {
    /// Wait for all engine threads to finish.
    pub fn join(self) {
        for (name, handle) in [
            ("submitter", self.submitter),
            ("metrics publisher", self.metrics),
            ("snapshot publisher", self.snapshot),
        ] {
            if handle.join().is_err() {
                error!("{name} thread panicked");
            }
        }
    }
}

/// The engine process: owns the book, the collector, and all three
/// shared regions.
///
/// Regions are created (and reset to their zeroed sentinel state) in
/// [`new`](Self::new) before any thread starts, and unlinked when the
/// engine is dropped — after [`EngineHandles::join`] in an orderly
/// shutdown.
pub struct TradingEngine {
    config: EngineConfig,
    book: Arc<Mutex<OrderBook>>,
    metrics: Arc<MetricsCollector>,
    snapshot_region: Arc<SharedRegion<BookSlot>>,
    metrics_region: Arc<SharedRegion<MetricsSlot>>,
    trades_region: Arc<SharedRegion<TradeRing>>,
    running: Arc<AtomicBool>,
}

impl TradingEngine {
    /// Create the shared regions and wire up the book.
    ///
    /// # Errors
    ///
    /// Any [`TransportError`] from region creation is fatal: the engine
    /// must not start without its transport.
    pub fn new(config: EngineConfig) -> Result<Self, TransportError> {
        let snapshot_region = Arc::new(SharedRegion::<BookSlot>::create_in(
            &config.shm_dir,
            SNAPSHOT_REGION,
        )?);
        let metrics_region = Arc::new(SharedRegion::<MetricsSlot>::create_in(
            &config.shm_dir,
            METRICS_REGION,
        )?);
        let trades_region = Arc::new(SharedRegion::<TradeRing>::create_in(
            &config.shm_dir,
            TRADES_REGION,
        )?);

        let metrics = Arc::new(MetricsCollector::new(Box::new(ProcHostProbe::new())));

        // The trade sink runs on the submitter thread, inside the match
        // loop. It must stay non-blocking: one ring push and two counter
        // bumps.
        let sink = {
            let trades = Arc::clone(&trades_region);
            let metrics = Arc::clone(&metrics);
            listener(move |trade: &Trade| {
                if !trades.get().push(trade) {
                    metrics.increment_trades_dropped();
                    warn!(
                        "trade ring full, dropping trade {}x{}",
                        trade.buy_order_id, trade.sell_order_id
                    );
                }
                metrics.increment_trades_executed();
            })
        };

        let book = Arc::new(Mutex::new(OrderBook::with_trade_listener(
            Symbol::new(&config.symbol),
            sink,
        )));

        Ok(Self {
            config,
            book,
            metrics,
            snapshot_region,
            metrics_region,
            trades_region,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start the publisher and submitter threads.
    pub fn start(&self) -> EngineHandles {
        self.running.store(true, Ordering::SeqCst);
        info!(
            "starting engine for {} (band {}..={} cents)",
            self.config.symbol, self.config.min_price, self.config.max_price
        );

        let snapshot = self.spawn_snapshot_publisher();
        let metrics = self.spawn_metrics_publisher();
        let submitter = self.spawn_submitter();

        EngineHandles {
            snapshot,
            metrics,
            submitter,
        }
    }

    /// Request cooperative shutdown. Each loop exits at its next pause.
    pub fn stop(&self) {
        info!("stopping engine");
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the engine loops should keep running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The engine's metrics collector.
    #[must_use]
    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// The guarded order book.
    #[must_use]
    pub fn book(&self) -> &Arc<Mutex<OrderBook>> {
        &self.book
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn spawn_submitter(&self) -> JoinHandle<()> {
        let book = Arc::clone(&self.book);
        let metrics = Arc::clone(&self.metrics);
        let running = Arc::clone(&self.running);
        let mut flow = OrderFlow::new(&self.config);

        thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                let order = flow.next_order();

                let started = Instant::now();
                let result = match book.lock() {
                    Ok(mut book) => book.add_order(order),
                    Err(_) => {
                        error!("order book mutex poisoned, submitter exiting");
                        break;
                    }
                };
                let latency_ns = started.elapsed().as_nanos() as u64;

                match result {
                    Ok(()) => {
                        metrics.record_latency(latency_ns);
                        metrics.increment_orders_processed();
                    }
                    Err(e) => warn!("order rejected: {e}"),
                }

                thread::sleep(flow.next_delay());
            }
            info!("submitter stopped after {} orders", flow.orders_generated());
        })
    }

    fn spawn_snapshot_publisher(&self) -> JoinHandle<()> {
        let book = Arc::clone(&self.book);
        let region = Arc::clone(&self.snapshot_region);
        let running = Arc::clone(&self.running);
        let interval = self.config.snapshot_interval;

        thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                let snapshot = match book.lock() {
                    Ok(book) => book.snapshot(),
                    Err(_) => {
                        error!("order book mutex poisoned, snapshot publisher exiting");
                        break;
                    }
                };
                region.get().publish(&snapshot);
                thread::sleep(interval);
            }
            info!(
                "snapshot publisher stopped at sequence {}",
                region.get().sequence()
            );
        })
    }

    fn spawn_metrics_publisher(&self) -> JoinHandle<()> {
        let metrics = Arc::clone(&self.metrics);
        let region = Arc::clone(&self.metrics_region);
        let running = Arc::clone(&self.running);
        let interval = self.config.metrics_interval;

        thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                let current = metrics.current_metrics();
                region.get().publish(&current);
                thread::sleep(interval);
            }
            info!("metrics publisher stopped");
        })
    }
}

impl std::fmt::Debug for TradingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingEngine")
            .field("symbol", &self.config.symbol)
            .field("running", &self.is_running())
            .finish()
    }
}
