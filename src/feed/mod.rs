//! The broadcaster side of the stack: shared-memory consumption and
//! WebSocket fan-out.
//!
//! [`MarketFeed`] attaches to the engine's regions (never creating or
//! unlinking them) and runs three poll loops on plain threads. Each loop
//! converts fresh data into a JSON frame and hands it to a
//! `tokio::sync::broadcast` channel; the axum server in [`server`]
//! forwards the channels to every connected WebSocket client. Slow
//! clients lag and skip frames rather than back-pressuring the polls.

pub mod frames;
pub mod server;

use crate::shm::{
    BookSlot, MetricsSlot, SharedRegion, TradeRing, TransportError, METRICS_REGION,
    SNAPSHOT_REGION, TRADES_REGION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Tunables for the broadcaster process.
#[derive(Debug, Clone)]
pub struct BroadcasterConfig {
    /// TCP port for the WebSocket server.
    pub port: u16,
    /// Directory backing the shared regions.
    pub shm_dir: PathBuf,
    /// Poll cadence for new snapshots.
    pub snapshot_poll: Duration,
    /// Poll cadence for new metrics records.
    pub metrics_poll: Duration,
    /// Poll cadence for draining the trade ring.
    pub trade_poll: Duration,
    /// Per-topic broadcast buffer; lagging clients skip frames.
    pub channel_capacity: usize,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            shm_dir: PathBuf::from(crate::shm::DEFAULT_SHM_DIR),
            snapshot_poll: Duration::from_millis(10),
            metrics_poll: Duration::from_millis(100),
            trade_poll: Duration::from_millis(1),
            channel_capacity: 1024,
        }
    }
}

/// The per-topic broadcast senders feeding connected clients.
#[derive(Clone)]
pub struct FeedChannels {
    /// Order book snapshot frames.
    pub orderbook: broadcast::Sender<String>,
    /// Metrics frames.
    pub metrics: broadcast::Sender<String>,
    /// Trade print frames.
    pub trades: broadcast::Sender<String>,
}

impl FeedChannels {
    fn new(capacity: usize) -> Self {
        Self {
            orderbook: broadcast::channel(capacity).0,
            metrics: broadcast::channel(capacity).0,
            trades: broadcast::channel(capacity).0,
        }
    }
}

/// Join handles for the feed's poll threads.
pub struct FeedHandles {
    snapshot: JoinHandle<()>,
    metrics: JoinHandle<()>,
    trades: JoinHandle<()>,
}

impl FeedHandles {
    /// Wait for all poll threads to finish.
    pub fn join(self) {
        for (name, handle) in [
            ("trade drain", self.trades),
            ("metrics poll", self.metrics),
            ("snapshot poll", self.snapshot),
        ] {
            if handle.join().is_err() {
                error!("{name} thread panicked");
            }
        }
    }
}

/// Reader of the engine's shared regions.
pub struct MarketFeed {
    snapshot_region: Arc<SharedRegion<BookSlot>>,
    metrics_region: Arc<SharedRegion<MetricsSlot>>,
    trades_region: Arc<SharedRegion<TradeRing>>,
    channels: FeedChannels,
    running: Arc<AtomicBool>,
    config: BroadcasterConfig,
}

impl MarketFeed {
    /// Attach to the engine's regions.
    ///
    /// # Errors
    ///
    /// Any [`TransportError`] — most commonly a missing region because
    /// the engine is not running — is fatal; the caller may retry.
    pub fn open(config: BroadcasterConfig) -> Result<Self, TransportError> {
        let snapshot_region = Arc::new(SharedRegion::<BookSlot>::open_in(
            &config.shm_dir,
            SNAPSHOT_REGION,
        )?);
        let metrics_region = Arc::new(SharedRegion::<MetricsSlot>::open_in(
            &config.shm_dir,
            METRICS_REGION,
        )?);
        let trades_region = Arc::new(SharedRegion::<TradeRing>::open_in(
            &config.shm_dir,
            TRADES_REGION,
        )?);

        let channels = FeedChannels::new(config.channel_capacity);

        Ok(Self {
            snapshot_region,
            metrics_region,
            trades_region,
            channels,
            running: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    /// The broadcast channels the server forwards to clients.
    #[must_use]
    pub fn channels(&self) -> FeedChannels {
        self.channels.clone()
    }

    /// The feed configuration.
    #[must_use]
    pub fn config(&self) -> &BroadcasterConfig {
        &self.config
    }

    /// Start the three poll threads.
    pub fn start(&self) -> FeedHandles {
        self.running.store(true, Ordering::SeqCst);
        info!("starting market feed polls");

        FeedHandles {
            snapshot: self.spawn_snapshot_poll(),
            metrics: self.spawn_metrics_poll(),
            trades: self.spawn_trade_drain(),
        }
    }

    /// Request cooperative shutdown of the poll threads.
    pub fn stop(&self) {
        info!("stopping market feed");
        self.running.store(false, Ordering::SeqCst);
    }

    fn spawn_snapshot_poll(&self) -> JoinHandle<()> {
        let region = Arc::clone(&self.snapshot_region);
        let sender = self.channels.orderbook.clone();
        let running = Arc::clone(&self.running);
        let interval = self.config.snapshot_poll;

        thread::spawn(move || {
            let mut last_sequence = 0u64;
            while running.load(Ordering::Relaxed) {
                if !region.still_linked() {
                    error!(
                        "{}",
                        TransportError::RegionGone {
                            name: region.name().to_string()
                        }
                    );
                    break;
                }
                if let Some((sequence, snapshot)) = region.get().read_newer(last_sequence) {
                    last_sequence = sequence;
                    // Send fails only when no client is subscribed.
                    let _ = sender.send(frames::orderbook_frame(&snapshot));
                }
                thread::sleep(interval);
            }
            info!("snapshot poll stopped at sequence {last_sequence}");
        })
    }

    fn spawn_metrics_poll(&self) -> JoinHandle<()> {
        let region = Arc::clone(&self.metrics_region);
        let sender = self.channels.metrics.clone();
        let running = Arc::clone(&self.running);
        let interval = self.config.metrics_poll;

        thread::spawn(move || {
            let mut last_sequence = 0u64;
            while running.load(Ordering::Relaxed) {
                if !region.still_linked() {
                    error!(
                        "{}",
                        TransportError::RegionGone {
                            name: region.name().to_string()
                        }
                    );
                    break;
                }
                if let Some((sequence, metrics)) = region.get().read_newer(last_sequence) {
                    last_sequence = sequence;
                    let _ = sender.send(frames::metrics_frame(&metrics));
                }
                thread::sleep(interval);
            }
            info!("metrics poll stopped");
        })
    }

    fn spawn_trade_drain(&self) -> JoinHandle<()> {
        let region = Arc::clone(&self.trades_region);
        let sender = self.channels.trades.clone();
        let running = Arc::clone(&self.running);
        let interval = self.config.trade_poll;

        thread::spawn(move || {
            let mut drained = 0u64;
            while running.load(Ordering::Relaxed) {
                if !region.still_linked() {
                    error!(
                        "{}",
                        TransportError::RegionGone {
                            name: region.name().to_string()
                        }
                    );
                    break;
                }
                while let Some(trade) = region.get().pop() {
                    drained += 1;
                    let _ = sender.send(frames::trade_frame(&trade));
                }
                thread::sleep(interval);
            }
            info!("trade drain stopped after {drained} trades");
        })
    }
}

impl std::fmt::Debug for MarketFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketFeed")
            .field("port", &self.config.port)
            .field("shm_dir", &self.config.shm_dir)
            .finish()
    }
}
