//! Concurrent accumulation of counters and latency samples.

use super::host::{HostProbe, NullHostProbe};
use crate::orderbook::types::SystemMetrics;
use crate::utils::current_time_nanos;
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of linear histogram buckets.
pub const HISTOGRAM_BUCKETS: usize = 50;

/// Upper bound of the histogram range in nanoseconds (1 ms). Samples at
/// or above this all land in the last bucket.
pub const HISTOGRAM_MAX_LATENCY_NS: u64 = 1_000_000;

/// A lock-free sink for per-operation latency samples and counters.
///
/// All update operations use atomics only and are safe under any number
/// of producer threads. Reads are consistent per field; a
/// [`SystemMetrics`] assembled by [`current_metrics`](Self::current_metrics)
/// is not a cross-field atomic snapshot, and consumers must tolerate
/// mild skew between counters and latency figures.
pub struct MetricsCollector {
    /// Orders accepted by the book.
    orders_processed: AtomicU64,
    /// Trades executed by the match loop.
    trades_executed: AtomicU64,
    /// Trades dropped because the shared ring was full.
    trades_dropped: AtomicU64,

    /// Running sum of latency samples, nanoseconds.
    total_latency_ns: AtomicU64,
    /// Number of latency samples recorded.
    latency_samples: AtomicU64,
    /// Smallest sample seen; `u64::MAX` until the first sample lands.
    min_latency_ns: AtomicU64,
    /// Largest sample seen.
    max_latency_ns: AtomicU64,

    /// Linear histogram over `[0, HISTOGRAM_MAX_LATENCY_NS)`.
    histogram: [AtomicU64; HISTOGRAM_BUCKETS],

    /// Source of the host-level fields in published metrics.
    probe: Box<dyn HostProbe>,
}

impl MetricsCollector {
    /// Create a collector that reads host metrics from the given probe.
    #[must_use]
    pub fn new(probe: Box<dyn HostProbe>) -> Self {
        Self {
            orders_processed: AtomicU64::new(0),
            trades_executed: AtomicU64::new(0),
            trades_dropped: AtomicU64::new(0),
            total_latency_ns: AtomicU64::new(0),
            latency_samples: AtomicU64::new(0),
            min_latency_ns: AtomicU64::new(u64::MAX),
            max_latency_ns: AtomicU64::new(0),
            histogram: std::array::from_fn(|_| AtomicU64::new(0)),
            probe,
        }
    }

    /// Record one latency sample.
    ///
    /// Updates the running sum and count, the min/max watermarks via
    /// compare-exchange retry loops, and exactly one histogram bucket.
    pub fn record_latency(&self, latency_ns: u64) {
        self.total_latency_ns.fetch_add(latency_ns, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);

        let mut current = self.min_latency_ns.load(Ordering::Relaxed);
        while latency_ns < current {
            match self.min_latency_ns.compare_exchange_weak(
                current,
                latency_ns,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }

        let mut current = self.max_latency_ns.load(Ordering::Relaxed);
        while latency_ns > current {
            match self.max_latency_ns.compare_exchange_weak(
                current,
                latency_ns,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }

        let bucket = if latency_ns < HISTOGRAM_MAX_LATENCY_NS {
            let index = (latency_ns as usize * HISTOGRAM_BUCKETS) / HISTOGRAM_MAX_LATENCY_NS as usize;
            index.min(HISTOGRAM_BUCKETS - 1)
        } else {
            HISTOGRAM_BUCKETS - 1
        };
        self.histogram[bucket].fetch_add(1, Ordering::Relaxed);
    }

    /// Count one accepted order.
    #[inline]
    pub fn increment_orders_processed(&self) {
        self.orders_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one executed trade.
    #[inline]
    pub fn increment_trades_executed(&self) {
        self.trades_executed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one trade dropped at the shared ring.
    #[inline]
    pub fn increment_trades_dropped(&self) {
        self.trades_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of trades dropped so far.
    #[must_use]
    pub fn trades_dropped(&self) -> u64 {
        self.trades_dropped.load(Ordering::Relaxed)
    }

    /// Assemble a [`SystemMetrics`] record from the current counter
    /// values, latency summaries, and a fresh host probe sample.
    ///
    /// The average is the running sum over all samples since start, and
    /// all latency figures read as zero before the first sample.
    #[must_use]
    pub fn current_metrics(&self) -> SystemMetrics {
        let host = self.probe.sample();
        let samples = self.latency_samples.load(Ordering::Relaxed);

        let (avg, min, max) = if samples > 0 {
            (
                self.total_latency_ns.load(Ordering::Relaxed) / samples,
                self.min_latency_ns.load(Ordering::Relaxed),
                self.max_latency_ns.load(Ordering::Relaxed),
            )
        } else {
            (0, 0, 0)
        };

        SystemMetrics {
            timestamp: current_time_nanos(),
            cpu_usage: host.cpu_usage,
            memory_usage_bytes: host.memory_usage_bytes,
            network_bytes_sent: host.network_bytes_sent,
            network_bytes_recv: host.network_bytes_recv,
            orders_processed: self.orders_processed.load(Ordering::Relaxed),
            trades_executed: self.trades_executed.load(Ordering::Relaxed),
            trades_dropped: self.trades_dropped.load(Ordering::Relaxed),
            avg_latency_ns: avg,
            min_latency_ns: min,
            max_latency_ns: max,
        }
    }

    /// A copy of the latency histogram bucket counts.
    #[must_use]
    pub fn histogram(&self) -> [u64; HISTOGRAM_BUCKETS] {
        std::array::from_fn(|i| self.histogram[i].load(Ordering::Relaxed))
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(Box::new(NullHostProbe))
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector")
            .field(
                "orders_processed",
                &self.orders_processed.load(Ordering::Relaxed),
            )
            .field(
                "trades_executed",
                &self.trades_executed.load(Ordering::Relaxed),
            )
            .field(
                "latency_samples",
                &self.latency_samples.load(Ordering::Relaxed),
            )
            .finish()
    }
}
