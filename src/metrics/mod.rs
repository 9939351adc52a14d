//! Latency and throughput metrics for the matching hot path.
//!
//! [`MetricsCollector`] accumulates counters and latency samples with
//! atomic operations only, so producers on the hot path never block.
//! Host-level figures (CPU, memory, network) come from a [`HostProbe`]
//! collaborator and are merged into the published
//! [`SystemMetrics`](crate::orderbook::types::SystemMetrics) record.

pub mod collector;
pub mod host;

pub use collector::{MetricsCollector, HISTOGRAM_BUCKETS, HISTOGRAM_MAX_LATENCY_NS};
pub use host::{HostProbe, HostSample, NullHostProbe, ProcHostProbe};
