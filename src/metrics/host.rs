//! Host metric probes.
//!
//! The collector itself only tracks engine-local counters; CPU, memory
//! and network figures come from a [`HostProbe`] implementation. Probes
//! are pure reads and never propagate failures: anything that cannot be
//! sampled reads as zero.

use std::fs;
use std::sync::Mutex;

/// One sample of host-level metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostSample {
    /// CPU usage in tenths of a percent since the previous sample.
    pub cpu_usage: u64,
    /// Resident set size of this process, bytes.
    pub memory_usage_bytes: u64,
    /// Network bytes sent since the previous sample (loopback excluded).
    pub network_bytes_sent: u64,
    /// Network bytes received since the previous sample (loopback excluded).
    pub network_bytes_recv: u64,
}

/// Source of host-level metrics.
///
/// Implementations must be cheap, read-only, and infallible: on any
/// probe failure the affected fields are zero.
pub trait HostProbe: Send + Sync {
    /// Take one sample. Delta fields are relative to the previous call.
    fn sample(&self) -> HostSample;
}

/// A probe that always reads zeros. Useful in tests and on platforms
/// without `/proc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHostProbe;

impl HostProbe for NullHostProbe {
    fn sample(&self) -> HostSample {
        HostSample::default()
    }
}

/// State carried between samples for delta computation.
#[derive(Debug, Default)]
struct ProbeState {
    last_cpu_idle: u64,
    last_cpu_total: u64,
    last_net_sent: u64,
    last_net_recv: u64,
}

/// Host probe backed by the Linux `/proc` filesystem.
///
/// Reads `/proc/stat` for CPU usage, `/proc/self/status` for resident
/// memory, and `/proc/net/dev` for network counters. The first sample
/// establishes the delta baselines and may read as zero.
#[derive(Debug, Default)]
pub struct ProcHostProbe {
    state: Mutex<ProbeState>,
}

impl ProcHostProbe {
    /// Create a probe with empty baselines.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// CPU busy time as tenths of a percent of the elapsed interval.
    fn sample_cpu(state: &mut ProbeState) -> u64 {
        let Ok(stat) = fs::read_to_string("/proc/stat") else {
            return 0;
        };
        let Some(line) = stat.lines().next() else {
            return 0;
        };
        let fields: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .filter_map(|f| f.parse().ok())
            .collect();
        if fields.len() < 8 {
            return 0;
        }

        // user nice system idle iowait irq softirq steal
        let idle = fields[3] + fields[4];
        let total: u64 = fields[..8].iter().sum();

        let total_diff = total.saturating_sub(state.last_cpu_total);
        let idle_diff = idle.saturating_sub(state.last_cpu_idle);
        state.last_cpu_total = total;
        state.last_cpu_idle = idle;

        if total_diff == 0 {
            return 0;
        }
        (1000 * total_diff.saturating_sub(idle_diff)) / total_diff
    }

    fn sample_memory() -> u64 {
        let Ok(status) = fs::read_to_string("/proc/self/status") else {
            return 0;
        };
        for line in status.lines() {
            if let Some(rest) = line.strip_prefix("VmRSS:") {
                let kb: u64 = rest
                    .split_whitespace()
                    .next()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                return kb * 1024;
            }
        }
        0
    }

    /// Delta bytes (sent, received) across all non-loopback interfaces.
    fn sample_network(state: &mut ProbeState) -> (u64, u64) {
        let Ok(dev) = fs::read_to_string("/proc/net/dev") else {
            return (0, 0);
        };

        let mut total_recv = 0u64;
        let mut total_sent = 0u64;
        for line in dev.lines().skip(2) {
            let Some((iface, rest)) = line.split_once(':') else {
                continue;
            };
            if iface.trim() == "lo" {
                continue;
            }
            let fields: Vec<u64> = rest
                .split_whitespace()
                .filter_map(|f| f.parse().ok())
                .collect();
            // receive bytes is column 0, transmit bytes column 8
            if fields.len() >= 9 {
                total_recv += fields[0];
                total_sent += fields[8];
            }
        }

        let delta_sent = total_sent.saturating_sub(state.last_net_sent);
        let delta_recv = total_recv.saturating_sub(state.last_net_recv);
        state.last_net_sent = total_sent;
        state.last_net_recv = total_recv;
        (delta_sent, delta_recv)
    }
}

impl HostProbe for ProcHostProbe {
    fn sample(&self) -> HostSample {
        let Ok(mut state) = self.state.lock() else {
            return HostSample::default();
        };

        let cpu_usage = Self::sample_cpu(&mut state);
        let memory_usage_bytes = Self::sample_memory();
        let (network_bytes_sent, network_bytes_recv) = Self::sample_network(&mut state);

        HostSample {
            cpu_usage,
            memory_usage_bytes,
            network_bytes_sent,
            network_bytes_recv,
        }
    }
}
