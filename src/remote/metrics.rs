//! Call accounting for HTTP endpoints. One instance is shared by every client
//! an [`HttpEndpointFactory`](crate::remote::HttpEndpointFactory) connects, so
//! the caller's calls and every worker's calls land in the same totals.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct EndpointMetrics {
    calls: AtomicU64,
    failures: AtomicU64,
    latency_ns: AtomicU64,
    slowest_ns: AtomicU64,
}

impl EndpointMetrics {
    pub(crate) fn record(&self, latency: Duration, succeeded: bool) {
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        self.calls.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        self.latency_ns.fetch_add(nanos, Ordering::Relaxed);
        self.slowest_ns.fetch_max(nanos, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> EndpointMetricsSnapshot {
        let calls = self.calls.load(Ordering::Relaxed);
        let failures = self.failures.load(Ordering::Relaxed);
        let per_call = |total: u64| {
            if calls == 0 {
                0.0
            } else {
                total as f64 / calls as f64
            }
        };

        EndpointMetricsSnapshot {
            total_requests: calls,
            total_errors: failures,
            average_latency_ms: per_call(self.latency_ns.load(Ordering::Relaxed)) / 1e6,
            max_latency_ms: self.slowest_ns.load(Ordering::Relaxed) as f64 / 1e6,
            error_rate: per_call(failures),
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct EndpointMetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    /// Network round trip only; the processing cost is not included.
    pub average_latency_ms: f64,
    pub max_latency_ms: f64,
    pub error_rate: f64,
}

impl fmt::Display for EndpointMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} calls, {} failed, latency avg {:.2}ms max {:.2}ms",
            self.total_requests, self.total_errors, self.average_latency_ms, self.max_latency_ms
        )
    }
}
