use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs a basic tracing subscriber (if one is not already active).
///
/// The subscriber honours `RUST_LOG` if it is present, otherwise it falls back to `info`.
/// Calling this function multiple times is harmless.
pub fn init_tracing() {
    if TRACING_INIT.get().is_some() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .try_init();

    let _ = TRACING_INIT.set(());
}

/// Caller-side counters. Workers never touch these; everything recorded here
/// happens on the thread that owns the pool.
#[derive(Default, Debug)]
pub struct Telemetry {
    direct_runs: AtomicU64,
    distributed_runs: AtomicU64,
    calls_completed: AtomicU64,
    failed_runs: AtomicU64,
    workers_spawned: AtomicU64,
    worker_pool_transitions: AtomicU64,
    worker_pool_size: AtomicUsize,
}

impl Telemetry {
    pub fn record_direct_run(&self) {
        self.direct_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_distributed_run(&self) {
        self.distributed_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_calls_completed(&self, count: usize) {
        if count == 0 {
            return;
        }
        self.calls_completed
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_failed_run(&self) {
        self.failed_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_worker_spawned(&self) {
        self.workers_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_worker_pool_size(&self, workers: usize) {
        self.worker_pool_size.store(workers, Ordering::Relaxed);
        self.worker_pool_transitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn workers_spawned(&self) -> u64 {
        self.workers_spawned.load(Ordering::Relaxed)
    }

    pub fn worker_pool_size(&self) -> usize {
        self.worker_pool_size.load(Ordering::Relaxed)
    }

    pub fn worker_pool_transitions(&self) -> u64 {
        self.worker_pool_transitions.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            direct_runs: self.direct_runs.load(Ordering::Relaxed),
            distributed_runs: self.distributed_runs.load(Ordering::Relaxed),
            calls_completed: self.calls_completed.load(Ordering::Relaxed),
            failed_runs: self.failed_runs.load(Ordering::Relaxed),
            workers_spawned: self.workers_spawned(),
            worker_pool_size: self.worker_pool_size(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub direct_runs: u64,
    pub distributed_runs: u64,
    pub calls_completed: u64,
    pub failed_runs: u64,
    pub workers_spawned: u64,
    pub worker_pool_size: usize,
}
