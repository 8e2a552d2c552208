//! Worker pool lifecycle: creation, resizing by full teardown and recreation,
//! and termination. The pool is the sole owner of its worker handles; callers
//! borrow them through [`WorkerPool::worker`] for the span of one dispatch.

use crate::pool::worker::WorkerHandle;
use crate::remote::EndpointFactory;
use crate::runtime::error::BenchError;
use crate::runtime::telemetry::Telemetry;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

pub const MIN_POOL_SIZE: usize = 1;
pub const MAX_POOL_SIZE: usize = 16;
pub const DEFAULT_POOL_SIZE: usize = 5;

pub struct WorkerPool {
    size: usize,
    workers: Vec<WorkerHandle>,
    live: bool,
    endpoints: Arc<dyn EndpointFactory>,
    processing_cost: Duration,
    telemetry: Arc<Telemetry>,
}

pub struct WorkerPoolParams {
    pub size: usize,
    pub endpoints: Arc<dyn EndpointFactory>,
    pub processing_cost: Duration,
    pub telemetry: Arc<Telemetry>,
}

impl WorkerPool {
    /// Creates an uninitialized pool; no worker exists until [`ensure_live`].
    ///
    /// [`ensure_live`]: WorkerPool::ensure_live
    pub fn new(params: WorkerPoolParams) -> Self {
        Self {
            size: clamp_pool_size(params.size),
            workers: Vec::new(),
            live: false,
            endpoints: params.endpoints,
            processing_cost: params.processing_cost,
            telemetry: params.telemetry,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Number of worker handles currently held.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Clamps `size` to `[1, 16]`. A live pool is torn down and recreated when
    /// the size actually changes; an unchanged size is a no-op.
    pub fn set_size(&mut self, size: usize) -> Result<()> {
        let size = clamp_pool_size(size);
        if size == self.size {
            return Ok(());
        }

        tracing::info!(from = self.size, to = size, "resizing worker pool");
        self.size = size;
        if self.live {
            self.recreate()?;
        }
        Ok(())
    }

    /// Spawns exactly `size` workers if the pool is not live yet.
    pub fn ensure_live(&mut self) -> Result<()> {
        if self.live {
            return Ok(());
        }
        self.spawn_workers()
    }

    /// Applies an optional size, then rebuilds the pool unconditionally.
    pub fn initialize(&mut self, size: Option<usize>) -> Result<()> {
        if let Some(size) = size {
            self.size = clamp_pool_size(size);
        }
        self.recreate()
    }

    /// Destroys every worker handle. In-flight tasks are abandoned, not awaited.
    pub fn terminate(&mut self) {
        if !self.live {
            return;
        }

        let count = self.workers.len();
        for worker in self.workers.drain(..) {
            worker.terminate();
        }
        self.live = false;
        self.telemetry.record_worker_pool_size(0);
        tracing::info!(workers = count, "worker pool terminated");
    }

    pub fn worker(&self, index: usize) -> Result<&WorkerHandle> {
        self.workers.get(index).ok_or_else(|| {
            BenchError::IndexOutOfRange {
                index,
                size: self.workers.len(),
            }
            .into()
        })
    }

    fn recreate(&mut self) -> Result<()> {
        self.terminate();
        self.spawn_workers()
    }

    fn spawn_workers(&mut self) -> Result<()> {
        debug_assert!(self.workers.is_empty(), "spawning over live handles");
        let mut workers = Vec::with_capacity(self.size);

        for id in 0..self.size {
            let spawned = self
                .endpoints
                .connect()
                .with_context(|| format!("failed to connect endpoint for worker {id}"))
                .and_then(|endpoint| WorkerHandle::spawn(id, endpoint, self.processing_cost));

            match spawned {
                Ok(worker) => {
                    self.telemetry.record_worker_spawned();
                    workers.push(worker);
                }
                Err(err) => {
                    tracing::error!(worker = id, error = %err, "failed to start worker");
                    for worker in workers {
                        worker.terminate();
                    }
                    return Err(err);
                }
            }
        }

        self.workers = workers;
        self.live = true;
        self.telemetry.record_worker_pool_size(self.size);
        tracing::info!(workers = self.size, "worker pool live");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn take_workers(&mut self) -> Vec<WorkerHandle> {
        self.live = false;
        std::mem::take(&mut self.workers)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.terminate();
    }
}

pub fn clamp_pool_size(size: usize) -> usize {
    size.clamp(MIN_POOL_SIZE, MAX_POOL_SIZE)
}
