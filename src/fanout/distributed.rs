//! Distributed fan-out: partitions a request total across the worker pool,
//! dispatches one task per worker, and folds the completions back into one
//! batch in arrival order. The first failure aborts the whole batch; replies
//! still in flight are dropped with their completion slots.

use crate::fanout::batch::BatchResult;
use crate::fanout::partition::partition;
use crate::pool::{WorkerEvent, WorkerPool, WorkerTaskRequest, WorkerTaskResponse};
use crate::runtime::error::BenchError;
use crate::runtime::telemetry::Telemetry;
use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct DistributedFanout {
    telemetry: Arc<Telemetry>,
}

impl DistributedFanout {
    pub fn new(telemetry: Arc<Telemetry>) -> Self {
        Self { telemetry }
    }

    /// Runs `total_count` calls spread across every worker in `pool`.
    ///
    /// The pool must not be resized while this future is pending.
    pub async fn run(&self, pool: &mut WorkerPool, total_count: usize) -> Result<BatchResult> {
        pool.ensure_live()?;
        let workers = pool.size();
        let shares = partition(total_count, workers);
        tracing::debug!(total_count, workers, ?shares, "dispatching distributed fan-out");

        let mut completed = 0usize;
        let mut pending = FuturesUnordered::new();

        for (index, share) in shares.iter().copied().enumerate() {
            if share == 0 {
                completed += 1;
                continue;
            }

            let reply = pool
                .worker(index)?
                .dispatch(WorkerTaskRequest::fetch_data(share))?;
            pending.push(async move { (index, reply.await) });
        }

        let mut aggregate = BatchResult::default();
        while let Some((index, reply)) = pending.next().await {
            let event = reply.map_err(|_| {
                BenchError::worker_runtime(index, "worker exited before responding")
            })?;

            match event {
                WorkerEvent::Response(WorkerTaskResponse::Success(batch)) => {
                    aggregate.absorb(batch.results, batch.total_processing_time_ms);
                    completed += 1;
                }
                WorkerEvent::Response(WorkerTaskResponse::Failure { message }) => {
                    tracing::warn!(worker = index, error = %message, "worker task failed; aborting batch");
                    return Err(BenchError::AggregationAbort {
                        worker: index,
                        message,
                    }
                    .into());
                }
                WorkerEvent::Crashed { message } => {
                    tracing::error!(worker = index, error = %message, "worker crashed; aborting batch");
                    return Err(BenchError::worker_runtime(index, message).into());
                }
            }
        }

        debug_assert_eq!(completed, workers, "every worker must be accounted for");
        self.telemetry.record_calls_completed(aggregate.len());
        Ok(aggregate)
    }
}
