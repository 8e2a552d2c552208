use crate::fanout::{BatchResult, DirectFanout, DistributedFanout};
use crate::pool::{WorkerPool, WorkerPoolParams};
use crate::remote::{CallUnit, EndpointFactory, EndpointMetricsSnapshot, HttpEndpointFactory};
use crate::runtime::config::BenchConfig;
use crate::runtime::error::BenchError;
use crate::runtime::report::{Comparison, Strategy, StrategyRun};
use crate::runtime::telemetry::Telemetry;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::time::Instant;

/// Caller-facing entry point. Owns the worker pool and the caller-side
/// fan-out, and enforces the request-count bound before anything is issued.
pub struct Benchmark {
    config: BenchConfig,
    direct: DirectFanout,
    distributed: DistributedFanout,
    pool: WorkerPool,
    telemetry: Arc<Telemetry>,
    http: Option<Arc<HttpEndpointFactory>>,
}

impl Benchmark {
    /// Builds a benchmark whose caller and workers each get their own HTTP
    /// client for `config.endpoint_url()`.
    pub fn new(config: BenchConfig) -> Result<Self> {
        let http = Arc::new(HttpEndpointFactory::new(config.endpoint_options())?);
        let mut bench = Self::with_endpoint_factory(config, http.clone())?;
        bench.http = Some(http);
        Ok(bench)
    }

    pub fn with_endpoint_factory(
        config: BenchConfig,
        endpoints: Arc<dyn EndpointFactory>,
    ) -> Result<Self> {
        let telemetry = Arc::new(Telemetry::default());
        let caller_endpoint = endpoints
            .connect()
            .context("failed to connect caller endpoint")?;
        let direct = DirectFanout::new(CallUnit::new(caller_endpoint, config.processing_cost()));
        let pool = WorkerPool::new(WorkerPoolParams {
            size: config.pool_size(),
            endpoints,
            processing_cost: config.processing_cost(),
            telemetry: telemetry.clone(),
        });

        Ok(Self {
            direct,
            distributed: DistributedFanout::new(telemetry.clone()),
            pool,
            telemetry,
            config,
            http: None,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn telemetry(&self) -> Arc<Telemetry> {
        self.telemetry.clone()
    }

    /// HTTP call totals for the caller and every worker. `None` when the
    /// benchmark was built over a custom endpoint factory.
    pub fn endpoint_metrics(&self) -> Option<EndpointMetricsSnapshot> {
        self.http.as_ref().map(|http| http.metrics())
    }

    /// Runs `count` calls concurrently on the current runtime.
    pub async fn run_direct(&self, count: usize) -> Result<BatchResult> {
        self.check_request_count(count)?;
        self.telemetry.record_direct_run();

        match self.direct.run(count).await {
            Ok(batch) => {
                self.telemetry.record_calls_completed(batch.len());
                Ok(batch)
            }
            Err(err) => {
                self.telemetry.record_failed_run();
                tracing::warn!(count, error = %err, "direct fan-out failed");
                Err(err)
            }
        }
    }

    /// Runs `count` calls partitioned across the worker pool, starting the
    /// pool first if it is not live.
    pub async fn run_distributed(&mut self, count: usize) -> Result<BatchResult> {
        self.check_request_count(count)?;
        self.telemetry.record_distributed_run();

        match self.distributed.run(&mut self.pool, count).await {
            Ok(batch) => Ok(batch),
            Err(err) => {
                self.telemetry.record_failed_run();
                tracing::warn!(count, error = %err, "distributed fan-out failed");
                Err(err)
            }
        }
    }

    /// Changes the pool size; a live pool is rebuilt at the new size.
    pub fn configure_pool_size(&mut self, size: usize) -> Result<()> {
        self.pool.set_size(size)
    }

    /// Rebuilds the pool unconditionally, optionally at a new size.
    pub fn initialize_pool(&mut self, size: Option<usize>) -> Result<()> {
        self.pool.initialize(size)
    }

    /// Times one strategy run. The worker pool is started before the clock so
    /// only the run itself is measured.
    pub async fn measure(&mut self, strategy: Strategy, count: usize) -> Result<StrategyRun> {
        if strategy == Strategy::Worker {
            self.check_request_count(count)?;
            self.pool.ensure_live()?;
        }

        let started = Instant::now();
        let batch = match strategy {
            Strategy::Direct => self.run_direct(count).await?,
            Strategy::Worker => self.run_distributed(count).await?,
        };
        let end_to_end = started.elapsed();

        tracing::info!(
            %strategy,
            count,
            end_to_end_ms = end_to_end.as_secs_f64() * 1_000.0,
            processing_ms = batch.total_processing_time_ms,
            "strategy run completed"
        );

        Ok(StrategyRun {
            strategy,
            batch,
            end_to_end,
        })
    }

    /// Runs the direct strategy, then the worker strategy, over the same count.
    pub async fn compare(&mut self, count: usize) -> Result<Comparison> {
        let direct = self.measure(Strategy::Direct, count).await?;
        let worker = self.measure(Strategy::Worker, count).await?;
        let comparison = Comparison { direct, worker };

        tracing::info!(
            count,
            difference_ms = comparison.difference_ms(),
            percentage = comparison.percentage(),
            faster = %comparison.faster(),
            "comparison completed"
        );

        Ok(comparison)
    }

    pub fn shutdown(&mut self) {
        self.pool.terminate();
    }

    fn check_request_count(&self, count: usize) -> Result<()> {
        let max = self.config.max_request_count();
        if count == 0 || count > max {
            return Err(BenchError::InvalidRequestCount { count, max }.into());
        }
        Ok(())
    }
}
