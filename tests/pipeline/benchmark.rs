use std::time::Duration;

use crate::support::{
    helpers::{assert_all_hello, benchmark_for, init_tracing},
    status_server::StatusServer,
};
use anyhow::Result;
use fanout_bench::{BenchError, RelayServer, Strategy};
use hyper::StatusCode;
use tokio::time::timeout;

async fn start_relay() -> Result<RelayServer> {
    RelayServer::start(([127, 0, 0, 1], 0).into(), Duration::from_millis(10)).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn direct_strategy_end_to_end() -> Result<()> {
    init_tracing();
    let relay = start_relay().await?;
    let bench = benchmark_for(&relay.url(), 3)?;

    let batch = bench.run_direct(8).await?;
    assert_eq!(batch.len(), 8);
    assert_all_hello(&batch);
    assert!(batch.total_processing_time_ms >= 40.0);
    assert!(!bench.pool().is_live());

    relay.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_strategy_end_to_end() -> Result<()> {
    init_tracing();
    let relay = start_relay().await?;
    let mut bench = benchmark_for(&relay.url(), 4)?;

    let batch = bench.run_distributed(10).await?;
    assert_eq!(batch.len(), 10);
    assert_all_hello(&batch);
    assert_eq!(bench.pool().len(), 4);

    // Fewer requests than workers still resolves.
    bench.configure_pool_size(5)?;
    let batch = timeout(Duration::from_secs(10), bench.run_distributed(3)).await??;
    assert_eq!(batch.len(), 3);

    let snapshot = bench.telemetry().snapshot();
    assert_eq!(snapshot.distributed_runs, 2);
    assert_eq!(snapshot.calls_completed, 13);
    assert_eq!(snapshot.worker_pool_size, 5);

    bench.shutdown();
    assert!(!bench.pool().is_live());
    relay.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn comparison_measures_both_strategies() -> Result<()> {
    init_tracing();
    let relay = start_relay().await?;
    let mut bench = benchmark_for(&relay.url(), 4)?;

    let comparison = bench.compare(12).await?;
    assert_eq!(comparison.direct.strategy, Strategy::Direct);
    assert_eq!(comparison.worker.strategy, Strategy::Worker);
    assert_eq!(comparison.direct.request_count(), 12);
    assert_eq!(comparison.worker.request_count(), 12);
    assert!(comparison.direct.end_to_end >= Duration::from_millis(10));
    assert!(comparison.percentage() >= 0.0);

    let run = bench.measure(Strategy::Worker, 4).await?;
    assert_eq!(run.request_count(), 4);

    let metrics = bench
        .endpoint_metrics()
        .expect("HTTP benchmarks report endpoint metrics");
    assert_eq!(metrics.total_requests, 28);
    assert_eq!(metrics.total_errors, 0);
    assert!(metrics.max_latency_ms >= metrics.average_latency_ms);

    bench.shutdown();
    relay.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_endpoint_aborts_both_strategies() -> Result<()> {
    init_tracing();
    let server = StatusServer::start(StatusCode::INTERNAL_SERVER_ERROR).await?;
    let mut bench = benchmark_for(server.url(), 3)?;

    let err = bench.run_direct(4).await.expect_err("direct must fail");
    assert_eq!(err.to_string(), "HTTP error! Status: 500");

    let err = bench
        .run_distributed(6)
        .await
        .expect_err("distributed must fail");
    assert_eq!(err.to_string(), "HTTP error! Status: 500");
    assert!(matches!(
        err.downcast_ref::<BenchError>(),
        Some(BenchError::AggregationAbort { .. })
    ));
    assert_eq!(bench.telemetry().snapshot().failed_runs, 2);

    bench.shutdown();
    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn request_counts_above_the_cap_are_rejected() -> Result<()> {
    init_tracing();
    let mut bench = benchmark_for("http://127.0.0.1:9/api/hello", 2)?;

    let err = bench.run_distributed(51).await.expect_err("51 exceeds the cap");
    assert_eq!(err.to_string(), "request count 51 must be between 1 and 50");
    assert!(!bench.pool().is_live());
    Ok(())
}
