use std::time::Duration;

use anyhow::Result;
use fanout_bench::{BatchResult, BenchConfig, Benchmark};
use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static TRACING_SUBSCRIBER: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
});

pub fn init_tracing() {
    Lazy::force(&TRACING_SUBSCRIBER);
}

/// Benchmark against `url` with a short processing cost so tests stay quick.
pub fn benchmark_for(url: &str, pool_size: usize) -> Result<Benchmark> {
    let config = BenchConfig::builder()
        .endpoint_url(url)
        .request_timeout(Duration::from_secs(5))
        .processing_cost(Duration::from_millis(5))
        .pool_size(pool_size)
        .build()?;
    Benchmark::new(config)
}

pub fn assert_all_hello(batch: &BatchResult) {
    for (index, result) in batch.results.iter().enumerate() {
        assert_eq!(
            result.payload["message"], "Hello, World!",
            "result {index} carried an unexpected payload"
        );
        assert!(
            result.processing_time_ms >= 5.0,
            "result {index} skipped the processing cost"
        );
    }
}
