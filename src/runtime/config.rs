use crate::pool::DEFAULT_POOL_SIZE;
use crate::remote::options::{
    validate_url, HttpEndpointOptions, DEFAULT_PROCESSING_COST_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Largest request count a caller may ask either strategy for.
pub const DEFAULT_MAX_REQUEST_COUNT: usize = 50;

/// Runtime configuration for a benchmark session.
///
/// All instances must be constructed via [`BenchConfig::builder`] or [`BenchConfig::new`]
/// so invariants are validated before any consumer observes the values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    endpoint_url: String,
    request_timeout: Duration,
    processing_cost: Duration,
    pool_size: usize,
    max_request_count: usize,
}

pub struct BenchConfigParams {
    pub endpoint_url: String,
    pub request_timeout: Duration,
    pub processing_cost: Duration,
    pub pool_size: usize,
    pub max_request_count: usize,
}

impl BenchConfig {
    pub fn builder() -> BenchConfigBuilder {
        BenchConfigBuilder::default()
    }

    pub fn new(params: BenchConfigParams) -> Result<Self> {
        let BenchConfigParams {
            endpoint_url,
            request_timeout,
            processing_cost,
            pool_size,
            max_request_count,
        } = params;

        let config = Self {
            endpoint_url: endpoint_url.trim().to_owned(),
            request_timeout,
            processing_cost,
            pool_size,
            max_request_count,
        };

        config.validate()?;
        Ok(config)
    }

    /// Full URL (including scheme) of the benchmarked endpoint.
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Blocking processing cost applied after every response.
    pub fn processing_cost(&self) -> Duration {
        self.processing_cost
    }

    /// Requested worker count; the pool clamps it to `[1, 16]`.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn max_request_count(&self) -> usize {
        self.max_request_count
    }

    pub fn endpoint_options(&self) -> HttpEndpointOptions {
        HttpEndpointOptions::new(self.endpoint_url.clone())
            .with_request_timeout(self.request_timeout)
    }

    pub fn validate(&self) -> Result<()> {
        validate_url(&self.endpoint_url)?;

        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than 0");
        }

        if self.pool_size == 0 {
            bail!("pool_size must be greater than 0");
        }

        if self.max_request_count == 0 {
            bail!("max_request_count must be greater than 0");
        }

        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct BenchConfigBuilder {
    endpoint_url: Option<String>,
    request_timeout: Option<Duration>,
    processing_cost: Option<Duration>,
    pool_size: Option<usize>,
    max_request_count: Option<usize>,
}

impl BenchConfigBuilder {
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn processing_cost(mut self, cost: Duration) -> Self {
        self.processing_cost = Some(cost);
        self
    }

    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = Some(size);
        self
    }

    pub fn max_request_count(mut self, count: usize) -> Self {
        self.max_request_count = Some(count);
        self
    }

    pub fn build(self) -> Result<BenchConfig> {
        let params = BenchConfigParams {
            endpoint_url: self.endpoint_url.context("endpoint_url is required")?,
            request_timeout: self
                .request_timeout
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            processing_cost: self
                .processing_cost
                .unwrap_or_else(|| Duration::from_millis(DEFAULT_PROCESSING_COST_MS)),
            pool_size: self.pool_size.unwrap_or(DEFAULT_POOL_SIZE),
            max_request_count: self
                .max_request_count
                .unwrap_or(DEFAULT_MAX_REQUEST_COUNT),
        };

        BenchConfig::new(params)
    }
}
