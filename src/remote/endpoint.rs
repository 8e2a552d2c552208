//! The seam between the benchmark core and the endpoint being called.
//! `RemoteEndpoint` performs one request/response cycle; `EndpointFactory`
//! hands every execution context (the caller and each worker) a client of
//! its own. `HttpEndpoint` is the reqwest-backed implementation and
//! `HttpEndpointFactory` connects clients that share one set of metrics.

use crate::remote::metrics::{EndpointMetrics, EndpointMetricsSnapshot};
use crate::remote::options::HttpEndpointOptions;
use crate::runtime::error::BenchError;
use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;

pub trait RemoteEndpoint: Send + Sync + 'static {
    /// Issues one call and yields the decoded response body.
    fn call(&self) -> BoxFuture<'_, Result<Value>>;
}

pub trait EndpointFactory: Send + Sync + 'static {
    fn connect(&self) -> Result<Arc<dyn RemoteEndpoint>>;
}

impl<F> EndpointFactory for F
where
    F: Fn() -> Result<Arc<dyn RemoteEndpoint>> + Send + Sync + 'static,
{
    fn connect(&self) -> Result<Arc<dyn RemoteEndpoint>> {
        self()
    }
}

#[derive(Debug, Clone)]
pub struct HttpEndpointFactory {
    options: HttpEndpointOptions,
    metrics: Arc<EndpointMetrics>,
}

impl HttpEndpointFactory {
    pub fn new(options: HttpEndpointOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            metrics: Arc::new(EndpointMetrics::default()),
        })
    }

    /// Totals across every client this factory has connected.
    pub fn metrics(&self) -> EndpointMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl EndpointFactory for HttpEndpointFactory {
    fn connect(&self) -> Result<Arc<dyn RemoteEndpoint>> {
        let endpoint = HttpEndpoint::with_metrics(self.options.clone(), self.metrics.clone())?;
        Ok(Arc::new(endpoint))
    }
}

#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    url: Arc<String>,
    client: reqwest::Client,
    metrics: Arc<EndpointMetrics>,
}

impl HttpEndpoint {
    pub fn new(options: HttpEndpointOptions) -> Result<Self> {
        Self::with_metrics(options, Arc::new(EndpointMetrics::default()))
    }

    pub(crate) fn with_metrics(
        options: HttpEndpointOptions,
        metrics: Arc<EndpointMetrics>,
    ) -> Result<Self> {
        options.validate()?;

        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|err| anyhow!("failed to build HTTP client: {err}"))?;

        Ok(Self {
            url: Arc::new(options.url),
            client,
            metrics,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn metrics(&self) -> EndpointMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub async fn fetch(&self) -> Result<Value> {
        let start = Instant::now();
        let outcome = self.fetch_once().await;
        self.metrics.record(start.elapsed(), outcome.is_ok());
        if let Err(err) = &outcome {
            tracing::debug!(url = %self.url, error = %err, "endpoint call failed");
        }
        outcome
    }

    async fn fetch_once(&self) -> Result<Value> {
        let response = self
            .client
            .get(self.url.as_str())
            .send()
            .await
            .map_err(|err| BenchError::transport(format!("request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BenchError::http_status(status.as_u16()).into());
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|err| BenchError::transport(format!("invalid response body: {err}")))?;
        Ok(payload)
    }
}

impl RemoteEndpoint for HttpEndpoint {
    fn call(&self) -> BoxFuture<'_, Result<Value>> {
        Box::pin(self.fetch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn construction_validates_options() {
        let err = HttpEndpoint::new(HttpEndpointOptions::new("localhost:3000")).unwrap_err();
        assert!(format!("{err}").contains("http://"));
    }

    #[test]
    fn factory_validates_options_up_front() {
        let err = HttpEndpointFactory::new(HttpEndpointOptions::new("ftp://host")).unwrap_err();
        assert!(format!("{err}").contains("http:// or https://"));
    }

    #[tokio::test]
    async fn factory_clients_share_metrics() {
        let factory = HttpEndpointFactory::new(
            HttpEndpointOptions::new("http://127.0.0.1:9/api/hello")
                .with_request_timeout(Duration::from_millis(200)),
        )
        .expect("valid options");

        let first = factory.connect().expect("factory should build a client");
        let second = factory.connect().expect("factory should build a client");
        assert!(first.call().await.is_err());
        assert!(second.call().await.is_err());

        let snapshot = factory.metrics();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.total_errors, 2);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let endpoint = HttpEndpoint::new(
            HttpEndpointOptions::new("http://127.0.0.1:9/api/hello")
                .with_request_timeout(Duration::from_millis(200)),
        )
        .expect("client should build");

        let err = endpoint.fetch().await.expect_err("nothing listens on port 9");
        assert!(matches!(
            err.downcast_ref::<BenchError>(),
            Some(BenchError::Transport { status: None, .. })
        ));
        assert_eq!(endpoint.metrics().total_errors, 1);
    }
}
