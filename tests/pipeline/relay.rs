use std::time::Duration;

use crate::support::{helpers::init_tracing, status_server::StatusServer};
use anyhow::Result;
use fanout_bench::{BenchError, HttpEndpoint, HttpEndpointOptions, RelayServer};
use hyper::StatusCode;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn http_endpoint_reads_relay_payload() -> Result<()> {
    init_tracing();
    let relay = RelayServer::start(([127, 0, 0, 1], 0).into(), Duration::from_millis(10)).await?;
    let endpoint = HttpEndpoint::new(HttpEndpointOptions::new(relay.url()))?;

    for _ in 0..3 {
        let payload = endpoint.fetch().await?;
        assert_eq!(payload["message"], "Hello, World!");
    }

    let metrics = endpoint.metrics();
    assert_eq!(metrics.total_requests, 3);
    assert_eq!(metrics.total_errors, 0);
    assert!(metrics.average_latency_ms >= 10.0);

    relay.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn relay_sends_cors_headers_and_rejects_unknown_paths() -> Result<()> {
    init_tracing();
    let relay = RelayServer::start(([127, 0, 0, 1], 0).into(), Duration::ZERO).await?;
    let client = reqwest::Client::new();

    let hello = client.get(relay.url()).send().await?;
    assert_eq!(hello.status().as_u16(), 200);
    assert_eq!(hello.headers()["access-control-allow-origin"], "*");

    let preflight = client
        .request(reqwest::Method::OPTIONS, relay.url())
        .send()
        .await?;
    assert_eq!(preflight.status().as_u16(), 200);

    let missing = client
        .get(format!("http://{}/index.html", relay.local_addr()))
        .send()
        .await?;
    assert_eq!(missing.status().as_u16(), 404);

    relay.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn non_success_status_is_a_transport_error() -> Result<()> {
    init_tracing();
    let server = StatusServer::start(StatusCode::SERVICE_UNAVAILABLE).await?;
    let endpoint = HttpEndpoint::new(HttpEndpointOptions::new(server.url()))?;

    let err = endpoint.fetch().await.expect_err("503 must fail the call");
    assert_eq!(err.to_string(), "HTTP error! Status: 503");
    assert!(matches!(
        err.downcast_ref::<BenchError>(),
        Some(BenchError::Transport {
            status: Some(503),
            ..
        })
    ));
    assert_eq!(endpoint.metrics().total_errors, 1);

    server.shutdown().await;
    Ok(())
}
