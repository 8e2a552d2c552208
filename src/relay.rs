//! Minimal HTTP relay answering the benchmarked endpoint.
//!
//! `GET /api/hello` replies `{"message":"Hello, World!"}` after a fixed
//! server-side delay. Every response carries permissive CORS headers and
//! `OPTIONS` preflights are answered with an empty 200.

use anyhow::{Context, Result};
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS};
use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const HELLO_PATH: &str = "/api/hello";
pub const DEFAULT_RELAY_DELAY_MS: u64 = 10;

const ALLOWED_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept, Authorization";
const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

pub struct RelayServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RelayServer {
    /// Binds `addr` (port 0 picks a free port) and serves until [`shutdown`].
    ///
    /// [`shutdown`]: RelayServer::shutdown
    pub async fn start(addr: SocketAddr, delay: Duration) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind relay listener on {addr}"))?;
        let addr = listener
            .local_addr()
            .context("failed to read relay listener address")?;
        let std_listener = listener
            .into_std()
            .context("failed to convert relay listener")?;
        std_listener
            .set_nonblocking(true)
            .context("failed to set relay listener non-blocking")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let make_service = make_service_fn(move |_| async move {
            Ok::<_, Infallible>(service_fn(move |req| handle(req, delay)))
        });

        let server = Server::from_tcp(std_listener)
            .context("failed to build relay HTTP server")?
            .serve(make_service);
        let graceful = server.with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        let handle = tokio::spawn(async move {
            if let Err(err) = graceful.await {
                tracing::error!(error = %err, "relay server stopped");
            }
        });

        tracing::info!(%addr, delay_ms = delay.as_millis() as u64, "relay listening");

        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Full URL of the hello endpoint.
    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, HELLO_PATH)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        tracing::info!(addr = %self.addr, "relay stopped");
    }
}

impl Drop for RelayServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(req: Request<Body>, delay: Duration) -> Result<Response<Body>, Infallible> {
    let mut response = match (req.method(), req.uri().path()) {
        (&Method::OPTIONS, _) => Response::new(Body::empty()),
        (&Method::GET, HELLO_PATH) => {
            tokio::time::sleep(delay).await;
            let body = json!({ "message": "Hello, World!" }).to_string();
            let mut response = Response::new(Body::from(body));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        _ => {
            let mut response = Response::new(Body::from("Not Found"));
            *response.status_mut() = StatusCode::NOT_FOUND;
            response
        }
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );

    Ok(response)
}
