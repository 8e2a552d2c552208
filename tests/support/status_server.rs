use std::convert::Infallible;

use anyhow::{Context, Result};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Response, Server, StatusCode};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Answers every request with the same status and an empty body.
pub struct StatusServer {
    url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl StatusServer {
    pub async fn start(status: StatusCode) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind status listener")?;
        let addr = listener
            .local_addr()
            .context("failed to read status listener address")?;
        let std_listener = listener
            .into_std()
            .context("failed to convert status listener")?;
        std_listener
            .set_nonblocking(true)
            .context("failed to set status listener non-blocking")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let make_service = make_service_fn(move |_| async move {
            Ok::<_, Infallible>(service_fn(move |_req| async move {
                let mut response = Response::new(Body::empty());
                *response.status_mut() = status;
                Ok::<_, Infallible>(response)
            }))
        });

        let server = Server::from_tcp(std_listener)
            .context("failed to build status HTTP server")?
            .serve(make_service);
        let graceful = server.with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        let handle = tokio::spawn(async move {
            if let Err(err) = graceful.await {
                eprintln!("status server stopped: {err}");
            }
        });

        Ok(Self {
            url: format!("http://{addr}/api/hello"),
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}
