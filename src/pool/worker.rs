//! One isolated worker: a dedicated OS thread driving its own current-thread
//! tokio runtime. The only way in is a task envelope over a channel, and the
//! only way out is the envelope's one-shot reply slot.

use crate::fanout::DirectFanout;
use crate::pool::protocol::{WorkerTaskRequest, WorkerTaskResponse};
use crate::remote::{CallUnit, RemoteEndpoint};
use crate::runtime::error::BenchError;
use anyhow::{Context, Result};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// What a worker hands back for one task.
#[derive(Debug)]
pub enum WorkerEvent {
    Response(WorkerTaskResponse),
    /// The task panicked inside the worker.
    Crashed { message: String },
}

pub(crate) struct WorkerEnvelope {
    request: WorkerTaskRequest,
    reply: oneshot::Sender<WorkerEvent>,
}

pub(crate) type WorkerTaskSender = mpsc::UnboundedSender<WorkerEnvelope>;
type WorkerTaskReceiver = mpsc::UnboundedReceiver<WorkerEnvelope>;

/// Caller-side handle to a running worker. Dropping it cancels the worker.
pub struct WorkerHandle {
    id: usize,
    task_tx: WorkerTaskSender,
    shutdown: CancellationToken,
    thread: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    pub(crate) fn spawn(
        id: usize,
        endpoint: Arc<dyn RemoteEndpoint>,
        processing_cost: Duration,
    ) -> Result<Self> {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let worker = Worker {
            id,
            fanout: DirectFanout::new(CallUnit::new(endpoint, processing_cost)),
            task_rx,
            shutdown: shutdown.clone(),
        };

        let thread = thread::Builder::new()
            .name(format!("fanout-worker-{id}"))
            .spawn(move || worker.run_isolated())
            .with_context(|| format!("failed to spawn worker {id}"))?;

        Ok(Self {
            id,
            task_tx,
            shutdown,
            thread: Some(thread),
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Sends one task and returns the slot its single reply will land in.
    pub fn dispatch(&self, request: WorkerTaskRequest) -> Result<oneshot::Receiver<WorkerEvent>> {
        let (reply, reply_rx) = oneshot::channel();
        self.task_tx
            .send(WorkerEnvelope { request, reply })
            .map_err(|_| BenchError::worker_runtime(self.id, "worker is no longer accepting tasks"))?;
        Ok(reply_rx)
    }

    /// Stops the worker without waiting for an in-flight task to finish.
    pub(crate) fn terminate(mut self) {
        self.shutdown.cancel();
        // Detached: a worker mid-way through a blocking processing spin exits
        // right after it.
        drop(self.thread.take());
        tracing::debug!(worker = self.id, "worker terminated");
    }

    #[cfg(test)]
    pub(crate) fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    #[cfg(test)]
    pub(crate) fn join(&mut self) -> thread::Result<()> {
        self.shutdown.cancel();
        match self.thread.take() {
            Some(thread) => thread.join(),
            None => Ok(()),
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct Worker {
    id: usize,
    fanout: DirectFanout,
    task_rx: WorkerTaskReceiver,
    shutdown: CancellationToken,
}

impl Worker {
    fn run_isolated(self) {
        let id = self.id;
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!(worker = id, error = %err, "failed to build worker runtime");
                return;
            }
        };

        runtime.block_on(self.run());
    }

    #[tracing::instrument(name = "worker", skip_all, fields(worker = self.id))]
    async fn run(mut self) {
        tracing::debug!(worker = self.id, "worker started");

        loop {
            let envelope = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                next = self.task_rx.recv() => match next {
                    Some(envelope) => envelope,
                    None => break,
                },
            };

            let WorkerEnvelope { request, reply } = envelope;
            let event = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    tracing::debug!(worker = self.id, "terminated with a task in flight");
                    break;
                }
                event = self.execute(request) => event,
            };

            if reply.send(event).is_err() {
                tracing::debug!(
                    worker = self.id,
                    "completion slot already dropped; discarding late response"
                );
            }
        }

        tracing::debug!(worker = self.id, "worker exited");
    }

    async fn execute(&self, request: WorkerTaskRequest) -> WorkerEvent {
        let count = request.count().max(1);
        let outcome = AssertUnwindSafe(self.fanout.run(count))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(batch)) => WorkerEvent::Response(WorkerTaskResponse::Success(batch)),
            Ok(Err(err)) => {
                tracing::warn!(worker = self.id, count, error = %err, "worker task failed");
                WorkerEvent::Response(WorkerTaskResponse::failure(err.to_string()))
            }
            Err(panic_payload) => {
                let message = panic_message(panic_payload.as_ref());
                tracing::error!(worker = self.id, panic = %message, "worker task panicked");
                WorkerEvent::Crashed { message }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
