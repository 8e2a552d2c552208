//! Failure taxonomy shared by the call unit, the worker pool, and both fan-out
//! strategies. Every variant travels inside `anyhow::Error` untouched so the
//! top-level caller can `downcast_ref::<BenchError>()` and render it.

#[derive(Debug, Clone, PartialEq)]
pub enum BenchError {
    /// The endpoint answered with a non-success status, or the call itself failed.
    Transport {
        status: Option<u16>,
        message: String,
    },
    /// A worker crashed or stopped outside the task protocol.
    WorkerRuntime { worker: usize, message: String },
    /// Pool access past the live worker range.
    IndexOutOfRange { index: usize, size: usize },
    /// A worker reported a failure, which aborts the whole distributed batch.
    AggregationAbort { worker: usize, message: String },
    InvalidRequestCount { count: usize, max: usize },
}

impl BenchError {
    pub fn http_status(status: u16) -> Self {
        BenchError::Transport {
            status: Some(status),
            message: format!("HTTP error! Status: {status}"),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        BenchError::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn worker_runtime(worker: usize, message: impl Into<String>) -> Self {
        BenchError::WorkerRuntime {
            worker,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for BenchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenchError::Transport { message, .. } => write!(f, "{message}"),
            BenchError::WorkerRuntime { message, .. } => write!(f, "worker error: {message}"),
            BenchError::IndexOutOfRange { index, size } => {
                write!(f, "worker index {index} is out of bounds (pool size {size})")
            }
            BenchError::AggregationAbort { message, .. } => write!(f, "{message}"),
            BenchError::InvalidRequestCount { count, max } => {
                write!(f, "request count {count} must be between 1 and {max}")
            }
        }
    }
}

impl std::error::Error for BenchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_abort_keeps_worker_message_verbatim() {
        let err = BenchError::AggregationAbort {
            worker: 2,
            message: "HTTP error! Status: 503".into(),
        };
        assert_eq!(err.to_string(), "HTTP error! Status: 503");
    }

    #[test]
    fn status_errors_render_like_http_failures() {
        let err = BenchError::http_status(404);
        assert_eq!(err.to_string(), "HTTP error! Status: 404");
        assert!(matches!(
            err,
            BenchError::Transport {
                status: Some(404),
                ..
            }
        ));
    }

    #[test]
    fn survives_anyhow_round_trip() {
        let err: anyhow::Error = BenchError::worker_runtime(1, "thread exited").into();
        assert_eq!(format!("{err}"), "worker error: thread exited");
        assert!(matches!(
            err.downcast_ref::<BenchError>(),
            Some(BenchError::WorkerRuntime { worker: 1, .. })
        ));
    }
}
