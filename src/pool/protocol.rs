//! Worker Task Protocol: one request in, exactly one response out.
//!
//! Wire shapes:
//! - request `{"type": "fetchData", "requestCount": n}`
//! - success `{"success": true, "results": [...], "totalProcessingTime": ms}`
//! - failure `{"success": false, "error": "..."}`

use crate::fanout::BatchResult;
use crate::remote::CallResult;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerTaskRequest {
    #[serde(rename = "fetchData")]
    FetchData {
        #[serde(
            rename = "requestCount",
            default = "default_request_count",
            deserialize_with = "positive_request_count"
        )]
        count: usize,
    },
}

impl WorkerTaskRequest {
    pub fn fetch_data(count: usize) -> Self {
        WorkerTaskRequest::FetchData { count }
    }

    pub fn count(&self) -> usize {
        match self {
            WorkerTaskRequest::FetchData { count } => *count,
        }
    }
}

fn default_request_count() -> usize {
    1
}

fn positive_request_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let count = Option::<usize>::deserialize(deserializer)?;
    Ok(count.filter(|count| *count > 0).unwrap_or(1))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireResponse", from = "WireResponse")]
pub enum WorkerTaskResponse {
    Success(BatchResult),
    Failure { message: String },
}

impl WorkerTaskResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        WorkerTaskResponse::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WorkerTaskResponse::Success(_))
    }
}

#[derive(Serialize, Deserialize)]
struct WireResponse {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    results: Option<Vec<CallResult>>,
    #[serde(
        rename = "totalProcessingTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    total_processing_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<WorkerTaskResponse> for WireResponse {
    fn from(response: WorkerTaskResponse) -> Self {
        match response {
            WorkerTaskResponse::Success(batch) => WireResponse {
                success: true,
                results: Some(batch.results),
                total_processing_time: Some(batch.total_processing_time_ms),
                error: None,
            },
            WorkerTaskResponse::Failure { message } => WireResponse {
                success: false,
                results: None,
                total_processing_time: None,
                error: Some(message),
            },
        }
    }
}

impl From<WireResponse> for WorkerTaskResponse {
    fn from(wire: WireResponse) -> Self {
        if !wire.success {
            return WorkerTaskResponse::failure(
                wire.error
                    .unwrap_or_else(|| "worker reported an unspecified failure".to_string()),
            );
        }

        let results = wire.results.unwrap_or_default();
        match wire.total_processing_time {
            Some(total) => WorkerTaskResponse::Success(BatchResult {
                results,
                total_processing_time_ms: total,
            }),
            None => WorkerTaskResponse::Success(BatchResult::from_results(results)),
        }
    }
}
