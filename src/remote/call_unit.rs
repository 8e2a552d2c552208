use crate::remote::endpoint::RemoteEndpoint;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of one call: the response body plus the measured synthetic
/// processing time (not the network latency).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    #[serde(rename = "data")]
    pub payload: Value,
    #[serde(rename = "processingTime")]
    pub processing_time_ms: f64,
}

/// Performs one endpoint call followed by a fixed, blocking processing cost.
///
/// The processing cost spins on the calling thread and never yields to the
/// executor. It must stay blocking.
#[derive(Clone)]
pub struct CallUnit {
    endpoint: Arc<dyn RemoteEndpoint>,
    processing_cost: Duration,
}

impl CallUnit {
    pub fn new(endpoint: Arc<dyn RemoteEndpoint>, processing_cost: Duration) -> Self {
        Self {
            endpoint,
            processing_cost,
        }
    }

    pub fn processing_cost(&self) -> Duration {
        self.processing_cost
    }

    pub async fn invoke(&self) -> Result<CallResult> {
        let payload = self.endpoint.call().await?;
        let processing_time_ms = busy_wait(self.processing_cost);
        Ok(CallResult {
            payload,
            processing_time_ms,
        })
    }
}

/// Spins until `cost` has elapsed and returns the measured duration in ms.
pub(crate) fn busy_wait(cost: Duration) -> f64 {
    let start = Instant::now();
    while start.elapsed() < cost {
        std::hint::spin_loop();
    }
    start.elapsed().as_secs_f64() * 1_000.0
}
