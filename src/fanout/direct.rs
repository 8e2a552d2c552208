//! Concurrent fan-out on the caller's own execution context.

use crate::fanout::batch::BatchResult;
use crate::remote::CallUnit;
use anyhow::Result;
use futures::future::try_join_all;

#[derive(Clone)]
pub struct DirectFanout {
    unit: CallUnit,
}

impl DirectFanout {
    pub fn new(unit: CallUnit) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> &CallUnit {
        &self.unit
    }

    /// Issues `count` calls as one concurrent group without throttling.
    ///
    /// Results keep invocation order regardless of completion order. The first
    /// failure fails the whole batch and the other calls are dropped.
    pub async fn run(&self, count: usize) -> Result<BatchResult> {
        let calls = (0..count).map(|_| self.unit.invoke());
        let results = try_join_all(calls).await?;
        tracing::debug!(count, "direct fan-out completed");
        Ok(BatchResult::from_results(results))
    }
}
