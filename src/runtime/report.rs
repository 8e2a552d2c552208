use crate::fanout::BatchResult;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Every call runs concurrently on the caller's own runtime.
    Direct,
    /// Calls are partitioned across the worker pool.
    Worker,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Worker => "worker",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "direct" | "main" => Ok(Strategy::Direct),
            "worker" | "workers" | "distributed" => Ok(Strategy::Worker),
            other => Err(anyhow::anyhow!("unknown strategy '{other}'")),
        }
    }
}

/// One timed strategy execution.
#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub strategy: Strategy,
    pub batch: BatchResult,
    /// Wall-clock time from dispatch until the batch resolved.
    pub end_to_end: Duration,
}

impl StrategyRun {
    pub fn end_to_end_ms(&self) -> f64 {
        self.end_to_end.as_secs_f64() * 1_000.0
    }

    pub fn request_count(&self) -> usize {
        self.batch.len()
    }
}

/// Direct and worker runs over the same request count, taken back to back.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub direct: StrategyRun,
    pub worker: StrategyRun,
}

impl Comparison {
    /// Direct end-to-end time minus worker end-to-end time. Positive when the
    /// worker strategy finished first.
    pub fn difference_ms(&self) -> f64 {
        self.direct.end_to_end_ms() - self.worker.end_to_end_ms()
    }

    /// Absolute difference as a share of the direct time, in percent.
    pub fn percentage(&self) -> f64 {
        let direct = self.direct.end_to_end_ms();
        if direct <= 0.0 {
            return 0.0;
        }
        self.difference_ms().abs() / direct * 100.0
    }

    pub fn faster(&self) -> Strategy {
        if self.difference_ms() > 0.0 {
            Strategy::Worker
        } else {
            Strategy::Direct
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "direct {:.2}ms, worker {:.2}ms: {} is faster by {:.2}ms ({:.1}%)",
            self.direct.end_to_end_ms(),
            self.worker.end_to_end_ms(),
            self.faster(),
            self.difference_ms().abs(),
            self.percentage()
        )
    }
}
