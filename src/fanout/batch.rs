use crate::remote::CallResult;
use serde::{Deserialize, Serialize};

/// Output of any fan-out. `total_processing_time_ms` is the sum of the
/// constituent processing times, never wall-clock time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<CallResult>,
    #[serde(rename = "totalProcessingTime")]
    pub total_processing_time_ms: f64,
}

impl BatchResult {
    pub fn from_results(results: Vec<CallResult>) -> Self {
        let total_processing_time_ms = results.iter().map(|r| r.processing_time_ms).sum();
        Self {
            results,
            total_processing_time_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Folds one worker's sub-batch into the aggregate.
    pub(crate) fn absorb(&mut self, results: Vec<CallResult>, total_processing_time_ms: f64) {
        self.results.extend(results);
        self.total_processing_time_ms += total_processing_time_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(ms: f64) -> CallResult {
        CallResult {
            payload: json!({"message": "Hello, World!"}),
            processing_time_ms: ms,
        }
    }

    #[test]
    fn sums_processing_times() {
        let batch = BatchResult::from_results(vec![call(100.0), call(101.5), call(99.5)]);
        assert_eq!(batch.len(), 3);
        assert!((batch.total_processing_time_ms - 301.0).abs() < 1e-9);
    }

    #[test]
    fn absorb_appends_in_arrival_order() {
        let mut aggregate = BatchResult::default();
        assert!(aggregate.is_empty());
        aggregate.absorb(vec![call(1.0)], 1.0);
        aggregate.absorb(vec![call(2.0), call(3.0)], 5.0);
        let times: Vec<f64> = aggregate
            .results
            .iter()
            .map(|r| r.processing_time_ms)
            .collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
        assert!((aggregate.total_processing_time_ms - 6.0).abs() < 1e-9);
    }
}
