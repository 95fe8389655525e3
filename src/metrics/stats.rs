//! Operation Statistics Module
//!
//! Running aggregates per operation name.

use serde::Serialize;

use super::ExecutionRecord;

// == Operation Stats ==
/// Aggregated statistics for one operation.
///
/// `total_calls == successful_calls + failed_calls` holds after every update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationStats {
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    pub total_time_ms: f64,
    /// None until the first call
    pub min_time_ms: Option<f64>,
    pub max_time_ms: f64,
}

impl OperationStats {
    // == Add Record ==
    /// Folds one execution into the aggregate.
    pub fn add(&mut self, record: &ExecutionRecord) {
        self.total_calls += 1;
        self.total_time_ms += record.duration_ms;

        if record.success {
            self.successful_calls += 1;
        } else {
            self.failed_calls += 1;
        }

        self.min_time_ms = Some(match self.min_time_ms {
            Some(min) => min.min(record.duration_ms),
            None => record.duration_ms,
        });
        self.max_time_ms = self.max_time_ms.max(record.duration_ms);
    }

    // == Average ==
    pub fn avg_time_ms(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            self.total_time_ms / self.total_calls as f64
        }
    }

    // == Success Rate ==
    /// Percentage of successful calls, 0.0 when there were none.
    pub fn success_rate(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            self.successful_calls as f64 / self.total_calls as f64 * 100.0
        }
    }

    /// Rounded view with the derived values filled in.
    pub fn view(&self) -> OperationStatsView {
        OperationStatsView {
            total_calls: self.total_calls,
            successful_calls: self.successful_calls,
            failed_calls: self.failed_calls,
            success_rate_percent: round2(self.success_rate()),
            avg_time_ms: round2(self.avg_time_ms()),
            min_time_ms: round2(self.min_time_ms.unwrap_or(0.0)),
            max_time_ms: round2(self.max_time_ms),
            total_time_ms: round2(self.total_time_ms),
        }
    }
}

// == Stats View ==
/// Serializable form of [`OperationStats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationStatsView {
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    pub success_rate_percent: f64,
    pub avg_time_ms: f64,
    pub min_time_ms: f64,
    pub max_time_ms: f64,
    pub total_time_ms: f64,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
