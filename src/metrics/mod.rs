//! Metrics Module
//!
//! Records the outcome of every dispatched operation: a bounded history of
//! executions plus running per-operation aggregates.

mod collector;
mod record;
mod stats;


pub use collector::{MetricsCollector, MetricsExport, MetricsSummary};
pub use record::ExecutionRecord;
pub use stats::{OperationStats, OperationStatsView};

// == Public Constants ==
/// Default number of executions kept in history
pub const DEFAULT_MAX_HISTORY: usize = 1000;

/// Executions slower than this appear in the export's slow list
pub const SLOW_THRESHOLD_MS: f64 = 1000.0;
