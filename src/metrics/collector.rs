//! Metrics Collector Module
//!
//! History and aggregates live behind one lock so a reader never sees a
//! record without its aggregate update (or the reverse).

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::stats::round2;
use super::{ExecutionRecord, OperationStats, OperationStatsView, SLOW_THRESHOLD_MS};

// == Summary ==
/// Process-wide view over all recorded executions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: f64,
    /// `HH:MM:SS`
    pub uptime: String,
    pub total_executions: u64,
    pub successful_executions: u64,
    pub failed_executions: u64,
    pub success_rate_percent: f64,
    pub avg_execution_time_ms: f64,
    pub unique_operations: usize,
    pub most_used_operation: Option<String>,
    pub slowest_operation: Option<String>,
}

// == Export ==
/// Everything the collector knows, in one document.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsExport {
    pub summary: MetricsSummary,
    pub operation_stats: BTreeMap<String, OperationStatsView>,
    pub recent: Vec<ExecutionRecord>,
    pub failures: Vec<ExecutionRecord>,
    pub slow: Vec<ExecutionRecord>,
}

#[derive(Debug)]
struct Inner {
    history: VecDeque<ExecutionRecord>,
    stats: HashMap<String, OperationStats>,
    started: Instant,
    started_at: DateTime<Utc>,
}

impl Inner {
    fn new() -> Self {
        Self {
            history: VecDeque::new(),
            stats: HashMap::new(),
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Last `limit` records matching `keep`, oldest first.
    fn tail<F>(&self, limit: usize, keep: F) -> Vec<ExecutionRecord>
    where
        F: Fn(&ExecutionRecord) -> bool,
    {
        let mut out: Vec<ExecutionRecord> = self
            .history
            .iter()
            .rev()
            .filter(|r| keep(r))
            .take(limit)
            .cloned()
            .collect();
        out.reverse();
        out
    }

    fn summary(&self) -> MetricsSummary {
        let (total, successful, total_time) =
            self.stats
                .values()
                .fold((0u64, 0u64, 0.0f64), |(t, s, time), stats| {
                    (
                        t + stats.total_calls,
                        s + stats.successful_calls,
                        time + stats.total_time_ms,
                    )
                });

        let (success_rate, avg_time) = if total > 0 {
            (
                successful as f64 / total as f64 * 100.0,
                total_time / total as f64,
            )
        } else {
            (0.0, 0.0)
        };

        // ties resolve to the lexicographically smallest name
        let most_used = self
            .stats
            .iter()
            .max_by(|a, b| a.1.total_calls.cmp(&b.1.total_calls).then(b.0.cmp(a.0)))
            .map(|(name, _)| name.clone());
        let slowest = self
            .stats
            .iter()
            .max_by(|a, b| {
                a.1.avg_time_ms()
                    .total_cmp(&b.1.avg_time_ms())
                    .then(b.0.cmp(a.0))
            })
            .map(|(name, _)| name.clone());

        let uptime = self.started.elapsed();
        let secs = uptime.as_secs();

        MetricsSummary {
            started_at: self.started_at,
            uptime_seconds: round2(uptime.as_secs_f64()),
            uptime: format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60),
            total_executions: total,
            successful_executions: successful,
            failed_executions: total - successful,
            success_rate_percent: round2(success_rate),
            avg_execution_time_ms: round2(avg_time),
            unique_operations: self.stats.len(),
            most_used_operation: most_used,
            slowest_operation: slowest,
        }
    }

    fn all_stats(&self) -> BTreeMap<String, OperationStatsView> {
        self.stats
            .iter()
            .map(|(name, stats)| (name.clone(), stats.view()))
            .collect()
    }
}

// == Metrics Collector ==
/// Collects execution outcomes per operation name.
#[derive(Debug)]
pub struct MetricsCollector {
    max_history: usize,
    inner: Mutex<Inner>,
}

impl MetricsCollector {
    // == Constructor ==
    pub fn new(max_history: usize) -> Self {
        info!("Metrics collector initialized (max_history={})", max_history);
        Self {
            max_history,
            inner: Mutex::new(Inner::new()),
        }
    }

    // == Record ==
    /// Appends an execution to history (dropping the oldest past capacity)
    /// and folds it into the operation's aggregate.
    pub async fn record(
        &self,
        operation: &str,
        duration_ms: f64,
        success: bool,
        error_message: Option<String>,
    ) {
        let record = ExecutionRecord::new(operation, duration_ms, success, error_message);

        {
            let mut inner = self.inner.lock().await;
            inner
                .stats
                .entry(operation.to_string())
                .or_default()
                .add(&record);
            inner.history.push_back(record.clone());
            while inner.history.len() > self.max_history {
                inner.history.pop_front();
            }
        }

        if success {
            debug!("Metric recorded: {} completed in {:.2}ms", operation, duration_ms);
        } else {
            warn!(
                "Metric recorded: {} failed after {:.2}ms - {}",
                operation,
                duration_ms,
                record.error_message.as_deref().unwrap_or("unknown error")
            );
        }
    }

    // == Operation Stats ==
    /// Aggregate for one operation; zeroed when it was never recorded.
    pub async fn operation_stats(&self, operation: &str) -> OperationStats {
        self.inner
            .lock()
            .await
            .stats
            .get(operation)
            .cloned()
            .unwrap_or_default()
    }

    // == All Stats ==
    pub async fn all_stats(&self) -> BTreeMap<String, OperationStatsView> {
        self.inner.lock().await.all_stats()
    }

    // == Recent ==
    /// Last `limit` executions, most recent last.
    pub async fn recent(&self, limit: usize) -> Vec<ExecutionRecord> {
        self.inner.lock().await.tail(limit, |_| true)
    }

    // == Failures ==
    pub async fn failures(&self, limit: usize) -> Vec<ExecutionRecord> {
        self.inner.lock().await.tail(limit, |r| !r.success)
    }

    // == Slow ==
    /// Executions strictly slower than `threshold_ms`, most recent last.
    pub async fn slow(&self, threshold_ms: f64, limit: usize) -> Vec<ExecutionRecord> {
        self.inner
            .lock()
            .await
            .tail(limit, |r| r.duration_ms > threshold_ms)
    }

    // == Summary ==
    pub async fn summary(&self) -> MetricsSummary {
        self.inner.lock().await.summary()
    }

    // == Export ==
    /// Summary, all aggregates and the recent/failed/slow views at once.
    pub async fn export(&self) -> MetricsExport {
        let inner = self.inner.lock().await;
        MetricsExport {
            summary: inner.summary(),
            operation_stats: inner.all_stats(),
            recent: inner.tail(100, |_| true),
            failures: inner.tail(50, |r| !r.success),
            slow: inner.tail(50, |r| r.duration_ms > SLOW_THRESHOLD_MS),
        }
    }

    // == Reset ==
    /// Clears history and aggregates and restarts the uptime clock.
    pub async fn reset(&self) {
        *self.inner.lock().await = Inner::new();
        info!("Metrics reset");
    }

    // == History Length ==
    pub async fn history_len(&self) -> usize {
        self.inner.lock().await.history.len()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(super::DEFAULT_MAX_HISTORY)
    }
}
