//! Execution Record Module

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Execution Record ==
/// One recorded execution of a named operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRecord {
    pub operation: String,
    pub duration_ms: f64,
    pub success: bool,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn new(
        operation: impl Into<String>,
        duration_ms: f64,
        success: bool,
        error_message: Option<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            duration_ms,
            success,
            error_message,
            timestamp: Utc::now(),
        }
    }
}
