//! START/END/REPORT log lines
//!
//! Formats match the managed runtime byte for byte; tooling greps for them.

use std::time::Duration;

/// Figures printed on the REPORT line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportMetrics {
    pub duration_ms: u128,
    pub billed_duration_ms: u128,
    pub memory_size_mb: u32,
    pub max_memory_used_mb: u64,
}

impl ReportMetrics {
    /// Billed duration is the measured duration; no rounding is applied
    pub fn new(duration: Duration, memory_size_mb: u32, max_memory_used_mb: u64) -> Self {
        let duration_ms = duration.as_millis();
        Self {
            duration_ms,
            billed_duration_ms: duration_ms,
            memory_size_mb,
            max_memory_used_mb,
        }
    }
}

pub fn start_line(request_id: &str, function_version: &str) -> String {
    format!("START RequestId: {request_id} Version: {function_version}")
}

pub fn end_line(request_id: &str) -> String {
    format!("END  RequestId: {request_id}")
}

pub fn report_line(request_id: &str, metrics: &ReportMetrics) -> String {
    format!(
        "REPORT RequestId {}\tDuration: {} ms\tBilled Duration: {} ms\tMemory Size {} MB\tMax Memory Used: {} MB",
        request_id,
        metrics.duration_ms,
        metrics.billed_duration_ms,
        metrics.memory_size_mb,
        metrics.max_memory_used_mb
    )
}
