use anyhow::Result;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Metric names emitted through the `metrics` facade
pub mod names {
    /// Rows accepted by the loader
    pub const ROWS_LOADED_TOTAL: &str = "txn_dashboard_rows_loaded_total";
    /// Dataset load duration
    pub const LOAD_DURATION: &str = "txn_dashboard_load_duration_seconds";
    /// Completed aggregation calls
    pub const AGGREGATIONS_TOTAL: &str = "txn_dashboard_aggregations_total";
    /// Aggregation duration
    pub const AGGREGATION_DURATION: &str = "txn_dashboard_aggregation_duration_seconds";
    /// Rows matched by each aggregation's filter
    pub const FILTERED_ROWS: &str = "txn_dashboard_filtered_rows";
    /// Export operations
    pub const EXPORTS_TOTAL: &str = "txn_dashboard_exports_total";
    /// Failures by kind and operation
    pub const ERRORS_TOTAL: &str = "txn_dashboard_errors_total";
}

/// Metrics collection and management.
///
/// Every record call is forwarded to the global `metrics` recorder and also
/// tallied locally so hosts and tests can read totals without a recorder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsCollector {
    /// Rows loaded across all loads
    pub rows_loaded_total: u64,
    /// Aggregation calls that produced a bundle
    pub aggregations_total: u64,
    /// Rows matched across all aggregation calls
    pub filtered_rows_total: u64,
    /// Export operations
    pub exports_total: u64,
    /// Files written by exports
    pub export_files_total: u64,
    /// Recorded failures
    pub errors_total: u64,
}

impl MetricsCollector {
    /// Initialize metrics collection
    pub fn init() -> Result<()> {
        // Hosts that export metrics install their own recorder before this
        metrics::set_global_recorder(metrics::NoopRecorder)
            .map_err(|_| anyhow::anyhow!("Failed to initialize metrics recorder: already set"))?;
        Self::describe();
        Ok(())
    }

    /// Register descriptions with the installed recorder
    pub fn describe() {
        describe_counter!(names::ROWS_LOADED_TOTAL, "Transaction rows accepted by the loader");
        describe_histogram!(names::LOAD_DURATION, "Dataset load duration in seconds");
        describe_counter!(names::AGGREGATIONS_TOTAL, "Completed dashboard aggregations");
        describe_histogram!(names::AGGREGATION_DURATION, "Aggregation duration in seconds");
        describe_histogram!(names::FILTERED_ROWS, "Rows matched by the dashboard filter");
        describe_counter!(names::EXPORTS_TOTAL, "Dashboard exports written");
        describe_counter!(names::ERRORS_TOTAL, "Failures by kind and operation");
    }

    /// Record a completed dataset load
    pub fn record_load(&mut self, rows: usize, duration: Duration) {
        self.rows_loaded_total += rows as u64;

        counter!(names::ROWS_LOADED_TOTAL).increment(rows as u64);
        histogram!(names::LOAD_DURATION).record(duration.as_secs_f64());
    }

    /// Record a completed aggregation over `filtered_rows` matching rows
    pub fn record_aggregation(&mut self, filtered_rows: usize, duration: Duration) {
        self.aggregations_total += 1;
        self.filtered_rows_total += filtered_rows as u64;

        counter!(names::AGGREGATIONS_TOTAL).increment(1);
        histogram!(names::AGGREGATION_DURATION).record(duration.as_secs_f64());
        histogram!(names::FILTERED_ROWS).record(filtered_rows as f64);
    }

    /// Record an export in `format` that wrote `file_count` files
    pub fn record_export(&mut self, format: &'static str, file_count: usize) {
        self.exports_total += 1;
        self.export_files_total += file_count as u64;

        counter!(names::EXPORTS_TOTAL, "format" => format).increment(1);
    }

    /// Record error metrics
    pub fn record_error(&mut self, error_type: &'static str, operation: &'static str) {
        self.errors_total += 1;

        counter!(names::ERRORS_TOTAL, "type" => error_type, "operation" => operation).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::default();
        assert_eq!(collector.aggregations_total, 0);
        assert_eq!(names::AGGREGATIONS_TOTAL, "txn_dashboard_aggregations_total");
    }

    #[test]
    fn test_recording_without_recorder() {
        // With no recorder installed the facade calls are no-ops
        let mut collector = MetricsCollector::default();
        collector.record_load(10, Duration::from_millis(3));
        collector.record_aggregation(4, Duration::from_millis(1));
        assert_eq!(collector.rows_loaded_total, 10);
        assert_eq!(collector.filtered_rows_total, 4);
    }
}
