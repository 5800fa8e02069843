//! Unit tests for metrics.rs module

use std::time::Duration;
use txn_dashboard::metrics::{names, MetricsCollector};

#[test]
fn test_metrics_collector_default() {
    let collector = MetricsCollector::default();
    assert_eq!(collector.rows_loaded_total, 0);
    assert_eq!(collector.aggregations_total, 0);
    assert_eq!(collector.filtered_rows_total, 0);
    assert_eq!(collector.exports_total, 0);
    assert_eq!(collector.export_files_total, 0);
    assert_eq!(collector.errors_total, 0);
}

#[test]
fn test_metrics_initialization() {
    // The only test in this binary that installs a recorder
    assert!(MetricsCollector::init().is_ok());
    assert!(MetricsCollector::init().is_err());
}

#[test]
fn test_record_load() {
    let mut collector = MetricsCollector::default();
    collector.record_load(1200, Duration::from_millis(40));
    collector.record_load(300, Duration::from_millis(10));
    assert_eq!(collector.rows_loaded_total, 1500);
}

#[test]
fn test_record_aggregation() {
    let mut collector = MetricsCollector::default();
    collector.record_aggregation(50, Duration::from_millis(2));
    collector.record_aggregation(0, Duration::from_millis(1));

    assert_eq!(collector.aggregations_total, 2);
    assert_eq!(collector.filtered_rows_total, 50);
    assert_eq!(collector.errors_total, 0);
}

#[test]
fn test_record_export() {
    let mut collector = MetricsCollector::default();
    collector.record_export("json", 1);
    collector.record_export("csv", 9);

    assert_eq!(collector.exports_total, 2);
    assert_eq!(collector.export_files_total, 10);
}

#[test]
fn test_record_error() {
    let mut collector = MetricsCollector::default();
    collector.record_error("filter_value", "refresh");
    collector.record_error("io", "export");
    assert_eq!(collector.errors_total, 2);
}

#[test]
fn test_metric_names_share_prefix() {
    for name in [
        names::ROWS_LOADED_TOTAL,
        names::LOAD_DURATION,
        names::AGGREGATIONS_TOTAL,
        names::AGGREGATION_DURATION,
        names::FILTERED_ROWS,
        names::EXPORTS_TOTAL,
        names::ERRORS_TOTAL,
    ] {
        assert!(name.starts_with("txn_dashboard_"), "{name}");
    }
}
