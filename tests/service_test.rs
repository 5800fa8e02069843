//! Integration tests for the dashboard service

mod common;

use common::{base, csv_text, example_dataset};
use std::fs;
use tempfile::tempdir;
use txn_dashboard::config::{AppConfig, FilterPolicy};
use txn_dashboard::export::ExportFormat;
use txn_dashboard::loader::RawTransaction;
use txn_dashboard::{DashboardError, DashboardService, FilterSpec};

fn strict_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.dashboard.filter_policy = FilterPolicy::Strict;
    config
}

#[test]
fn test_load_from_configured_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transactions.csv");
    let rows: Vec<RawTransaction> = (0..4)
        .map(|i| RawTransaction {
            customer_id: format!("c{i}"),
            ..base()
        })
        .collect();
    fs::write(&path, csv_text(&rows)).unwrap();

    let mut config = AppConfig::default();
    config.data.path = path.display().to_string();
    let service = DashboardService::load(&config).unwrap();

    assert_eq!(service.dataset().len(), 4);
    assert_eq!(service.kpis().total_customers, 4);
    assert_eq!(service.metrics().rows_loaded_total, 4);
    assert_eq!(service.filter_options().locations, vec!["Chicago"]);
}

#[test]
fn test_load_missing_path_fails() {
    let dir = tempdir().unwrap();
    let mut config = AppConfig::default();
    config.data.path = dir.path().join("missing.csv").display().to_string();

    let result = DashboardService::load(&config);
    assert!(matches!(result, Err(DashboardError::DataLoad(_))));
}

#[test]
fn test_refresh_counts_aggregations() {
    let mut service = DashboardService::new(example_dataset(), &AppConfig::default());

    let all = service.refresh(&FilterSpec::default()).unwrap();
    let only_a = service.refresh(&FilterSpec::new(["A"], [])).unwrap();

    assert_eq!(all.preview.matched_rows, 3);
    assert_eq!(only_a.preview.matched_rows, 2);
    assert_eq!(service.metrics().aggregations_total, 2);
    assert_eq!(service.metrics().filtered_rows_total, 5);
}

#[test]
fn test_kpis_ignore_filters() {
    let mut service = DashboardService::new(example_dataset(), &AppConfig::default());
    let before = service.kpis().clone();
    service.refresh(&FilterSpec::new(["B"], [])).unwrap();
    assert_eq!(service.kpis(), &before);
}

#[test]
fn test_lenient_policy_accepts_unknown_values() {
    let mut service = DashboardService::new(example_dataset(), &AppConfig::default());
    let bundle = service.refresh(&FilterSpec::new(["Z"], [])).unwrap();

    assert_eq!(bundle.preview.matched_rows, 0);
    assert_eq!(service.metrics().errors_total, 0);
}

#[test]
fn test_strict_policy_rejects_unknown_values() {
    let mut service = DashboardService::new(example_dataset(), &strict_config());
    let result = service.refresh(&FilterSpec::new(["Z"], []));

    assert!(matches!(result, Err(DashboardError::FilterValue(_))));
    assert_eq!(service.metrics().errors_total, 1);
    assert_eq!(service.metrics().aggregations_total, 0);

    assert!(service.refresh(&FilterSpec::new(["A"], ["Chicago"])).is_ok());
}

#[test]
fn test_export_records_metrics() {
    let mut service = DashboardService::new(example_dataset(), &AppConfig::default());
    let dir = tempdir().unwrap();

    let files = service
        .export(&FilterSpec::default(), ExportFormat::Csv, dir.path(), "run")
        .unwrap();

    assert_eq!(files.len(), 9);
    assert_eq!(service.metrics().exports_total, 1);
    assert_eq!(service.metrics().export_files_total, 9);
    assert_eq!(service.metrics().aggregations_total, 1);
}

#[test]
fn test_export_with_rejected_filter_writes_nothing() {
    let mut service = DashboardService::new(example_dataset(), &strict_config());
    let dir = tempdir().unwrap();

    let result = service.export(&FilterSpec::new([], ["Atlantis"]), ExportFormat::Json, dir.path(), "run");

    assert!(result.is_err());
    assert!(!dir.path().join("run").exists());
    assert_eq!(service.metrics().exports_total, 0);
}

fn numbered_rows(count: usize) -> txn_dashboard::Dataset {
    common::dataset(
        (0..count)
            .map(|i| RawTransaction {
                transaction_id: i.to_string(),
                ..base()
            })
            .collect(),
    )
}

#[test]
fn test_preview_page_uses_configured_page_size() {
    let mut config = AppConfig::default();
    config.dashboard.page_size = 15;
    let mut service = DashboardService::new(numbered_rows(40), &config);

    let page = service.preview_page(&FilterSpec::default(), 2).unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.page_count, 3);
    assert_eq!(page.matched_rows, 40);
    assert_eq!(page.rows.len(), 10);
    assert_eq!(page.rows[0].transaction_id, "30");
}

#[test]
fn test_preview_page_past_the_end_is_rejected() {
    let mut service = DashboardService::new(numbered_rows(40), &AppConfig::default());

    let result = service.preview_page(&FilterSpec::default(), 3);
    assert!(matches!(result, Err(DashboardError::FilterValue(_))));
    assert_eq!(service.metrics().errors_total, 1);
}

#[test]
fn test_first_preview_page_of_unmatched_filter_is_empty() {
    let mut service = DashboardService::new(numbered_rows(5), &AppConfig::default());

    let page = service.preview_page(&FilterSpec::new(["Nope"], []), 0).unwrap();
    assert_eq!(page.page_count, 0);
    assert_eq!(page.matched_rows, 0);
    assert!(page.rows.is_empty());
}

#[test]
fn test_preview_pages_stop_at_preview_limit() {
    let mut service = DashboardService::new(numbered_rows(250), &AppConfig::default());

    // 100 preview rows at 15 per page
    let last = service.preview_page(&FilterSpec::default(), 6).unwrap();
    assert_eq!(last.page_count, 7);
    assert_eq!(last.matched_rows, 250);
    assert_eq!(last.rows.len(), 10);
    assert!(service.preview_page(&FilterSpec::default(), 7).is_err());
}
