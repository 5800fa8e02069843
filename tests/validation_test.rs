//! Unit tests for validation.rs module

use std::fs;
use std::path::Path;
use tempfile::tempdir;
use txn_dashboard::config::FilterPolicy;
use txn_dashboard::models::{FilterOptions, FilterSpec};
use txn_dashboard::validation::InputValidator;
use txn_dashboard::DashboardError;

fn options() -> FilterOptions {
    FilterOptions {
        categories: vec!["Apparel".to_string(), "Office".to_string()],
        locations: vec!["Chicago".to_string(), "New York".to_string()],
    }
}

#[test]
fn test_validate_filter_known_values_strict() {
    let filter = FilterSpec::new(["Apparel"], ["New York"]);
    assert!(InputValidator::validate_filter(&filter, &options(), FilterPolicy::Strict).is_ok());
}

#[test]
fn test_validate_filter_empty_strict() {
    let filter = FilterSpec::default();
    assert!(InputValidator::validate_filter(&filter, &options(), FilterPolicy::Strict).is_ok());
}

#[test]
fn test_validate_filter_unknown_lenient() {
    let filter = FilterSpec::new(["Toys"], ["Atlantis"]);
    assert!(InputValidator::validate_filter(&filter, &options(), FilterPolicy::Lenient).is_ok());
}

#[test]
fn test_validate_filter_unknown_category_strict() {
    let filter = FilterSpec::new(["Apparel", "Toys"], []);
    let err = InputValidator::validate_filter(&filter, &options(), FilterPolicy::Strict).unwrap_err();

    match err {
        DashboardError::FilterValue(msg) => {
            assert!(msg.contains("Toys"));
            assert!(!msg.contains("Apparel"));
            assert!(!msg.contains("locations"));
        }
        other => panic!("expected FilterValue, got {other:?}"),
    }
}

#[test]
fn test_validate_filter_unknown_location_strict() {
    let filter = FilterSpec::new([], ["Atlantis"]);
    let err = InputValidator::validate_filter(&filter, &options(), FilterPolicy::Strict).unwrap_err();
    assert!(err.to_string().contains("Atlantis"));
}

#[test]
fn test_validate_filter_is_case_sensitive() {
    let filter = FilterSpec::new(["apparel"], []);
    assert!(InputValidator::validate_filter(&filter, &options(), FilterPolicy::Strict).is_err());
}

#[test]
fn test_validate_data_path_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transactions.csv");
    fs::write(&path, "Transaction_ID\n").unwrap();

    assert!(InputValidator::validate_data_path(&path).is_ok());
}

#[test]
fn test_validate_data_path_empty() {
    assert!(InputValidator::validate_data_path(Path::new("")).is_err());
}

#[test]
fn test_validate_data_path_missing() {
    let dir = tempdir().unwrap();
    let err = InputValidator::validate_data_path(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, DashboardError::DataLoad(_)));
}

#[test]
fn test_validate_data_path_directory() {
    let dir = tempdir().unwrap();
    assert!(InputValidator::validate_data_path(dir.path()).is_err());
}

#[test]
fn test_validate_page_in_range() {
    assert!(InputValidator::validate_page(0, 7).is_ok());
    assert!(InputValidator::validate_page(6, 7).is_ok());
}

#[test]
fn test_validate_page_out_of_range() {
    assert!(InputValidator::validate_page(7, 7).is_err());
    assert!(InputValidator::validate_page(1, 0).is_err());
}

#[test]
fn test_validate_first_page_of_empty_preview() {
    assert!(InputValidator::validate_page(0, 0).is_ok());
}
