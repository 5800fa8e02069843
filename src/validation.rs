use crate::config::FilterPolicy;
use crate::error::{DashboardError, Result};
use crate::models::{FilterOptions, FilterSpec};
use std::collections::BTreeSet;
use std::path::Path;

/// Validation utilities for filter input and data paths
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Check `filter` against the known values under `policy`.
    ///
    /// Lenient accepts anything; unknown values just match no rows. Strict
    /// rejects the filter and names every unknown value.
    pub fn validate_filter(
        filter: &FilterSpec,
        options: &FilterOptions,
        policy: FilterPolicy,
    ) -> Result<()> {
        if policy == FilterPolicy::Lenient {
            return Ok(());
        }

        let unknown_categories = unknown(&filter.categories, &options.categories);
        let unknown_locations = unknown(&filter.locations, &options.locations);
        if unknown_categories.is_empty() && unknown_locations.is_empty() {
            return Ok(());
        }

        let mut parts = Vec::new();
        if !unknown_categories.is_empty() {
            parts.push(format!("unknown categories {unknown_categories:?}"));
        }
        if !unknown_locations.is_empty() {
            parts.push(format!("unknown locations {unknown_locations:?}"));
        }
        Err(DashboardError::FilterValue(parts.join("; ")))
    }

    /// Validate the dataset path before loading
    pub fn validate_data_path(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(DashboardError::DataLoad("data path cannot be empty".to_string()));
        }

        if !path.exists() {
            return Err(DashboardError::DataLoad(format!(
                "data file does not exist: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(DashboardError::DataLoad(format!(
                "data path is not a file: {}",
                path.display()
            )));
        }

        Ok(())
    }

    /// Validate a requested preview page against the page count
    pub fn validate_page(page: usize, page_count: usize) -> Result<()> {
        // Page 0 of an empty preview is a valid, empty page
        if page == 0 || page < page_count {
            Ok(())
        } else {
            Err(DashboardError::FilterValue(format!(
                "page {page} out of range, preview has {page_count} pages"
            )))
        }
    }
}

fn unknown<'a>(requested: &'a BTreeSet<String>, known: &[String]) -> Vec<&'a str> {
    requested
        .iter()
        .filter(|value| !known.contains(*value))
        .map(String::as_str)
        .collect()
}
