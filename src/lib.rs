//! Transaction Dashboard - Loading and Aggregation Core
//!
//! A Rust library that loads a transaction CSV once and computes the
//! aggregates behind a filterable sales dashboard.
//!
//! # Features
//!
//! - Load and normalize a transaction file into an immutable table
//! - Filter by product category and location
//! - Monthly, category, product, gender, tenure, location, coupon and
//!   discount aggregates plus a paginated row preview
//! - Headline KPI cards
//! - Export to JSON or CSV

/// Aggregation engine
pub mod aggregate;
/// Labelled interval assignment
pub mod bucket;
/// Configuration management
pub mod config;
/// Error types
pub mod error;
/// Dashboard export
pub mod export;
/// KPI card computation
pub mod kpi;
/// Dataset loading and normalization
pub mod loader;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Dashboard service facade
pub mod service;
/// Input validation
pub mod validation;

// Re-export key components for easier access
pub use aggregate::{aggregate, FilteredView};
pub use bucket::Bucketing;
pub use error::{DashboardError, Result};
pub use loader::load;
pub use models::{AggregateBundle, Dataset, FilterSpec, TransactionRecord};
pub use service::DashboardService;
