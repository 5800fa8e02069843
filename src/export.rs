//! File writing utilities for dashboard export.
//!
//! This module writes an aggregation result, with the KPI cards, to disk in
//! JSON or CSV so an external renderer can pick it up.

use crate::error::{DashboardError, Result};
use crate::kpi::KpiSummary;
use crate::models::{
    AggregateBundle, BucketMean, GenderSpend, LabeledValue, ProductQuantity, TransactionRecord,
};
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output format for exported dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One JSON document with KPIs and every aggregate
    Json,
    /// One CSV file per aggregate plus the preview rows
    Csv,
}

impl ExportFormat {
    /// Configuration and CLI spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(DashboardError::InvalidConfig(format!(
                "unknown export format {other:?}, expected json or csv"
            ))),
        }
    }
}

/// KPIs and aggregates as one document
#[derive(Debug, Serialize)]
pub struct DashboardSnapshot<'a> {
    /// Headline cards
    pub kpis: &'a KpiSummary,
    /// Filtered aggregates
    pub aggregates: &'a AggregateBundle,
}

/// Write a dashboard into `output_dir/timestamp/`.
///
/// # Returns
///
/// Paths of the created files
pub fn write_dashboard_to_timestamped_dir(
    kpis: &KpiSummary,
    bundle: &AggregateBundle,
    format: ExportFormat,
    output_dir: &Path,
    timestamp: &str,
) -> Result<Vec<PathBuf>> {
    let date_dir = output_dir.join(timestamp);
    create_dir_all(&date_dir)?;

    match format {
        ExportFormat::Json => {
            let file_path = date_dir.join("dashboard.json");
            let writer = BufWriter::new(File::create(&file_path)?);
            write_json(writer, &DashboardSnapshot { kpis, aggregates: bundle })?;
            Ok(vec![file_path])
        }
        ExportFormat::Csv => write_csv_files(bundle, &date_dir),
    }
}

/// Pretty-print any serializable value as JSON followed by a newline
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn write_csv_files(bundle: &AggregateBundle, dir: &Path) -> Result<Vec<PathBuf>> {
    let files = vec![
        write_csv_file(dir, "monthly_sales", &bundle.monthly_sales)?,
        write_csv_file(dir, "category_revenue", &bundle.category_revenue)?,
        write_csv_file(dir, "top_products", &bundle.top_products)?,
        write_csv_file(dir, "gender_spending", &bundle.gender_spending)?,
        write_csv_file(dir, "tenure_spending", &bundle.tenure_spending)?,
        write_csv_file(dir, "location_spending", &bundle.location_spending)?,
        write_csv_file(dir, "coupon_effectiveness", &bundle.coupon_effectiveness)?,
        write_csv_file(dir, "discount_impact", &bundle.discount_impact)?,
        write_csv_file(dir, "preview", &bundle.preview.rows)?,
    ];
    Ok(files)
}

/// Column names of a row type exported as CSV, in field order
pub trait CsvColumns {
    /// Header line written before any row
    const COLUMNS: &'static [&'static str];
}

impl CsvColumns for LabeledValue {
    const COLUMNS: &'static [&'static str] = &["label", "value"];
}

impl CsvColumns for ProductQuantity {
    const COLUMNS: &'static [&'static str] = &["product", "quantity"];
}

impl CsvColumns for GenderSpend {
    const COLUMNS: &'static [&'static str] = &["gender", "online_spend", "offline_spend"];
}

impl CsvColumns for BucketMean {
    const COLUMNS: &'static [&'static str] = &["bucket", "mean", "count"];
}

impl CsvColumns for TransactionRecord {
    const COLUMNS: &'static [&'static str] = &[
        "Transaction_ID",
        "CustomerID",
        "Transaction_Date",
        "Date",
        "Product_Category",
        "Product_Description",
        "Gender",
        "Location",
        "Tenure_Months",
        "Quantity",
        "Avg_Price",
        "Online_Spend",
        "Offline_Spend",
        "Discount_pct",
        "Coupon_Status",
        "Total_Spend",
        "Revenue",
    ];
}

/// Write rows to `dir/name.csv`. The header is always written, so an empty
/// aggregate still yields its column names.
fn write_csv_file<T>(dir: &Path, name: &str, rows: &[T]) -> Result<PathBuf>
where
    T: Serialize + CsvColumns,
{
    let file_path = dir.join(format!("{name}.csv"));
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&file_path)?;

    writer.write_record(T::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(file_path)
}
