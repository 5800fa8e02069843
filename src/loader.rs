//! Transaction file loading and normalization.
//!
//! The loader runs once at startup. It reads raw rows from a [`RecordSource`],
//! parses both date columns, title-cases locations and derives `Total_Spend`
//! and `Revenue`. Any row it cannot make sense of fails the whole load.

use crate::error::{DashboardError, Result};
use crate::logging::OperationTimer;
use crate::models::{Dataset, TransactionRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

/// Headers the transaction file must carry
pub const REQUIRED_COLUMNS: [&str; 15] = [
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
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// A row as it appears in the file, before normalization
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTransaction {
    /// `Transaction_ID`
    #[serde(rename = "Transaction_ID")]
    pub transaction_id: String,
    /// `CustomerID`
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    /// `Transaction_Date`, unparsed
    #[serde(rename = "Transaction_Date")]
    pub transaction_date: String,
    /// `Date`, unparsed
    #[serde(rename = "Date")]
    pub date: String,
    /// `Product_Category`
    #[serde(rename = "Product_Category")]
    pub product_category: String,
    /// `Product_Description`
    #[serde(rename = "Product_Description")]
    pub product_description: String,
    /// `Gender`
    #[serde(rename = "Gender")]
    pub gender: String,
    /// `Location`, as typed
    #[serde(rename = "Location")]
    pub location: String,
    /// `Tenure_Months`
    #[serde(rename = "Tenure_Months")]
    pub tenure_months: f64,
    /// `Quantity`
    #[serde(rename = "Quantity")]
    pub quantity: u64,
    /// `Avg_Price`
    #[serde(rename = "Avg_Price")]
    pub avg_price: f64,
    /// `Online_Spend`
    #[serde(rename = "Online_Spend")]
    pub online_spend: f64,
    /// `Offline_Spend`
    #[serde(rename = "Offline_Spend")]
    pub offline_spend: f64,
    /// `Discount_pct`
    #[serde(rename = "Discount_pct")]
    pub discount_pct: f64,
    /// `Coupon_Status`
    #[serde(rename = "Coupon_Status")]
    pub coupon_status: String,
}

/// Where raw transaction rows come from
#[cfg_attr(test, mockall::automock)]
pub trait RecordSource {
    /// Human-readable origin, used in logs and errors
    fn describe(&self) -> String;

    /// Read every raw row in file order
    fn read_records(&self) -> Result<Vec<RawTransaction>>;
}

/// A CSV file on disk
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    /// Source reading from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_records(&self) -> Result<Vec<RawTransaction>> {
        let file = File::open(&self.path).map_err(|e| {
            DashboardError::DataLoad(format!("cannot open {}: {e}", self.path.display()))
        })?;
        read_csv(file).map_err(|e| match e {
            DashboardError::DataLoad(msg) => {
                DashboardError::DataLoad(format!("{}: {msg}", self.path.display()))
            }
            other => other,
        })
    }
}

/// Load and normalize the transaction file at `path`
pub fn load(path: impl AsRef<Path>) -> Result<Dataset> {
    load_from_source(&CsvFileSource::new(path.as_ref()))
}

/// Load and normalize CSV text from any reader
pub fn load_from_reader<R: Read>(reader: R) -> Result<Dataset> {
    from_raw_records(read_csv(reader)?)
}

/// Load and normalize rows from `source`
pub fn load_from_source(source: &dyn RecordSource) -> Result<Dataset> {
    let timer = OperationTimer::new("load_dataset");
    let origin = source.describe();
    debug!(source = %origin, "Reading transaction rows");

    let raw = source.read_records()?;
    let dataset = from_raw_records(raw)?;

    info!(
        source = %origin,
        rows = dataset.len(),
        categories = dataset.categories().len(),
        locations = dataset.locations().len(),
        "Transaction dataset loaded"
    );
    timer.finish();
    Ok(dataset)
}

/// Normalize already-parsed rows into a dataset
pub fn from_raw_records(rows: Vec<RawTransaction>) -> Result<Dataset> {
    let records = rows
        .into_iter()
        .enumerate()
        .map(|(index, raw)| normalize(raw, index + 1))
        .collect::<Result<Vec<_>>>()?;
    Ok(Dataset::new(records))
}

/// Parse CSV text into raw rows, checking the header first
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| DashboardError::DataLoad(format!("unreadable header: {e}")))?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::DataLoad(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    reader
        .deserialize()
        .map(|row| row.map_err(|e| DashboardError::DataLoad(e.to_string())))
        .collect()
}

fn normalize(raw: RawTransaction, row: usize) -> Result<TransactionRecord> {
    let transaction_date = parse_column(&raw.transaction_date, "Transaction_Date", row)?;
    let date = parse_column(&raw.date, "Date", row)?;

    let total_spend = raw.online_spend + raw.offline_spend;
    let revenue = raw.quantity as f64 * raw.avg_price;
    ensure_amount(total_spend, "Total_Spend", row)?;
    ensure_amount(revenue, "Revenue", row)?;

    Ok(TransactionRecord {
        transaction_id: raw.transaction_id,
        customer_id: raw.customer_id,
        transaction_date,
        date,
        product_category: raw.product_category,
        product_description: raw.product_description,
        gender: raw.gender,
        location: title_case(&raw.location),
        tenure_months: raw.tenure_months,
        quantity: raw.quantity,
        avg_price: raw.avg_price,
        online_spend: raw.online_spend,
        offline_spend: raw.offline_spend,
        discount_pct: raw.discount_pct,
        coupon_status: raw.coupon_status,
        total_spend,
        revenue,
    })
}

fn parse_column(value: &str, column: &str, row: usize) -> Result<NaiveDateTime> {
    parse_timestamp(value).ok_or_else(|| {
        DashboardError::DataLoad(format!("row {row}: unparsable {column} {value:?}"))
    })
}

fn ensure_amount(value: f64, column: &str, row: usize) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DashboardError::DataLoad(format!(
            "row {row}: {column} must be a finite non-negative amount, got {value}"
        )))
    }
}

/// Parse a date or date-time in one of the accepted layouts.
///
/// Bare dates become midnight. RFC 3339 values keep their wall-clock time.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// NFC-normalize, trim and title-case a location.
///
/// A letter is upper-cased when it starts the string or follows a non-letter
/// and lower-cased otherwise, so `"NEW york"` and `"new York"` both become
/// `"New York"`.
#[must_use]
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut after_letter = false;

    for ch in value.trim().nfc() {
        if ch.is_alphabetic() {
            if after_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(ch);
            after_letter = false;
        }
    }

    out
}
