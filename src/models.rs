//! Data models for transactions, filters and dashboard outputs
//!
//! This module contains the loaded transaction table, the per-request filter
//! and every value handed to the rendering layer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One normalized line item of the transaction table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    /// Order identifier, shared by every line item of the same order
    #[serde(rename = "Transaction_ID")]
    pub transaction_id: String,
    /// Customer identifier
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    /// When the transaction happened
    #[serde(rename = "Transaction_Date")]
    pub transaction_date: NaiveDateTime,
    /// Secondary calendar date carried by the source file
    #[serde(rename = "Date")]
    pub date: NaiveDateTime,
    /// Product category
    #[serde(rename = "Product_Category")]
    pub product_category: String,
    /// Product description
    #[serde(rename = "Product_Description")]
    pub product_description: String,
    /// Customer gender
    #[serde(rename = "Gender")]
    pub gender: String,
    /// Title-cased customer location
    #[serde(rename = "Location")]
    pub location: String,
    /// Months the customer has been active
    #[serde(rename = "Tenure_Months")]
    pub tenure_months: f64,
    /// Units sold
    #[serde(rename = "Quantity")]
    pub quantity: u64,
    /// Unit price
    #[serde(rename = "Avg_Price")]
    pub avg_price: f64,
    /// Customer spend through the online channel
    #[serde(rename = "Online_Spend")]
    pub online_spend: f64,
    /// Customer spend through the offline channel
    #[serde(rename = "Offline_Spend")]
    pub offline_spend: f64,
    /// Discount percentage applied
    #[serde(rename = "Discount_pct")]
    pub discount_pct: f64,
    /// Coupon usage status
    #[serde(rename = "Coupon_Status")]
    pub coupon_status: String,
    /// `online_spend + offline_spend`
    #[serde(rename = "Total_Spend")]
    pub total_spend: f64,
    /// `quantity * avg_price`
    #[serde(rename = "Revenue")]
    pub revenue: f64,
}

/// The immutable transaction table, built once by the loader.
///
/// There is no mutable access after construction, so a single instance can be
/// shared by every aggregation call for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<TransactionRecord>,
    categories: Vec<String>,
    locations: Vec<String>,
}

impl Dataset {
    pub(crate) fn new(records: Vec<TransactionRecord>) -> Self {
        let categories = distinct(records.iter().map(|r| r.product_category.as_str()));
        let locations = distinct(records.iter().map(|r| r.location.as_str()));

        Self {
            records,
            categories,
            locations,
        }
    }

    /// Rows in file order
    #[must_use]
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the file held no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted distinct product categories
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Sorted distinct normalized locations
    #[must_use]
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Dropdown options for the two dashboard filters
    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            categories: self.categories.clone(),
            locations: self.locations.clone(),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Values the UI may offer in the category and location dropdowns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Sorted distinct categories
    pub categories: Vec<String>,
    /// Sorted distinct locations
    pub locations: Vec<String>,
}

/// Category and location inclusion sets.
///
/// An empty set places no restriction on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Product categories to keep
    #[serde(default)]
    pub categories: BTreeSet<String>,
    /// Locations to keep
    #[serde(default)]
    pub locations: BTreeSet<String>,
}

impl FilterSpec {
    /// Build a filter from category and location values
    pub fn new<C, L, S>(categories: C, locations: L) -> Self
    where
        C: IntoIterator<Item = S>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            locations: locations.into_iter().map(Into::into).collect(),
        }
    }

    /// True when neither dimension is restricted
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.categories.is_empty() && self.locations.is_empty()
    }

    /// Inclusion test for a single row
    #[must_use]
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        (self.categories.is_empty() || self.categories.contains(&record.product_category))
            && (self.locations.is_empty() || self.locations.contains(&record.location))
    }
}

/// A labelled numeric value, one bar or point of a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue {
    /// Group key
    pub label: String,
    /// Aggregated value
    pub value: f64,
}

/// Units sold for one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductQuantity {
    /// Product description
    pub product: String,
    /// Total units sold
    pub quantity: u64,
}

/// Channel split of spend for one gender
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderSpend {
    /// Gender value
    pub gender: String,
    /// Summed online spend
    pub online_spend: f64,
    /// Summed offline spend
    pub offline_spend: f64,
}

/// Mean of a measure over one labelled interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketMean {
    /// Interval label
    pub bucket: String,
    /// Mean of the measure, `None` when no row fell in the interval
    pub mean: Option<f64>,
    /// Rows in the interval
    pub count: usize,
}

/// Leading rows of the filtered view for the transaction table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowPreview {
    /// Preview rows in table order
    pub rows: Vec<TransactionRecord>,
    /// Rows matched by the filter, before truncation
    pub matched_rows: usize,
}

impl RowPreview {
    /// Number of pages at the given page size
    #[must_use]
    pub fn page_count(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        self.rows.len().div_ceil(page_size)
    }

    /// Rows of one zero-based page; empty past the last page
    #[must_use]
    pub fn page(&self, index: usize, page_size: usize) -> &[TransactionRecord] {
        if page_size == 0 {
            return &[];
        }
        self.rows.chunks(page_size).nth(index).unwrap_or(&[])
    }
}

/// One page of the transaction table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewPage {
    /// Zero-based page index
    pub page: usize,
    /// Pages in the preview at the configured page size
    pub page_count: usize,
    /// Rows matched by the filter, before truncation
    pub matched_rows: usize,
    /// Rows of this page
    pub rows: Vec<TransactionRecord>,
}

/// Every output of one aggregation call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateBundle {
    /// Revenue per `YYYY-MM`, chronological
    pub monthly_sales: Vec<LabeledValue>,
    /// Revenue per category, descending
    pub category_revenue: Vec<LabeledValue>,
    /// Ten best-selling products by units, descending
    pub top_products: Vec<ProductQuantity>,
    /// Online and offline spend per gender
    pub gender_spending: Vec<GenderSpend>,
    /// Mean total spend per tenure bucket
    pub tenure_spending: Vec<BucketMean>,
    /// Total spend per location, descending
    pub location_spending: Vec<LabeledValue>,
    /// Mean revenue per coupon status
    pub coupon_effectiveness: Vec<LabeledValue>,
    /// Mean revenue per discount bucket
    pub discount_impact: Vec<BucketMean>,
    /// Leading rows of the filtered view
    pub preview: RowPreview,
}
