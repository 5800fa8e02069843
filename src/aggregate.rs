//! Aggregation engine - turns the dataset and a filter into dashboard outputs.
//!
//! [`aggregate`] is a pure function: it borrows the rows matching the filter
//! and recomputes every output from them on each call. Nothing is cached and
//! the dataset is never touched.
//!
//! Steps:
//! 1. Filter rows by category and location inclusion sets
//! 2. Sum revenue per calendar month of the transaction date
//! 3. Sum revenue per category, descending
//! 4. Sum quantity per product, descending, top ten
//! 5. Sum online and offline spend per gender
//! 6. Mean total spend per tenure bucket
//! 7. Sum total spend per location, descending
//! 8. Mean revenue per coupon status
//! 9. Mean revenue per discount bucket
//! 10. Keep the first hundred matching rows for the table

use crate::bucket::{Bucketing, Mean};
use crate::error::{DashboardError, Result};
use crate::models::{
    AggregateBundle, Dataset, FilterSpec, GenderSpend, LabeledValue, ProductQuantity, RowPreview,
    TransactionRecord,
};
use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Rows kept in the table preview
pub const PREVIEW_ROW_LIMIT: usize = 100;

/// Products kept in the top-products chart
pub const TOP_PRODUCT_LIMIT: usize = 10;

/// Rows of the dataset matching one filter, borrowed for a single call
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    rows: Vec<&'a TransactionRecord>,
}

impl<'a> FilteredView<'a> {
    /// Select the rows of `dataset` that `filter` keeps, in table order
    #[must_use]
    pub fn apply(dataset: &'a Dataset, filter: &FilterSpec) -> Self {
        let rows = dataset
            .records()
            .iter()
            .filter(|record| filter.matches(record))
            .collect();
        Self { rows }
    }

    /// Matching rows in table order
    #[must_use]
    pub fn rows(&self) -> &[&'a TransactionRecord] {
        &self.rows
    }

    /// Number of matching rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when nothing matched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Compute every dashboard output for `filter`.
///
/// Either all outputs are produced or the call fails with a single
/// [`DashboardError::Aggregation`].
pub fn aggregate(dataset: &Dataset, filter: &FilterSpec) -> Result<AggregateBundle> {
    let view = FilteredView::apply(dataset, filter);
    debug!(
        total_rows = dataset.len(),
        filtered_rows = view.len(),
        categories = filter.categories.len(),
        locations = filter.locations.len(),
        "Aggregating filtered view"
    );

    Ok(AggregateBundle {
        monthly_sales: monthly_sales(&view)?,
        category_revenue: category_revenue(&view)?,
        top_products: top_products(&view)?,
        gender_spending: gender_spending(&view)?,
        tenure_spending: Bucketing::tenure().mean_by(
            "tenure spending",
            view.rows().iter().map(|r| (r.tenure_months, r.total_spend)),
        )?,
        location_spending: location_spending(&view)?,
        coupon_effectiveness: coupon_effectiveness(&view)?,
        discount_impact: Bucketing::discount().mean_by(
            "discount impact",
            view.rows().iter().map(|r| (r.discount_pct, r.revenue)),
        )?,
        preview: preview(&view),
    })
}

/// Revenue per `YYYY-MM`, chronological, months without rows omitted
pub fn monthly_sales(view: &FilteredView<'_>) -> Result<Vec<LabeledValue>> {
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for record in view.rows() {
        let date = record.transaction_date;
        *months.entry((date.year(), date.month())).or_default() += record.revenue;
    }

    months
        .into_iter()
        .map(|((year, month), revenue)| {
            let label = format!("{year:04}-{month:02}");
            ensure_finite("monthly sales", &label, revenue)?;
            Ok(LabeledValue {
                label,
                value: revenue,
            })
        })
        .collect()
}

/// Revenue per product category, descending
pub fn category_revenue(view: &FilteredView<'_>) -> Result<Vec<LabeledValue>> {
    sum_descending(
        "category revenue",
        view.rows().iter().map(|r| (r.product_category.as_str(), r.revenue)),
    )
}

/// Total spend per location, descending
pub fn location_spending(view: &FilteredView<'_>) -> Result<Vec<LabeledValue>> {
    sum_descending(
        "location spending",
        view.rows().iter().map(|r| (r.location.as_str(), r.total_spend)),
    )
}

/// Units sold per product, the [`TOP_PRODUCT_LIMIT`] best first
pub fn top_products(view: &FilteredView<'_>) -> Result<Vec<ProductQuantity>> {
    let mut groups = FirstSeenGroups::default();
    for record in grouped_rows(view, |r| &r.product_description) {
        let total: &mut u64 = groups.entry(&record.product_description);
        *total = total.checked_add(record.quantity).ok_or_else(|| {
            DashboardError::Aggregation(format!(
                "top products: quantity overflow for {:?}",
                record.product_description
            ))
        })?;
    }

    let mut products: Vec<ProductQuantity> = groups
        .into_groups()
        .map(|(product, quantity)| ProductQuantity {
            product: product.to_string(),
            quantity,
        })
        .collect();
    // Stable: equal quantities stay in first-seen order
    products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    products.truncate(TOP_PRODUCT_LIMIT);
    Ok(products)
}

/// Online and offline spend per gender, by gender ascending
pub fn gender_spending(view: &FilteredView<'_>) -> Result<Vec<GenderSpend>> {
    let mut genders: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for record in grouped_rows(view, |r| &r.gender) {
        let (online, offline) = genders.entry(record.gender.as_str()).or_default();
        *online += record.online_spend;
        *offline += record.offline_spend;
    }

    genders
        .into_iter()
        .map(|(gender, (online_spend, offline_spend))| {
            ensure_finite("gender spending", gender, online_spend)?;
            ensure_finite("gender spending", gender, offline_spend)?;
            Ok(GenderSpend {
                gender: gender.to_string(),
                online_spend,
                offline_spend,
            })
        })
        .collect()
}

/// Mean revenue per coupon status, by status ascending
pub fn coupon_effectiveness(view: &FilteredView<'_>) -> Result<Vec<LabeledValue>> {
    let mut statuses: BTreeMap<&str, Mean> = BTreeMap::new();
    for record in grouped_rows(view, |r| &r.coupon_status) {
        statuses
            .entry(record.coupon_status.as_str())
            .or_default()
            .push(record.revenue);
    }

    let mut means = Vec::with_capacity(statuses.len());
    for (status, mean) in statuses {
        if let Some(value) = mean.checked_value("coupon effectiveness", status)? {
            means.push(LabeledValue {
                label: status.to_string(),
                value,
            });
        }
    }
    Ok(means)
}

/// First [`PREVIEW_ROW_LIMIT`] matching rows
#[must_use]
pub fn preview(view: &FilteredView<'_>) -> RowPreview {
    RowPreview {
        rows: view
            .rows()
            .iter()
            .take(PREVIEW_ROW_LIMIT)
            .map(|r| (*r).clone())
            .collect(),
        matched_rows: view.len(),
    }
}

fn sum_descending<'a>(
    step: &str,
    pairs: impl Iterator<Item = (&'a str, f64)>,
) -> Result<Vec<LabeledValue>> {
    let mut groups = FirstSeenGroups::default();
    for (key, value) in pairs.filter(|(key, _)| !key.is_empty()) {
        let total: &mut f64 = groups.entry(key);
        *total += value;
    }

    let mut sums = groups
        .into_groups()
        .map(|(label, value)| {
            ensure_finite(step, label, value)?;
            Ok(LabeledValue {
                label: label.to_string(),
                value,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    // Stable: equal sums stay in first-seen order
    sums.sort_by(|a, b| b.value.total_cmp(&a.value));
    Ok(sums)
}

/// Rows whose grouping key is non-empty; a blank key forms no group
fn grouped_rows<'v, 'a>(
    view: &'v FilteredView<'a>,
    key: impl Fn(&TransactionRecord) -> &str + 'v,
) -> impl Iterator<Item = &'a TransactionRecord> + 'v {
    view.rows()
        .iter()
        .copied()
        .filter(move |record| !key(*record).is_empty())
}

fn ensure_finite(step: &str, key: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DashboardError::Aggregation(format!(
            "{step}: non-finite total {value} for {key:?}"
        )))
    }
}

/// Group accumulators that remember the order keys were first seen in
pub(crate) struct FirstSeenGroups<'a, A> {
    index: HashMap<&'a str, usize>,
    groups: Vec<(&'a str, A)>,
}

impl<A> Default for FirstSeenGroups<'_, A> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }
}

impl<'a, A: Default> FirstSeenGroups<'a, A> {
    pub(crate) fn entry(&mut self, key: &'a str) -> &mut A {
        let slot = *self.index.entry(key).or_insert_with(|| {
            self.groups.push((key, A::default()));
            self.groups.len() - 1
        });
        &mut self.groups[slot].1
    }

    pub(crate) fn into_groups(self) -> impl Iterator<Item = (&'a str, A)> {
        self.groups.into_iter()
    }
}
