//! Headline figures shown above the dashboard charts.

use crate::aggregate::FirstSeenGroups;
use crate::bucket::Mean;
use crate::models::{LabeledValue, TransactionRecord};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Default number of categories in [`KpiSummary::top_categories`]
pub const TOP_CATEGORY_LIMIT: usize = 5;

/// KPI card values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    /// Revenue over every row
    pub total_revenue: f64,
    /// Mean of per-order revenue, orders keyed by transaction id
    pub avg_order_value: Option<f64>,
    /// Distinct customers
    pub total_customers: usize,
    /// Online spend over offline spend; `None` when offline spend is zero
    pub online_offline_ratio: Option<f64>,
    /// Highest-revenue categories, descending
    pub top_categories: Vec<LabeledValue>,
}

/// Compute the KPI cards over `records`, keeping `top_n` categories
pub fn summarize<'a, I>(records: I, top_n: usize) -> KpiSummary
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut total_revenue = 0.0;
    let mut online = 0.0;
    let mut offline = 0.0;
    let mut orders: BTreeMap<&str, f64> = BTreeMap::new();
    let mut customers: HashSet<&str> = HashSet::new();
    let mut categories: FirstSeenGroups<'_, f64> = FirstSeenGroups::default();

    for record in records {
        total_revenue += record.revenue;
        online += record.online_spend;
        offline += record.offline_spend;
        *orders.entry(record.transaction_id.as_str()).or_default() += record.revenue;
        customers.insert(record.customer_id.as_str());

        if !record.product_category.is_empty() {
            *categories.entry(&record.product_category) += record.revenue;
        }
    }

    let mut order_value = Mean::default();
    for revenue in orders.values() {
        order_value.push(*revenue);
    }

    let mut top_categories: Vec<LabeledValue> = categories
        .into_groups()
        .map(|(label, value)| LabeledValue {
            label: label.to_string(),
            value,
        })
        .collect();
    top_categories.sort_by(|a, b| b.value.total_cmp(&a.value));
    top_categories.truncate(top_n);

    KpiSummary {
        total_revenue,
        avg_order_value: order_value.value(),
        total_customers: customers.len(),
        online_offline_ratio: (offline != 0.0).then(|| online / offline),
        top_categories,
    }
}
