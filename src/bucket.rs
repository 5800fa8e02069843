//! Assignment of numeric values to labelled intervals.
//!
//! Intervals are right-closed, `(lo, hi]`, and contiguous. The first interval
//! optionally includes its lower edge, so `[lo, hi]`. Values outside every
//! interval, and NaN, get no bucket.

use crate::error::{DashboardError, Result};
use crate::models::BucketMean;

/// An ordered set of contiguous labelled intervals
#[derive(Debug, Clone, PartialEq)]
pub struct Bucketing {
    edges: Vec<f64>,
    labels: Vec<String>,
    include_lowest: bool,
}

impl Bucketing {
    /// Build from `n + 1` strictly increasing edges and `n` labels.
    pub fn new(edges: &[f64], labels: &[&str], include_lowest: bool) -> Result<Self> {
        if labels.is_empty() {
            return Err(DashboardError::InvalidConfig(
                "bucketing needs at least one interval".to_string(),
            ));
        }
        if edges.len() != labels.len() + 1 {
            return Err(DashboardError::InvalidConfig(format!(
                "{} labels need {} edges, got {}",
                labels.len(),
                labels.len() + 1,
                edges.len()
            )));
        }
        if edges.iter().any(|e| e.is_nan()) || edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(DashboardError::InvalidConfig(format!(
                "bucket edges must be strictly increasing: {edges:?}"
            )));
        }

        Ok(Self {
            edges: edges.to_vec(),
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
            include_lowest,
        })
    }

    /// Customer tenure in months: `[0,6]`, `(6,12]`, `(12,24]`, `(24,36]`, `(36,∞)`
    #[must_use]
    pub fn tenure() -> Self {
        Self {
            edges: vec![0.0, 6.0, 12.0, 24.0, 36.0, f64::INFINITY],
            labels: ["0-6", "7-12", "13-24", "25-36", "36+"]
                .map(str::to_string)
                .into(),
            include_lowest: true,
        }
    }

    /// Discount percentage: `(0,5]`, `(5,10]`, `(10,15]`, `(15,20]`, `(20,100]`
    #[must_use]
    pub fn discount() -> Self {
        Self {
            edges: vec![0.0, 5.0, 10.0, 15.0, 20.0, 100.0],
            labels: ["0-5%", "5-10%", "10-15%", "15-20%", "20%+"]
                .map(str::to_string)
                .into(),
            include_lowest: false,
        }
    }

    /// Labels in ascending interval order
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of intervals
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false; construction requires at least one interval
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Index of the interval holding `value`
    #[must_use]
    pub fn assign(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let lowest = self.edges[0];
        if self.include_lowest && value == lowest {
            return Some(0);
        }
        if value <= lowest || value > self.edges[self.edges.len() - 1] {
            return None;
        }
        // First upper edge >= value; edges[0] < value so the index is >= 1.
        let upper = self.edges.partition_point(|edge| *edge < value);
        Some(upper - 1)
    }

    /// Label of the interval holding `value`
    #[must_use]
    pub fn label_for(&self, value: f64) -> Option<&str> {
        self.assign(value).map(|i| self.labels[i].as_str())
    }

    /// Mean of `measure` per interval of `key`, in ascending interval order.
    ///
    /// Rows whose key falls outside every interval are skipped. When no row
    /// lands anywhere the result is empty; otherwise every interval is listed
    /// and empty ones carry no mean. A bucket whose total is not finite fails
    /// the call with [`DashboardError::Aggregation`] naming `step`.
    pub fn mean_by<I>(&self, step: &str, pairs: I) -> Result<Vec<BucketMean>>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut means = vec![Mean::default(); self.len()];
        let mut assigned = 0usize;

        for (key, measure) in pairs {
            if let Some(index) = self.assign(key) {
                means[index].push(measure);
                assigned += 1;
            }
        }

        if assigned == 0 {
            return Ok(Vec::new());
        }

        self.labels
            .iter()
            .zip(means)
            .map(|(label, mean)| {
                Ok(BucketMean {
                    bucket: label.clone(),
                    mean: mean.checked_value(step, label)?,
                    count: mean.count,
                })
            })
            .collect()
    }
}

/// Running arithmetic mean
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    pub(crate) fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// `None` for an empty set
    pub(crate) fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Like [`Mean::value`], but a non-finite total is an aggregation error
    pub(crate) fn checked_value(&self, step: &str, key: &str) -> Result<Option<f64>> {
        if self.sum.is_finite() {
            Ok(self.value())
        } else {
            Err(DashboardError::Aggregation(format!(
                "{step}: non-finite total {} for {key:?}",
                self.sum
            )))
        }
    }
}
